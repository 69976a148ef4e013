//! Import descriptor & resolved import.
//!
//! Upstream reference: `ion/import.rs`'s `Import` (parent + offset/length),
//! generalized into spec.md §3's descriptor/resolution split so that the
//! declared size and the actual resolved table can diverge.

use std::rc::Rc;

use super::error::SymbolTableError;
use super::table::{Table, TableKind};

/// `(name, version, max_id)` as declared in a local table's `imports` list.
/// Immutable once appended to a table (spec.md §3).
#[derive(Debug, Clone)]
pub struct ImportDescriptor {
    pub name: Rc<str>,
    pub version: u32,
    /// `None` means "undefined": use whatever the resolved shared table
    /// provides (spec.md §4.4).
    pub declared_max_id: Option<u32>,
}

impl ImportDescriptor {
    pub fn new(name: Rc<str>, version: u32, declared_max_id: Option<u32>) -> Self {
        Self {
            name,
            version: version.max(1),
            declared_max_id,
        }
    }
}

/// A descriptor plus whatever the catalog could resolve it to.
///
/// Only the descriptor's *declared* `max_id` is ever used for SID-offset
/// arithmetic — never the actual symbol count of `resolved` — so that SID
/// assignment is stable across catalog changes (spec.md §4.3).
#[derive(Clone)]
pub struct ResolvedImport {
    pub descriptor: ImportDescriptor,
    pub resolved: Option<Rc<Table>>,
}

impl ResolvedImport {
    /// Builds a resolved import, finalizing `declared_max_id` if it was left
    /// undefined and a shared table was found (spec.md §4.4's import-struct
    /// parsing post-step).
    pub fn new(
        mut descriptor: ImportDescriptor,
        resolved: Option<Rc<Table>>,
    ) -> Result<Self, SymbolTableError> {
        if let Some(table) = &resolved {
            match table.kind() {
                TableKind::Shared | TableKind::System => {}
                other => return Err(SymbolTableError::ImportWrongKind(other)),
            }
        }
        if descriptor.declared_max_id.is_none() {
            match &resolved {
                Some(table) => descriptor.declared_max_id = Some(table.max_id()),
                None => return Err(SymbolTableError::UndefinedImportSize),
            }
        }
        Ok(Self {
            descriptor,
            resolved,
        })
    }

    pub fn declared_max_id(&self) -> u32 {
        self.descriptor
            .declared_max_id
            .expect("finalized by ResolvedImport::new")
    }
}
