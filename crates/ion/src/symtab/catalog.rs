//! Catalog: how a loader resolves an import descriptor to an actual shared
//! table.
//!
//! Upstream reference: `ion/import.rs`'s parent-table lookup, generalized
//! into spec.md §4.4's catalog contract (exact match, else highest
//! available version, honoring a requested `max_id`).

use std::collections::HashMap;
use std::rc::Rc;

use super::table::Table;

/// Resolves `(name, version)` import references to shared tables.
pub trait Catalog {
    /// Returns the best available shared table for `name`: an exact
    /// `(name, version)` match if present, otherwise the highest version
    /// known for `name`, or `None` if `name` is entirely unknown.
    ///
    /// `max_id`, when given, is advisory only: a catalog may use it to
    /// pick among same-named tables, but the caller is responsible for
    /// finalizing the declared import size (spec.md §4.4).
    fn best_match(&self, name: &str, version: u32, max_id: Option<u32>) -> Option<Rc<Table>>;
}

/// An in-memory catalog backed by a name -> (version -> table) map.
#[derive(Default)]
pub struct MapCatalog {
    tables: HashMap<Rc<str>, HashMap<u32, Rc<Table>>>,
}

impl MapCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, table: Rc<Table>) {
        let Some(name) = table.name() else { return };
        self.tables
            .entry(name)
            .or_default()
            .insert(table.version(), table);
    }
}

impl Catalog for MapCatalog {
    fn best_match(&self, name: &str, version: u32, _max_id: Option<u32>) -> Option<Rc<Table>> {
        let versions = self.tables.get(name)?;
        if let Some(exact) = versions.get(&version) {
            return Some(exact.clone());
        }
        versions.iter().max_by_key(|(v, _)| **v).map(|(_, t)| t.clone())
    }
}
