//! The Ion 1.0 system symbol table, and version-marker parsing.
//!
//! Upstream reference: `ion_symbol_table.c`'s `ION_SYSTEM_SYMBOL_TABLE`
//! initializer (the nine fixed SIDs), and its `$ion_<major>_<minor>`
//! binary-version-marker scan.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use super::error::SymbolTableError;
use super::symbol::Symbol;
use super::table::Table;

pub const SID_ION: u32 = 1;
pub const SID_ION_1_0: u32 = 2;
pub const SID_ION_SYMBOL_TABLE: u32 = 3;
pub const SID_NAME: u32 = 4;
pub const SID_VERSION: u32 = 5;
pub const SID_IMPORTS: u32 = 6;
pub const SID_SYMBOLS: u32 = 7;
pub const SID_MAX_ID: u32 = 8;
pub const SID_ION_SHARED_SYMBOL_TABLE: u32 = 9;

const SYSTEM_SYMBOL_TEXT: [&str; 9] = [
    "$ion",
    "$ion_1_0",
    "$ion_symbol_table",
    "name",
    "version",
    "imports",
    "symbols",
    "max_id",
    "$ion_shared_symbol_table",
];

thread_local! {
    static SYSTEM_TABLE_1_0: RefCell<Option<Rc<Table>>> = const { RefCell::new(None) };
}

/// Returns the shared Ion 1.0 system table singleton, building it on first
/// use. Cheap to call repeatedly: only the first call allocates.
pub fn system_table_1_0() -> Rc<Table> {
    SYSTEM_TABLE_1_0.with(|cell| {
        let mut slot = cell.borrow_mut();
        if let Some(table) = slot.as_ref() {
            return table.clone();
        }
        let symbols = SYSTEM_SYMBOL_TEXT
            .iter()
            .enumerate()
            .map(|(i, text)| Symbol::named((i + 1) as u32, Rc::from(*text)))
            .collect();
        let table = Table::new_system(1, symbols);
        *slot = Some(table.clone());
        table
    })
}

/// A `Weak` handle to the system table, suitable for a freshly-built local
/// table's back-reference (spec.md §4.1).
pub fn system_table_1_0_weak() -> Weak<Table> {
    Rc::downgrade(&system_table_1_0())
}

/// Returns the system table for `version`, the version-checked entry point
/// spec.md §4.1 describes: any version other than 1 fails rather than
/// silently falling back to the only table this crate knows how to build.
pub fn system_table(version: u32) -> Result<Rc<Table>, SymbolTableError> {
    if version != 1 {
        return Err(SymbolTableError::UnsupportedVersion(version as i32));
    }
    Ok(system_table_1_0())
}

/// A parsed Ion version-marker symbol, e.g. `$ion_1_0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IonVersion {
    pub major: u32,
    pub minor: u32,
}

/// Parses a `$ion_<major>_<minor>` version marker. Returns `None` for any
/// other text, including plain `$ion` (spec.md §4.9).
pub fn parse_version_marker(text: &str) -> Option<IonVersion> {
    let rest = text.strip_prefix("$ion_")?;
    let (major, minor) = rest.split_once('_')?;
    if major.is_empty() || minor.is_empty() {
        return None;
    }
    if !major.bytes().all(|b| b.is_ascii_digit()) || !minor.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let major: u32 = major.parse().ok()?;
    let minor: u32 = minor.parse().ok()?;
    Some(IonVersion { major, minor })
}
