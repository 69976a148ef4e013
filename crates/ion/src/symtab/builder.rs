//! Table construction: open/clone/lock, and composing a finished local
//! table from its imports and local symbols in one pass.
//!
//! Upstream reference: `ion_symbol_table.c`'s `ion_symbol_table_open` /
//! `_clone` / `_lock` family, generalized per spec.md §4.2-4.3.

use std::rc::{Rc, Weak};

use super::error::SymbolTableError;
use super::import::ResolvedImport;
use super::lookup;
use super::table::{OwnerId, Table};

/// Opens a fresh, empty, unlocked local table under `system_table`.
pub fn open_local(system_table: Weak<Table>) -> Rc<Table> {
    Table::new_local(system_table)
}

/// Clones `table` under a new owner, unlocked and ready for further
/// mutation, per spec.md §5's clone-to-extend pattern.
pub fn clone_open(table: &Table) -> Rc<Table> {
    table.clone_for_owner(OwnerId::new())
}

/// Clones `table` while keeping it under the same owner (text is aliased,
/// not copied); used when handing out a read-only view of a table still in
/// active use by its original owner.
pub fn clone_same_owner(table: &Table) -> Rc<Table> {
    table.clone_for_owner(table.owner())
}

pub fn lock(table: &Table) {
    table.lock();
}

/// Adds `text` to `table`, per spec.md §4.2 "Add symbol(text)": looks `text`
/// up across the table's full context (system table, imports, own locals)
/// first. A hit returns the existing SID and bumps `add_count` when it
/// resolves to one of `table`'s own local symbols; a miss appends a new
/// local symbol and returns its freshly assigned SID. Fails if `table` is
/// locked.
///
/// Distinct from [`Table::add_symbol`], which always appends and is used by
/// [`build_local`] to load already-decoded symbol lists, where duplicate
/// text legitimately gets distinct SIDs.
pub fn add_symbol(table: &Table, text: Rc<str>) -> Result<u32, SymbolTableError> {
    if table.is_locked() {
        return Err(SymbolTableError::Immutable);
    }
    if let Some(sid) = lookup::find_by_text(table, &text, false) {
        table.bump_local_add_count(sid);
        return Ok(sid);
    }
    table.add_symbol(text)
}

/// Builds a finished, locked local table from an ordered list of resolved
/// imports and local symbol texts (each `None` entry is an unknown-text
/// local slot). This is the composition step spec.md §4.3 calls
/// "incorporate": imports must all be added before any local symbol.
pub fn build_local(
    system_table: Weak<Table>,
    imports: Vec<ResolvedImport>,
    local_symbols: Vec<Option<Rc<str>>>,
) -> Result<Rc<Table>, SymbolTableError> {
    let table = Table::new_local(system_table);
    for import in imports {
        table.add_import(import)?;
    }
    for text in local_symbols {
        match text {
            Some(text) => {
                table.add_symbol(text)?;
            }
            None => {
                table.add_unknown_symbol()?;
            }
        }
    }
    table.lock();
    // Everything just composed came from an already-loaded context (a
    // decoded struct or an explicit symbol list), so there is nothing left
    // for an incremental writer to flush.
    table.set_flushed_max_id(table.max_id());
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symtab::system::system_table_1_0_weak;

    #[test]
    fn open_local_starts_empty_after_the_system_table() {
        let table = open_local(system_table_1_0_weak());
        assert_eq!(table.max_id(), 9);
        assert_eq!(table.min_local_id(), 10);
        assert!(!table.is_locked());
    }

    #[test]
    fn add_symbol_dedups_and_tracks_add_count() {
        let table = open_local(system_table_1_0_weak());
        let first = add_symbol(&table, Rc::from("a")).unwrap();
        assert_eq!(first, 10);
        assert_eq!(table.max_id(), 10);

        let second = add_symbol(&table, Rc::from("a")).unwrap();
        assert_eq!(second, first);
        assert_eq!(table.max_id(), 10);
        assert_eq!(table.symbols()[0].add_count, 1);

        let third = add_symbol(&table, Rc::from("b")).unwrap();
        assert_eq!(third, 11);
        assert_eq!(table.max_id(), 11);
    }

    #[test]
    fn add_symbol_fails_on_a_locked_table() {
        let table = open_local(system_table_1_0_weak());
        table.lock();
        assert_eq!(
            add_symbol(&table, Rc::from("a")).unwrap_err(),
            SymbolTableError::Immutable
        );
    }

    #[test]
    fn build_local_assigns_sids_after_imports() {
        let table = build_local(
            system_table_1_0_weak(),
            Vec::new(),
            vec![Some(Rc::from("a")), Some(Rc::from("b")), None],
        )
        .unwrap();
        assert!(table.is_locked());
        assert_eq!(table.max_id(), 12);
        assert_eq!(table.find_local_by_text("a"), Some(10));
        assert_eq!(table.find_local_by_text("b"), Some(11));
    }
}
