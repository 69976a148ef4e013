//! Symbol lookup: SID -> symbol and text -> SID, across a table's imports
//! and its own local symbols, plus `$<int>` symbol-identifier syntax.
//!
//! Upstream reference: `ion_symbol_table.c`'s `_ion_symbol_table_find_by_*`
//! pair, which walks import slots before falling through to the local
//! array; spec.md §4.6-4.7 keep that order.

use super::error::SymbolTableError;
use super::symbol::{ImportLocation, Symbol};
use super::table::{Table, TableKind};

/// Resolves `sid` to a [`Symbol`] within `table`'s full context.
///
/// For a LOCAL table, SIDs `1..=system.max_id()` resolve in the system
/// table itself (spec.md §4.6 "By SID"); the table's own imports and local
/// symbols occupy the SID space above that. SHARED and SYSTEM tables carry
/// no such implicit prefix: SID 1 maps straight to their own first symbol.
///
/// SID 0 always resolves to the unknown-text symbol zero. A `sid` beyond
/// `table.max_id()` resolves to `None`.
pub fn find_by_sid(table: &Table, sid: u32) -> Option<Symbol> {
    if sid == 0 {
        return Some(Symbol::unknown_local(0));
    }
    if sid > table.max_id() {
        return None;
    }

    let mut offset = 0u32;
    if table.kind() == TableKind::Local {
        if let Some(system) = table.system_table() {
            let system_max_id = system.max_id();
            if sid <= system_max_id {
                return system.local_by_sid(sid);
            }
            offset = system_max_id;
        }
    }

    for import in table.imports().iter() {
        let size = import.declared_max_id();
        if sid <= offset + size {
            let position = sid - offset;
            return Some(resolve_import_slot(import, sid, position));
        }
        offset += size;
    }

    table.local_by_sid(sid)
}

/// Like [`find_by_sid`], but a `sid` with no representation at all — out of
/// range for `table` — is a hard error rather than `None` (spec.md §7
/// "invalid symbol").
pub fn require_by_sid(table: &Table, sid: u32) -> Result<Symbol, SymbolTableError> {
    find_by_sid(table, sid).ok_or(SymbolTableError::InvalidSymbol(sid))
}

fn resolve_import_slot(
    import: &super::import::ResolvedImport,
    absolute_sid: u32,
    position: u32,
) -> Symbol {
    match &import.resolved {
        Some(shared) if position <= shared.symbol_count() as u32 => {
            match shared.local_by_sid(shared.min_local_id() - 1 + position) {
                Some(symbol) if symbol.has_known_text() => Symbol {
                    sid: absolute_sid,
                    ..symbol
                },
                _ => Symbol::unknown_shared(
                    absolute_sid,
                    ImportLocation {
                        name: import.descriptor.name.clone(),
                        position,
                    },
                ),
            }
        }
        _ => Symbol::unknown_shared(
            absolute_sid,
            ImportLocation {
                name: import.descriptor.name.clone(),
                position,
            },
        ),
    }
}

/// Resolves `text` to a SID, per spec.md §4.6 "By name"'s search order:
///
/// 1. If `allow_symbol_identifier` and `text` is a `$<int>` reference
///    (§4.7), that SID is returned directly without any lookup.
/// 2. The system table (for LOCAL tables only).
/// 3. Each import in declared order, honoring its own size cap even if the
///    resolved shared table is larger.
/// 4. This table's own local symbols.
pub fn find_by_text(table: &Table, text: &str, allow_symbol_identifier: bool) -> Option<u32> {
    if allow_symbol_identifier {
        if let Some(sid) = parse_symbol_identifier(text) {
            return Some(sid);
        }
    }

    let mut offset = 0u32;
    if table.kind() == TableKind::Local {
        if let Some(system) = table.system_table() {
            if let Some(sid) = system.find_local_by_text(text) {
                return Some(sid);
            }
            offset = system.max_id();
        }
    }

    for import in table.imports().iter() {
        let size = import.declared_max_id();
        if let Some(shared) = &import.resolved {
            if let Some(local_sid) = shared.find_local_by_text(text) {
                let position = local_sid - shared.min_local_id() + 1;
                if position <= size {
                    return Some(offset + position);
                }
            }
        }
        offset += size;
    }
    // Unlike the system-table/import lookups above, the table's own local
    // symbols are already stored with their final absolute SID (`add_symbol`
    // assigns from `max_id`, which already accounts for every import ahead
    // of it), so no further offset applies here.
    table.find_local_by_text(text)
}

/// Parses a `$<digits>` symbol-identifier reference (e.g. `$10`), as used
/// when text refers to a symbol by SID rather than by name (spec.md §4.7).
/// Plain `$` alone, or any non-digit suffix, is not a valid identifier.
pub fn parse_symbol_identifier(text: &str) -> Option<u32> {
    let digits = text.strip_prefix('$')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_by_sid_errors_on_an_unresolvable_sid() {
        let system = crate::symtab::system::system_table_1_0();
        assert!(require_by_sid(&system, 3).is_ok());
        assert_eq!(
            require_by_sid(&system, 999).unwrap_err(),
            SymbolTableError::InvalidSymbol(999)
        );
    }

    #[test]
    fn parses_dollar_int_syntax() {
        assert_eq!(parse_symbol_identifier("$10"), Some(10));
        assert_eq!(parse_symbol_identifier("$0"), Some(0));
    }

    #[test]
    fn rejects_non_identifier_text() {
        assert_eq!(parse_symbol_identifier("$"), None);
        assert_eq!(parse_symbol_identifier("$abc"), None);
        assert_eq!(parse_symbol_identifier("abc"), None);
        assert_eq!(parse_symbol_identifier("$1a"), None);
    }
}
