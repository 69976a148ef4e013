//! Serializes a [`Table`] back into a `$ion_symbol_table`-annotated struct
//! via the [`Writer`] collaborator trait.
//!
//! Upstream reference: `ion_symbol_table.c`'s `_ion_symbol_table_unload`,
//! generalized per spec.md §4.5: unknown-text symbols round-trip as typed
//! null rather than being dropped, so SIDs stay stable.

use super::system::{
    SID_ION_SHARED_SYMBOL_TABLE, SID_ION_SYMBOL_TABLE, SID_IMPORTS, SID_MAX_ID, SID_NAME,
    SID_SYMBOLS, SID_VERSION,
};
use super::table::Table;
use super::writer::Writer;

/// Writes only the local symbols appended since `table`'s
/// [`Table::flushed_max_id`], as an append-form local symbol-table struct
/// (`imports: $ion_symbol_table, symbols: [...suffix]`), then advances
/// `flushed_max_id` to the table's current `max_id`.
///
/// Writes nothing and returns `false` if there is no new symbol to flush.
pub fn write_incremental(table: &Table, writer: &mut dyn Writer) -> bool {
    let flushed = table.flushed_max_id();
    let max_id = table.max_id();
    if flushed >= max_id {
        return false;
    }

    writer.add_annotation_sid(SID_ION_SYMBOL_TABLE);
    writer.start_container_struct();

    writer.write_field_sid(SID_IMPORTS);
    writer.write_symbol_sid(SID_ION_SYMBOL_TABLE);

    writer.write_field_sid(SID_SYMBOLS);
    writer.start_container_list();
    for symbol in table.symbols().iter().filter(|s| s.sid > flushed) {
        match &symbol.text {
            Some(text) => writer.write_string(text),
            None => writer.write_null(),
        }
    }
    writer.finish_container();

    writer.finish_container();

    table.set_flushed_max_id(max_id);
    true
}

/// Writes `table`'s own imports and local symbols as a local symbol-table
/// struct, e.g. `$ion_symbol_table::{imports: [...], symbols: [...]}`.
///
/// Only local symbols are ever written to `symbols`; imported slots are
/// represented by the `imports` list, never inlined.
pub fn serialize_local(table: &Table, writer: &mut dyn Writer) {
    writer.add_annotation_sid(SID_ION_SYMBOL_TABLE);
    writer.start_container_struct();

    let imports = table.imports();
    if !imports.is_empty() {
        writer.write_field_sid(SID_IMPORTS);
        writer.start_container_list();
        for import in imports.iter() {
            writer.start_container_struct();
            writer.write_field_sid(SID_NAME);
            writer.write_string(&import.descriptor.name);
            writer.write_field_sid(SID_VERSION);
            writer.write_int64(i64::from(import.descriptor.version));
            writer.write_field_sid(SID_MAX_ID);
            writer.write_int64(i64::from(import.declared_max_id()));
            writer.finish_container();
        }
        writer.finish_container();
    }

    writer.write_field_sid(SID_SYMBOLS);
    writer.start_container_list();
    for symbol in table.symbols().iter() {
        match &symbol.text {
            Some(text) => writer.write_string(text),
            None => writer.write_null(),
        }
    }
    writer.finish_container();

    writer.finish_container();
}

/// Writes `table` (which must be [`super::table::TableKind::Shared`]) as a
/// `$ion_shared_symbol_table::{name: ..., version: ..., symbols: [...]}`
/// struct.
pub fn serialize_shared(table: &Table, writer: &mut dyn Writer) {
    writer.add_annotation_sid(SID_ION_SHARED_SYMBOL_TABLE);
    writer.start_container_struct();

    writer.write_field_sid(SID_NAME);
    match table.name() {
        Some(name) => writer.write_string(&name),
        None => writer.write_null(),
    }

    writer.write_field_sid(SID_VERSION);
    writer.write_int64(i64::from(table.version()));

    writer.write_field_sid(SID_SYMBOLS);
    writer.start_container_list();
    for symbol in table.symbols().iter() {
        match &symbol.text {
            Some(text) => writer.write_string(text),
            None => writer.write_null(),
        }
    }
    writer.finish_container();

    writer.finish_container();
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::symtab::builder::build_local;
    use crate::symtab::symbol::Symbol;
    use crate::symtab::system::system_table_1_0_weak;
    use crate::symtab::table::Table;
    use crate::value::{IonValue, SymbolToken, ValueBuilder};

    #[test]
    fn serializes_local_table_symbols_and_unknown_slots() {
        let table = build_local(
            system_table_1_0_weak(),
            Vec::new(),
            vec![Some(Rc::from("foo")), None, Some(Rc::from("bar"))],
        )
        .unwrap();

        let mut builder = ValueBuilder::new();
        serialize_local(&table, &mut builder);
        let value = builder.finish();

        match value {
            IonValue::Annotated(annotations, inner) => {
                assert_eq!(annotations, vec![SymbolToken::sid(SID_ION_SYMBOL_TABLE)]);
                match *inner {
                    IonValue::Struct(fields) => {
                        let symbols_field = fields
                            .iter()
                            .find(|f| f.name.sid == Some(crate::symtab::system::SID_SYMBOLS))
                            .expect("symbols field present");
                        match &symbols_field.value {
                            IonValue::List(items) => assert_eq!(items.len(), 3),
                            other => panic!("expected list, got {other:?}"),
                        }
                    }
                    other => panic!("expected struct, got {other:?}"),
                }
            }
            other => panic!("expected annotated value, got {other:?}"),
        }
    }

    #[test]
    fn serialize_shared_writes_name_version_and_symbols_but_no_max_id() {
        let table = Table::new_shared(
            Rc::from("foo"),
            2,
            vec![Symbol::named(1, Rc::from("x")), Symbol::named(2, Rc::from("y"))],
            system_table_1_0_weak(),
        )
        .unwrap();

        let mut builder = ValueBuilder::new();
        serialize_shared(&table, &mut builder);
        let value = builder.finish();

        match value {
            IonValue::Annotated(annotations, inner) => {
                assert_eq!(annotations, vec![SymbolToken::sid(SID_ION_SHARED_SYMBOL_TABLE)]);
                match *inner {
                    IonValue::Struct(fields) => {
                        assert!(fields.iter().any(|f| f.name.sid == Some(SID_NAME)));
                        assert!(fields.iter().any(|f| f.name.sid == Some(SID_VERSION)));
                        assert!(fields.iter().any(|f| f.name.sid == Some(SID_SYMBOLS)));
                        assert!(!fields.iter().any(|f| f.name.sid == Some(SID_MAX_ID)));
                    }
                    other => panic!("expected struct, got {other:?}"),
                }
            }
            other => panic!("expected annotated value, got {other:?}"),
        }
    }

    #[test]
    fn write_incremental_only_emits_the_unflushed_suffix() {
        let table = crate::symtab::builder::open_local(system_table_1_0_weak());
        table.add_symbol(Rc::from("foo")).unwrap();
        table.add_symbol(Rc::from("bar")).unwrap();

        let mut builder = ValueBuilder::new();
        assert!(write_incremental(&table, &mut builder));
        let value = builder.finish();
        let symbols_field_len = match value {
            IonValue::Annotated(_, inner) => match *inner {
                IonValue::Struct(fields) => fields
                    .into_iter()
                    .find(|f| f.name.sid == Some(SID_SYMBOLS))
                    .map(|f| match f.value {
                        IonValue::List(items) => items.len(),
                        other => panic!("expected list, got {other:?}"),
                    })
                    .expect("symbols field present"),
                other => panic!("expected struct, got {other:?}"),
            },
            other => panic!("expected annotated value, got {other:?}"),
        };
        assert_eq!(symbols_field_len, 2);
        assert_eq!(table.flushed_max_id(), table.max_id());

        let mut second = ValueBuilder::new();
        assert!(!write_incremental(&table, &mut second));

        table.add_symbol(Rc::from("baz")).unwrap();
        let mut third = ValueBuilder::new();
        assert!(write_incremental(&table, &mut third));
    }
}
