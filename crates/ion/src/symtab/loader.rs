//! Loads a `$ion_symbol_table`- or `$ion_shared_symbol_table`-annotated
//! struct into a [`Table`].
//!
//! Upstream reference: `ion_symbol_table.c`'s `_ion_symbol_table_load`,
//! generalized per spec.md §4.4: field recognition, the local append form,
//! import resolution via a catalog, and the shared table's shorten-only
//! `max_id`.

use std::rc::{Rc, Weak};

use super::builder::build_local;
use super::catalog::Catalog;
use super::error::SymbolTableError;
use super::import::{ImportDescriptor, ResolvedImport};
use super::reader::{Reader, ValueType};
use super::symbol::Symbol;
use super::system::{
    SID_ION_SHARED_SYMBOL_TABLE, SID_ION_SYMBOL_TABLE, SID_IMPORTS, SID_MAX_ID, SID_NAME,
    SID_SYMBOLS, SID_VERSION,
};
use super::table::Table;

enum FieldKind {
    Name,
    Version,
    Imports,
    Symbols,
    MaxId,
    Other,
}

fn identify_field(reader: &dyn Reader) -> FieldKind {
    match reader.get_field_sid() {
        Some(SID_NAME) => return FieldKind::Name,
        Some(SID_VERSION) => return FieldKind::Version,
        Some(SID_IMPORTS) => return FieldKind::Imports,
        Some(SID_SYMBOLS) => return FieldKind::Symbols,
        Some(SID_MAX_ID) => return FieldKind::MaxId,
        Some(_) => return FieldKind::Other,
        None => {}
    }
    match reader.get_field_name() {
        Some("name") => FieldKind::Name,
        Some("version") => FieldKind::Version,
        Some("imports") => FieldKind::Imports,
        Some("symbols") => FieldKind::Symbols,
        Some("max_id") => FieldKind::MaxId,
        _ => FieldKind::Other,
    }
}

fn has_annotation(reader: &dyn Reader, sid: u32, text: &str) -> bool {
    reader.get_annotation_sid(0) == Some(sid) || reader.get_annotation(0) == Some(text)
}

fn is_local_annotation(reader: &dyn Reader) -> bool {
    has_annotation(reader, SID_ION_SYMBOL_TABLE, "$ion_symbol_table")
}

fn is_shared_annotation(reader: &dyn Reader) -> bool {
    has_annotation(reader, SID_ION_SHARED_SYMBOL_TABLE, "$ion_shared_symbol_table")
}

enum ImportsField {
    Absent,
    Append,
    List(Vec<ImportDescriptor>),
}

fn read_imports_field(reader: &mut dyn Reader) -> Result<ImportsField, SymbolTableError> {
    if reader.is_null() {
        return Ok(ImportsField::Absent);
    }
    let is_append = reader.read_symbol_sid() == Some(SID_ION_SYMBOL_TABLE)
        || reader.read_symbol_text() == Some("$ion_symbol_table");
    if is_append {
        return Ok(ImportsField::Append);
    }

    let mut descriptors = Vec::new();
    reader.step_in();
    while let Some(vtype) = reader.next() {
        if vtype != ValueType::Struct {
            return Err(SymbolTableError::Malformed("import list element must be a struct"));
        }
        descriptors.push(read_import_descriptor(reader)?);
    }
    reader.step_out();
    Ok(ImportsField::List(descriptors))
}

fn read_import_descriptor(reader: &mut dyn Reader) -> Result<ImportDescriptor, SymbolTableError> {
    let mut name: Option<Rc<str>> = None;
    let mut version: u32 = 1;
    let mut max_id: Option<u32> = None;

    reader.step_in();
    while let Some(_vtype) = reader.next() {
        match identify_field(&*reader) {
            FieldKind::Name => {
                name = reader.read_string().map(Rc::from);
            }
            FieldKind::Version => {
                version = reader.read_int32().unwrap_or(1).max(1) as u32;
            }
            FieldKind::MaxId => {
                if !reader.is_null() {
                    max_id = reader.read_int32().map(|v| v.max(0) as u32);
                }
            }
            FieldKind::Imports | FieldKind::Symbols | FieldKind::Other => {}
        }
    }
    reader.step_out();

    let name = name.ok_or(SymbolTableError::ImportMissingName)?;
    Ok(ImportDescriptor::new(name, version, max_id))
}

fn read_symbols_field(reader: &mut dyn Reader) -> Result<Vec<Option<Rc<str>>>, SymbolTableError> {
    if reader.is_null() {
        return Ok(Vec::new());
    }
    let mut texts = Vec::new();
    reader.step_in();
    while let Some(vtype) = reader.next() {
        if vtype == ValueType::String && !reader.is_null() {
            texts.push(reader.read_string().map(Rc::from));
        } else {
            texts.push(None);
        }
    }
    reader.step_out();
    Ok(texts)
}

/// Loads the struct the reader is currently positioned on (i.e. after a
/// `next()` that returned `ValueType::Struct`) as either a local or a
/// shared symbol table, dispatching on its annotation.
pub fn load(
    reader: &mut dyn Reader,
    previous: Option<&Rc<Table>>,
    system_table: Weak<Table>,
    catalog: &dyn Catalog,
) -> Result<Rc<Table>, SymbolTableError> {
    if is_local_annotation(&*reader) {
        load_local(reader, previous, system_table, catalog)
    } else if is_shared_annotation(&*reader) {
        load_shared(reader, system_table)
    } else {
        Err(SymbolTableError::NotASymbolTable)
    }
}

/// Loads a `$ion_symbol_table` struct into a finished, locked local
/// [`Table`].
///
/// `previous` is the local table context in effect before this one, used to
/// resolve the append form (`imports: $ion_symbol_table`). `name`,
/// `version`, and `max_id` have no meaning for a local table and are
/// ignored if present, same as any other unrecognized field (spec.md §4.4).
pub fn load_local(
    reader: &mut dyn Reader,
    previous: Option<&Rc<Table>>,
    system_table: Weak<Table>,
    catalog: &dyn Catalog,
) -> Result<Rc<Table>, SymbolTableError> {
    if !is_local_annotation(&*reader) {
        return Err(SymbolTableError::NotASymbolTable);
    }

    let mut imports_field = ImportsField::Absent;
    let mut symbols_texts = Vec::new();
    let mut seen_imports = false;
    let mut seen_symbols = false;
    let mut seen_max_id = false;

    reader.step_in();
    while let Some(_vtype) = reader.next() {
        match identify_field(&*reader) {
            FieldKind::Imports => {
                if seen_imports {
                    return Err(SymbolTableError::DuplicateField("imports"));
                }
                seen_imports = true;
                imports_field = read_imports_field(reader)?;
            }
            FieldKind::Symbols => {
                if seen_symbols {
                    return Err(SymbolTableError::DuplicateField("symbols"));
                }
                seen_symbols = true;
                symbols_texts = read_symbols_field(reader)?;
            }
            FieldKind::MaxId => {
                if seen_max_id {
                    return Err(SymbolTableError::DuplicateField("max_id"));
                }
                seen_max_id = true;
            }
            FieldKind::Name | FieldKind::Version | FieldKind::Other => {}
        }
    }
    reader.step_out();

    let (base_imports, mut local_texts): (Vec<ResolvedImport>, Vec<Option<Rc<str>>>) =
        match imports_field {
            ImportsField::Absent => (Vec::new(), Vec::new()),
            ImportsField::Append => match previous {
                Some(prev) => (
                    prev.imports().iter().cloned().collect(),
                    prev.symbols().iter().map(|s| s.text.clone()).collect(),
                ),
                None => (Vec::new(), Vec::new()),
            },
            ImportsField::List(descriptors) => {
                let mut resolved = Vec::with_capacity(descriptors.len());
                for descriptor in descriptors {
                    let catalog_hit =
                        catalog.best_match(&descriptor.name, descriptor.version, descriptor.declared_max_id);
                    resolved.push(ResolvedImport::new(descriptor, catalog_hit)?);
                }
                (resolved, Vec::new())
            }
        };

    local_texts.extend(symbols_texts.drain(..));

    build_local(system_table, base_imports, local_texts)
}

/// Loads a `$ion_shared_symbol_table` struct into a finished, locked shared
/// [`Table`]. `imports` has no meaning for a shared table and is ignored if
/// present (spec.md §4.4 lists it as local-only effective behavior).
pub fn load_shared(
    reader: &mut dyn Reader,
    system_table: Weak<Table>,
) -> Result<Rc<Table>, SymbolTableError> {
    if !is_shared_annotation(&*reader) {
        return Err(SymbolTableError::NotASymbolTable);
    }

    let mut name: Option<Rc<str>> = None;
    let mut version: Option<u32> = None;
    let mut symbol_texts: Vec<Option<Rc<str>>> = Vec::new();
    let mut max_id_cap: Option<u32> = None;
    let mut seen_symbols = false;
    let mut seen_max_id = false;

    reader.step_in();
    while let Some(_vtype) = reader.next() {
        match identify_field(&*reader) {
            FieldKind::Name => {
                if name.is_none() && !reader.is_null() {
                    if let Some(text) = reader.read_string() {
                        if !text.is_empty() {
                            name = Some(Rc::from(text));
                        }
                    }
                }
            }
            FieldKind::Version => {
                if version.is_none() && !reader.is_null() {
                    if let Some(v) = reader.read_int32() {
                        if v >= 1 {
                            version = Some(v as u32);
                        }
                    }
                }
            }
            FieldKind::Symbols => {
                if seen_symbols {
                    return Err(SymbolTableError::DuplicateField("symbols"));
                }
                seen_symbols = true;
                symbol_texts = read_symbols_field(reader)?;
            }
            FieldKind::MaxId => {
                if seen_max_id {
                    return Err(SymbolTableError::DuplicateField("max_id"));
                }
                seen_max_id = true;
                if !reader.is_null() {
                    if let Some(v) = reader.read_int32() {
                        if v < 1 {
                            return Err(SymbolTableError::SharedMaxIdTooSmall(i64::from(v)));
                        }
                        max_id_cap = Some(v as u32);
                    }
                }
            }
            FieldKind::Imports | FieldKind::Other => {}
        }
    }
    reader.step_out();

    let name = name.ok_or(SymbolTableError::Malformed("shared symbol table struct missing name"))?;
    let version = version.unwrap_or(1);

    if let Some(cap) = max_id_cap {
        let cap = cap as usize;
        if cap < symbol_texts.len() {
            symbol_texts.truncate(cap);
        }
    }

    let symbols: Vec<Symbol> = symbol_texts
        .into_iter()
        .enumerate()
        .map(|(i, text)| {
            let sid = (i + 1) as u32;
            match text {
                Some(text) => Symbol::named(sid, text),
                None => Symbol::unknown_local(sid),
            }
        })
        .collect();

    Table::new_shared(name, version, symbols, system_table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symtab::catalog::MapCatalog;
    use crate::symtab::system::{system_table_1_0_weak, SID_ION_SHARED_SYMBOL_TABLE, SID_ION_SYMBOL_TABLE};
    use crate::value::{Field, IonValue, SymbolToken, ValueCursor};

    fn field(sid: u32, value: IonValue) -> Field {
        Field {
            name: SymbolToken::sid(sid),
            value,
        }
    }

    fn string_list(items: &[&str]) -> IonValue {
        IonValue::List(items.iter().map(|s| IonValue::String(Rc::from(*s))).collect())
    }

    #[test]
    fn loads_local_table_with_symbols_after_the_system_table() {
        let value = IonValue::Struct(vec![field(SID_SYMBOLS, string_list(&["a", "b"]))])
            .annotated(vec![SymbolToken::sid(SID_ION_SYMBOL_TABLE)]);
        let mut cursor = ValueCursor::new(&value);
        cursor.next();

        let catalog = MapCatalog::new();
        let table = load(&mut cursor, None, system_table_1_0_weak(), &catalog).unwrap();

        assert_eq!(table.max_id(), 11);
        assert_eq!(table.find_local_by_text("a"), Some(10));
        assert_eq!(table.find_local_by_text("b"), Some(11));
    }

    #[test]
    fn max_id_field_has_no_effect_on_a_local_table() {
        let value = IonValue::Struct(vec![
            field(SID_SYMBOLS, string_list(&["a"])),
            field(SID_MAX_ID, IonValue::Int(99)),
        ])
        .annotated(vec![SymbolToken::sid(SID_ION_SYMBOL_TABLE)]);
        let mut cursor = ValueCursor::new(&value);
        cursor.next();

        let catalog = MapCatalog::new();
        let table = load(&mut cursor, None, system_table_1_0_weak(), &catalog).unwrap();

        assert_eq!(table.max_id(), 10);
    }

    #[test]
    fn loads_shared_table_with_name_version_and_symbols() {
        let value = IonValue::Struct(vec![
            field(SID_NAME, IonValue::String(Rc::from("foo"))),
            field(SID_VERSION, IonValue::Int(2)),
            field(SID_SYMBOLS, string_list(&["x", "y"])),
        ])
        .annotated(vec![SymbolToken::sid(SID_ION_SHARED_SYMBOL_TABLE)]);
        let mut cursor = ValueCursor::new(&value);
        cursor.next();

        let table = load_shared(&mut cursor, system_table_1_0_weak()).unwrap();

        assert_eq!(table.max_id(), 2);
        assert_eq!(table.find_local_by_text("x"), Some(1));
        assert_eq!(table.find_local_by_text("y"), Some(2));
    }

    #[test]
    fn shared_max_id_shortens_but_never_lengthens() {
        let value = IonValue::Struct(vec![
            field(SID_NAME, IonValue::String(Rc::from("foo"))),
            field(SID_SYMBOLS, string_list(&["x", "y", "z"])),
            field(SID_MAX_ID, IonValue::Int(2)),
        ])
        .annotated(vec![SymbolToken::sid(SID_ION_SHARED_SYMBOL_TABLE)]);
        let mut cursor = ValueCursor::new(&value);
        cursor.next();

        let table = load_shared(&mut cursor, system_table_1_0_weak()).unwrap();

        assert_eq!(table.max_id(), 2);
        assert_eq!(table.find_local_by_text("z"), None);
    }

    #[test]
    fn shared_table_rejects_max_id_below_one() {
        let value = IonValue::Struct(vec![
            field(SID_NAME, IonValue::String(Rc::from("foo"))),
            field(SID_MAX_ID, IonValue::Int(0)),
        ])
        .annotated(vec![SymbolToken::sid(SID_ION_SHARED_SYMBOL_TABLE)]);
        let mut cursor = ValueCursor::new(&value);
        cursor.next();

        let err = load_shared(&mut cursor, system_table_1_0_weak()).unwrap_err();
        assert_eq!(err, SymbolTableError::SharedMaxIdTooSmall(0));
    }

    #[test]
    fn local_append_form_extends_the_previous_table() {
        let catalog = MapCatalog::new();
        let first_value = IonValue::Struct(vec![field(SID_SYMBOLS, string_list(&["a"]))])
            .annotated(vec![SymbolToken::sid(SID_ION_SYMBOL_TABLE)]);
        let mut first_cursor = ValueCursor::new(&first_value);
        first_cursor.next();
        let first = load_local(&mut first_cursor, None, system_table_1_0_weak(), &catalog).unwrap();

        let second_value = IonValue::Struct(vec![
            field(SID_IMPORTS, IonValue::Symbol(SymbolToken::sid(SID_ION_SYMBOL_TABLE))),
            field(SID_SYMBOLS, string_list(&["b"])),
        ])
        .annotated(vec![SymbolToken::sid(SID_ION_SYMBOL_TABLE)]);
        let mut second_cursor = ValueCursor::new(&second_value);
        second_cursor.next();
        let second = load_local(&mut second_cursor, Some(&first), system_table_1_0_weak(), &catalog).unwrap();

        assert_eq!(second.find_local_by_text("a"), Some(10));
        assert_eq!(second.find_local_by_text("b"), Some(11));
    }
}
