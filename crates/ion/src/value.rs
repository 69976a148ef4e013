//! An in-memory Ion value tree, and cursor/builder adapters onto it.
//!
//! Upstream reference: `ion/decoder_base.rs` decodes straight into this kind
//! of tree before a higher layer walks it; here the tree is also the
//! concrete backing for the [`crate::symtab::reader::Reader`] and
//! [`crate::symtab::writer::Writer`] collaborator traits, so the loader and
//! serializer can be exercised without a real binary codec round-trip.

use std::rc::Rc;

use crate::symtab::reader::{Reader, ValueType};
use crate::symtab::symbol::ImportLocation;
use crate::symtab::writer::Writer;

/// A symbol token as it appears in a decoded value: a SID, resolved text,
/// both, or (for an unresolved import slot) neither plus a location.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SymbolToken {
    pub sid: Option<u32>,
    pub text: Option<Rc<str>>,
    pub import_location: Option<ImportLocation>,
}

impl SymbolToken {
    pub fn text(text: impl Into<Rc<str>>) -> Self {
        Self {
            sid: None,
            text: Some(text.into()),
            import_location: None,
        }
    }

    pub fn sid(sid: u32) -> Self {
        Self {
            sid: Some(sid),
            text: None,
            import_location: None,
        }
    }
}

/// A struct field: the field-name token paired with its value.
#[derive(Debug, Clone)]
pub struct Field {
    pub name: SymbolToken,
    pub value: IonValue,
}

/// An in-memory Ion value, deep enough to represent a symbol table struct
/// and the values it is built from.
#[derive(Debug, Clone)]
pub enum IonValue {
    Null,
    Bool(bool),
    Int(i64),
    String(Rc<str>),
    Symbol(SymbolToken),
    List(Vec<IonValue>),
    Struct(Vec<Field>),
    /// A value with one or more annotations attached, innermost value last.
    Annotated(Vec<SymbolToken>, Box<IonValue>),
}

impl IonValue {
    pub fn struct_value(fields: Vec<Field>) -> Self {
        IonValue::Struct(fields)
    }

    pub fn annotated(self, annotations: Vec<SymbolToken>) -> Self {
        if annotations.is_empty() {
            self
        } else {
            IonValue::Annotated(annotations, Box::new(self))
        }
    }

    fn value_type(&self) -> ValueType {
        match self.strip_annotations() {
            IonValue::Null => ValueType::Null,
            IonValue::Bool(_) => ValueType::Bool,
            IonValue::Int(_) => ValueType::Int,
            IonValue::String(_) => ValueType::String,
            IonValue::Symbol(_) => ValueType::Symbol,
            IonValue::List(_) => ValueType::List,
            IonValue::Struct(_) => ValueType::Struct,
            IonValue::Annotated(..) => unreachable!("stripped above"),
        }
    }

    fn strip_annotations(&self) -> &IonValue {
        match self {
            IonValue::Annotated(_, inner) => inner.strip_annotations(),
            other => other,
        }
    }

    fn annotations(&self) -> &[SymbolToken] {
        match self {
            IonValue::Annotated(annotations, _) => annotations,
            _ => &[],
        }
    }
}

/// One frame of cursor state: the container's children (a plain list, or a
/// struct's fields) and a cursor index into it.
enum Frame<'a> {
    List { items: &'a [IonValue], index: usize },
    Struct { fields: &'a [Field], index: usize },
}

/// Walks an [`IonValue`] tree as a [`Reader`].
pub struct ValueCursor<'a> {
    stack: Vec<Frame<'a>>,
}

impl<'a> ValueCursor<'a> {
    /// A cursor positioned before the single top-level `value`.
    pub fn new(value: &'a IonValue) -> Self {
        // A one-element slice lets the top level reuse the same Frame logic
        // as any nested list.
        let root: &'a [IonValue] = std::slice::from_ref(value);
        Self {
            stack: vec![Frame::List { items: root, index: 0 }],
        }
    }

    fn current(&self) -> Option<&'a IonValue> {
        match self.stack.last()? {
            Frame::List { items, index } => items.get(index.wrapping_sub(1)),
            Frame::Struct { fields, index } => {
                fields.get(index.wrapping_sub(1)).map(|f| &f.value)
            }
        }
    }

    fn current_field(&self) -> Option<&'a Field> {
        match self.stack.last()? {
            Frame::Struct { fields, index } => fields.get(index.wrapping_sub(1)),
            Frame::List { .. } => None,
        }
    }
}

impl<'a> Reader for ValueCursor<'a> {
    fn next(&mut self) -> Option<ValueType> {
        let frame = self.stack.last_mut()?;
        let len = match frame {
            Frame::List { items, .. } => items.len(),
            Frame::Struct { fields, .. } => fields.len(),
        };
        let index = match frame {
            Frame::List { index, .. } | Frame::Struct { index, .. } => index,
        };
        if *index >= len {
            return None;
        }
        *index += 1;
        self.current().map(IonValue::value_type)
    }

    fn step_in(&mut self) {
        let Some(current) = self.current() else {
            return;
        };
        match current.strip_annotations() {
            IonValue::List(items) => self.stack.push(Frame::List { items, index: 0 }),
            IonValue::Struct(fields) => self.stack.push(Frame::Struct { fields, index: 0 }),
            _ => {}
        }
    }

    fn step_out(&mut self) {
        if self.stack.len() > 1 {
            self.stack.pop();
        }
    }

    fn is_null(&self) -> bool {
        matches!(self.current().map(IonValue::strip_annotations), Some(IonValue::Null))
    }

    fn read_int32(&self) -> Option<i32> {
        match self.current()?.strip_annotations() {
            IonValue::Int(v) => i32::try_from(*v).ok(),
            _ => None,
        }
    }

    fn read_string(&self) -> Option<&str> {
        match self.current()?.strip_annotations() {
            IonValue::String(s) => Some(s.as_ref()),
            _ => None,
        }
    }

    fn get_field_sid(&self) -> Option<u32> {
        self.current_field()?.name.sid
    }

    fn get_field_name(&self) -> Option<&str> {
        self.current_field()?.name.text.as_deref()
    }

    fn get_annotation(&self, index: usize) -> Option<&str> {
        self.current()?.annotations().get(index)?.text.as_deref()
    }

    fn get_annotation_sid(&self, index: usize) -> Option<u32> {
        self.current()?.annotations().get(index)?.sid
    }

    fn read_symbol_sid(&self) -> Option<u32> {
        match self.current()?.strip_annotations() {
            IonValue::Symbol(token) => token.sid,
            _ => None,
        }
    }

    fn read_symbol_text(&self) -> Option<&str> {
        match self.current()?.strip_annotations() {
            IonValue::Symbol(token) => token.text.as_deref(),
            _ => None,
        }
    }

    fn read_symbol_import_location(&self) -> Option<ImportLocation> {
        match self.current()?.strip_annotations() {
            IonValue::Symbol(token) => token.import_location.clone(),
            _ => None,
        }
    }
}

/// Builds an [`IonValue`] tree through the [`Writer`] trait.
///
/// Mirrors the upstream encoder's "current open container" stack, except
/// the sink is an in-memory tree rather than a byte buffer.
pub struct ValueBuilder {
    pending_annotations: Vec<SymbolToken>,
    pending_field: Option<SymbolToken>,
    stack: Vec<Container>,
    finished: Vec<IonValue>,
}

enum Container {
    List(Vec<IonValue>),
    Struct(Vec<Field>),
}

impl ValueBuilder {
    pub fn new() -> Self {
        Self {
            pending_annotations: Vec::new(),
            pending_field: None,
            stack: Vec::new(),
            finished: Vec::new(),
        }
    }

    /// Consumes the builder, returning the single top-level value written.
    pub fn finish(mut self) -> IonValue {
        self.finished.pop().expect("writer produced no value")
    }

    fn push_value(&mut self, value: IonValue) {
        let value = value.annotated(std::mem::take(&mut self.pending_annotations));
        match self.stack.last_mut() {
            Some(Container::List(items)) => items.push(value),
            Some(Container::Struct(fields)) => {
                let name = self.pending_field.take().unwrap_or_default();
                fields.push(Field { name, value });
            }
            None => self.finished.push(value),
        }
    }
}

impl Default for ValueBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Writer for ValueBuilder {
    fn add_annotation_sid(&mut self, sid: u32) {
        self.pending_annotations.push(SymbolToken::sid(sid));
    }

    fn write_field_sid(&mut self, sid: u32) {
        self.pending_field = Some(SymbolToken::sid(sid));
    }

    fn start_container_list(&mut self) {
        self.stack.push(Container::List(Vec::new()));
    }

    fn start_container_struct(&mut self) {
        self.stack.push(Container::Struct(Vec::new()));
    }

    fn finish_container(&mut self) {
        let container = self.stack.pop().expect("finish_container without start");
        let value = match container {
            Container::List(items) => IonValue::List(items),
            Container::Struct(fields) => IonValue::Struct(fields),
        };
        self.push_value(value);
    }

    fn write_string(&mut self, text: &str) {
        self.push_value(IonValue::String(Rc::from(text)));
    }

    fn write_symbol_sid(&mut self, sid: u32) {
        self.push_value(IonValue::Symbol(SymbolToken::sid(sid)));
    }

    fn write_symbol_text(&mut self, text: &str) {
        self.push_value(IonValue::Symbol(SymbolToken::text(text)));
    }

    fn write_int64(&mut self, value: i64) {
        self.push_value(IonValue::Int(value));
    }

    fn write_null(&mut self) {
        self.push_value(IonValue::Null);
    }
}
