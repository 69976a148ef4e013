//! The write-side collaborator trait the serializer is built against.
//!
//! Upstream reference: `ion/encoder.rs`'s builder API, narrowed to what
//! spec.md §6 lists as what the serializer needs to emit a symbol table
//! struct. A concrete implementation builds an in-memory
//! [`crate::value::IonValue`] tree ([`crate::value::ValueBuilder`]).

pub trait Writer {
    fn add_annotation_sid(&mut self, sid: u32);

    fn write_field_sid(&mut self, sid: u32);

    fn start_container_list(&mut self);

    fn start_container_struct(&mut self);

    fn finish_container(&mut self);

    fn write_string(&mut self, text: &str);

    fn write_symbol_sid(&mut self, sid: u32);

    fn write_symbol_text(&mut self, text: &str);

    fn write_int64(&mut self, value: i64);

    fn write_null(&mut self);
}
