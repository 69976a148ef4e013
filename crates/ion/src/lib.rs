//! Ion symbol-table subsystem: system/shared/local tables, a loader and
//! serializer built against small `Reader`/`Writer` collaborator traits,
//! and a lookup engine tying imports and local symbols together.
//!
//! The crate also carries a minimal binary Ion codec ([`codec`]) and an
//! in-memory value tree ([`value`]) deep enough to decode/encode the
//! struct shapes a symbol table can take; neither is a general-purpose Ion
//! implementation.

pub mod codec;
pub mod symtab;
pub mod value;

pub use symtab::{
    Catalog, ImportDescriptor, ImportLocation, MapCatalog, OwnerId, ResolvedImport, Symbol,
    SymbolTableError, Table, TableKind,
};
