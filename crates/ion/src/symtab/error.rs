//! Error categories for the symbol-table subsystem.
//!
//! Upstream reference: `ion/decoder_base.rs`'s flat `thiserror::Error` enum;
//! category names follow `ion_symbol_table.c`'s `iERR` result codes.

use thiserror::Error;

use crate::codec::IonCodecError;

/// Errors raised by the builder, loader, serializer, and lookup engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SymbolTableError {
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    #[error("table is locked and cannot be mutated")]
    Immutable,

    #[error("cannot add an import after local symbols have been declared")]
    HasLocalSymbols,

    #[error("malformed symbol table: {0}")]
    Malformed(&'static str),

    #[error("duplicate `{0}` field in symbol table struct")]
    DuplicateField(&'static str),

    #[error("import descriptor missing required `name` field")]
    ImportMissingName,

    #[error("import `max_id` is undefined and no shared table could be resolved")]
    UndefinedImportSize,

    #[error("import references a table of kind {0:?}, which cannot be imported")]
    ImportWrongKind(super::table::TableKind),

    #[error("shared table `max_id` must be >= 1, got {0}")]
    SharedMaxIdTooSmall(i64),

    #[error("invalid UTF-8 in symbol text")]
    InvalidUtf8,

    #[error("symbol identifier ${0} cannot be resolved")]
    InvalidSymbol(u32),

    #[error("value is not a symbol table: unrecognized or missing annotation")]
    NotASymbolTable,

    #[error("unsupported system table version: {0}")]
    UnsupportedVersion(i32),

    #[error(transparent)]
    Codec(#[from] IonCodecError),
}
