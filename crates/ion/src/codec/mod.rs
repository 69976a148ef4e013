//! Low-level Ion binary codec: a minimal subset of the wire format, just
//! deep enough to carry struct/list/string/symbol/int/bool/null/annotation
//! values — the shapes a symbol table (and its imports) can actually take.
//!
//! Upstream reference: `ion/decoder_base.rs` and `ion/encoder.rs`'s
//! type-descriptor switch, trimmed to the subset spec.md §6 requires (no
//! floats, decimals, timestamps, blobs, or clobs: symbol tables never carry
//! them).

pub mod binary;

pub use binary::{decode, encode};

use json_joy_buffers::BufferError;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IonCodecError {
    #[error("unexpected end of input")]
    UnexpectedEof,

    #[error("invalid type descriptor byte 0x{0:02x}")]
    InvalidTypeDescriptor(u8),

    #[error("varint/varuint overflowed 64 bits")]
    VarIntOverflow,

    #[error("length {0} exceeds the value's declared bounds")]
    LengthOutOfBounds(u64),

    #[error("unsupported or reserved type code {0}")]
    UnsupportedType(u8),

    #[error("invalid UTF-8 in string or symbol text")]
    InvalidUtf8,

    #[error(transparent)]
    Buffer(#[from] BufferError),
}
