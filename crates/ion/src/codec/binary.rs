//! Binary Ion type-descriptor / VarUInt / VarInt primitives, and
//! encode/decode for the [`IonValue`] subset this crate needs.
//!
//! Upstream reference: `ion/decoder_base.rs`'s type-descriptor switch and
//! `ion/encoder.rs`'s length-prefixing, ported onto
//! [`json_joy_buffers::Reader`]/[`json_joy_buffers::Writer`] instead of the
//! teacher's JS-buffer-oriented ones.

use json_joy_buffers::{Reader as ByteReader, Writer as ByteWriter};

use super::IonCodecError;
use crate::value::{Field, IonValue, SymbolToken};

const TYPE_NULL: u8 = 0;
const TYPE_BOOL: u8 = 1;
const TYPE_POSINT: u8 = 2;
const TYPE_NEGINT: u8 = 3;
const TYPE_SYMBOL: u8 = 7;
const TYPE_STRING: u8 = 8;
const TYPE_LIST: u8 = 11;
const TYPE_STRUCT: u8 = 13;
const TYPE_ANNOTATION: u8 = 14;

const LEN_VAR: u8 = 14;
const LEN_NULL: u8 = 15;

fn read_vuint(r: &mut ByteReader<'_>) -> Result<u64, IonCodecError> {
    let mut value: u64 = 0;
    for _ in 0..10 {
        let byte = r.try_u8()?;
        value = value
            .checked_shl(7)
            .ok_or(IonCodecError::VarIntOverflow)?
            | u64::from(byte & 0x7f);
        if byte & 0x80 != 0 {
            return Ok(value);
        }
    }
    Err(IonCodecError::VarIntOverflow)
}

fn write_vuint(w: &mut ByteWriter, mut value: u64) {
    let mut bytes = [0u8; 10];
    let mut i = bytes.len();
    loop {
        i -= 1;
        bytes[i] = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            break;
        }
    }
    bytes[bytes.len() - 1] |= 0x80;
    w.buf(&bytes[i..]);
}

fn read_vint(r: &mut ByteReader<'_>) -> Result<i64, IonCodecError> {
    let first = r.try_u8()?;
    let negative = first & 0x40 != 0;
    let mut value: u64 = u64::from(first & 0x3f);
    if first & 0x80 != 0 {
        return Ok(if negative { -(value as i64) } else { value as i64 });
    }
    loop {
        let byte = r.try_u8()?;
        value = value
            .checked_shl(7)
            .ok_or(IonCodecError::VarIntOverflow)?
            | u64::from(byte & 0x7f);
        if byte & 0x80 != 0 {
            break;
        }
    }
    Ok(if negative { -(value as i64) } else { value as i64 })
}

fn read_uint_magnitude(r: &mut ByteReader<'_>, len: usize) -> Result<u64, IonCodecError> {
    let bytes = r.try_buf(len)?;
    let mut value: u64 = 0;
    for &b in bytes {
        value = value
            .checked_shl(8)
            .ok_or(IonCodecError::VarIntOverflow)?
            | u64::from(b);
    }
    Ok(value)
}

/// Reads the length that follows a type descriptor's low nibble: an inline
/// length (0-13), a trailing VarUInt (14), or "this is a typed null" (15,
/// represented here as `None`).
fn read_length(r: &mut ByteReader<'_>, low_nibble: u8) -> Result<Option<usize>, IonCodecError> {
    match low_nibble {
        LEN_NULL => Ok(None),
        LEN_VAR => {
            let len = read_vuint(r)?;
            Ok(Some(usize::try_from(len).map_err(|_| IonCodecError::VarIntOverflow)?))
        }
        n => Ok(Some(n as usize)),
    }
}

/// Decodes exactly one top-level Ion value (with any leading annotation
/// wrapper) from `bytes`.
pub fn decode(bytes: &[u8]) -> Result<IonValue, IonCodecError> {
    let mut reader = ByteReader::new(bytes);
    decode_value(&mut reader)
}

fn decode_value(r: &mut ByteReader<'_>) -> Result<IonValue, IonCodecError> {
    let descriptor = r.try_u8()?;
    let type_code = descriptor >> 4;
    let low_nibble = descriptor & 0x0f;

    match type_code {
        TYPE_NULL => {
            if low_nibble != LEN_NULL {
                // A non-null-typed descriptor with nibble 15 still means
                // null; any other nibble under type 0 is malformed.
                return Err(IonCodecError::InvalidTypeDescriptor(descriptor));
            }
            Ok(IonValue::Null)
        }
        TYPE_BOOL => match low_nibble {
            LEN_NULL => Ok(IonValue::Null),
            0 => Ok(IonValue::Bool(false)),
            1 => Ok(IonValue::Bool(true)),
            _ => Err(IonCodecError::InvalidTypeDescriptor(descriptor)),
        },
        TYPE_POSINT | TYPE_NEGINT => {
            let Some(len) = read_length(r, low_nibble)? else {
                return Ok(IonValue::Null);
            };
            if len == 0 {
                return Ok(IonValue::Int(0));
            }
            let magnitude = read_uint_magnitude(r, len)?;
            let magnitude = i64::try_from(magnitude).map_err(|_| IonCodecError::VarIntOverflow)?;
            let value = if type_code == TYPE_NEGINT { -magnitude } else { magnitude };
            Ok(IonValue::Int(value))
        }
        TYPE_STRING => {
            let Some(len) = read_length(r, low_nibble)? else {
                return Ok(IonValue::Null);
            };
            let text = r.try_utf8(len).map_err(|_| IonCodecError::InvalidUtf8)?;
            Ok(IonValue::String(text.into()))
        }
        TYPE_SYMBOL => {
            let Some(len) = read_length(r, low_nibble)? else {
                return Ok(IonValue::Null);
            };
            let sid = read_uint_magnitude(r, len)?;
            let sid = u32::try_from(sid).map_err(|_| IonCodecError::LengthOutOfBounds(sid))?;
            Ok(IonValue::Symbol(SymbolToken::sid(sid)))
        }
        TYPE_LIST => {
            let Some(len) = read_length(r, low_nibble)? else {
                return Ok(IonValue::Null);
            };
            let end = r.x + len;
            let mut items = Vec::new();
            while r.x < end {
                items.push(decode_value(r)?);
            }
            Ok(IonValue::List(items))
        }
        TYPE_STRUCT => {
            let Some(len) = read_length(r, low_nibble)? else {
                return Ok(IonValue::Null);
            };
            let end = r.x + len;
            let mut fields = Vec::new();
            while r.x < end {
                let field_sid = read_vuint(r)?;
                let field_sid =
                    u32::try_from(field_sid).map_err(|_| IonCodecError::LengthOutOfBounds(field_sid))?;
                let value = decode_value(r)?;
                fields.push(Field {
                    name: SymbolToken::sid(field_sid),
                    value,
                });
            }
            Ok(IonValue::Struct(fields))
        }
        TYPE_ANNOTATION => {
            let Some(len) = read_length(r, low_nibble)? else {
                return Err(IonCodecError::InvalidTypeDescriptor(descriptor));
            };
            let end = r.x + len;
            let annot_len = read_vuint(r)?;
            let annot_end = r.x + usize::try_from(annot_len).map_err(|_| IonCodecError::VarIntOverflow)?;
            let mut annotations = Vec::new();
            while r.x < annot_end {
                let sid = read_vuint(r)?;
                let sid = u32::try_from(sid).map_err(|_| IonCodecError::LengthOutOfBounds(sid))?;
                annotations.push(SymbolToken::sid(sid));
            }
            let inner = decode_value(r)?;
            if r.x != end {
                return Err(IonCodecError::LengthOutOfBounds(len as u64));
            }
            Ok(inner.annotated(annotations))
        }
        _ => Err(IonCodecError::UnsupportedType(type_code)),
    }
}

/// Encodes a single top-level Ion value.
pub fn encode(value: &IonValue) -> Vec<u8> {
    let mut writer = ByteWriter::new();
    encode_value(&mut writer, value);
    writer.flush()
}

fn encode_value(w: &mut ByteWriter, value: &IonValue) {
    match value {
        IonValue::Annotated(annotations, inner) => {
            let mut annot_body = ByteWriter::new();
            for token in annotations {
                write_vuint(&mut annot_body, u64::from(token.sid.unwrap_or(0)));
            }
            let annot_bytes = annot_body.flush();

            let mut inner_writer = ByteWriter::new();
            encode_value(&mut inner_writer, inner);
            let inner_bytes = inner_writer.flush();

            let mut body = ByteWriter::new();
            write_vuint(&mut body, annot_bytes.len() as u64);
            body.buf(&annot_bytes);
            body.buf(&inner_bytes);
            let body_bytes = body.flush();

            write_descriptor_and_body(w, TYPE_ANNOTATION, &body_bytes);
        }
        IonValue::Null => w.u8((TYPE_NULL << 4) | LEN_NULL),
        IonValue::Bool(b) => w.u8((TYPE_BOOL << 4) | if *b { 1 } else { 0 }),
        IonValue::Int(value) => {
            let type_code = if *value < 0 { TYPE_NEGINT } else { TYPE_POSINT };
            let magnitude = value.unsigned_abs();
            let body = uint_magnitude_bytes(magnitude);
            write_descriptor_and_body(w, type_code, &body);
        }
        IonValue::String(text) => {
            write_descriptor_and_body(w, TYPE_STRING, text.as_bytes());
        }
        IonValue::Symbol(token) => {
            let sid = token.sid.unwrap_or(0);
            let body = uint_magnitude_bytes(u64::from(sid));
            write_descriptor_and_body(w, TYPE_SYMBOL, &body);
        }
        IonValue::List(items) => {
            let mut body = ByteWriter::new();
            for item in items {
                encode_value(&mut body, item);
            }
            write_descriptor_and_body(w, TYPE_LIST, &body.flush());
        }
        IonValue::Struct(fields) => {
            let mut body = ByteWriter::new();
            for field in fields {
                write_vuint(&mut body, u64::from(field.name.sid.unwrap_or(0)));
                encode_value(&mut body, &field.value);
            }
            write_descriptor_and_body(w, TYPE_STRUCT, &body.flush());
        }
    }
}

fn uint_magnitude_bytes(mut value: u64) -> Vec<u8> {
    if value == 0 {
        return Vec::new();
    }
    let mut bytes = Vec::new();
    while value > 0 {
        bytes.push((value & 0xff) as u8);
        value >>= 8;
    }
    bytes.reverse();
    bytes
}

fn write_descriptor_and_body(w: &mut ByteWriter, type_code: u8, body: &[u8]) {
    if body.len() < LEN_VAR as usize {
        w.u8((type_code << 4) | body.len() as u8);
        w.buf(body);
    } else {
        w.u8((type_code << 4) | LEN_VAR);
        write_vuint(w, body.len() as u64);
        w.buf(body);
    }
}
