// SMPP v3.4 wire codec primitives - header handling and field-level
// encode/decode helpers shared by the schema-driven PDU layer.
//
// The header is four big-endian u32 fields. The body is a sequence of
// mandatory parameters in declared order followed by optional TLVs; the
// per-field rules live here, the ordering rules live in `pdu`.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::io::Cursor;
use thiserror::Error;

/// Maximum accepted PDU size. Frames beyond this are rejected before the body
/// is read to keep a misbehaving peer from exhausting memory.
pub const MAX_PDU_SIZE: u32 = 65536; // 64 KiB

/// SMPP v3.4 PDU header (16 bytes, common to all PDUs).
///
/// `command_id` and `command_status` stay raw here: unknown command ids must
/// be reportable with the frame bytes attached, and vendor-specific status
/// codes outside Section 5.1.3 must survive decoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PduHeader {
    pub command_length: u32,
    pub command_id: u32,
    pub command_status: u32,
    pub sequence_number: u32,
}

impl PduHeader {
    pub const SIZE: usize = 16;

    pub fn decode(cur: &mut Cursor<&[u8]>) -> Result<Self, DecodeError> {
        if cur.remaining() < Self::SIZE {
            return Err(DecodeError::HeaderTooShort);
        }
        Ok(PduHeader {
            command_length: cur.get_u32(),
            command_id: cur.get_u32(),
            command_status: cur.get_u32(),
            sequence_number: cur.get_u32(),
        })
    }

    pub fn encode(&self, buf: &mut BytesMut) {
        buf.put_u32(self.command_length);
        buf.put_u32(self.command_id);
        buf.put_u32(self.command_status);
        buf.put_u32(self.sequence_number);
    }
}

/// Total frame length announced by the first four bytes of a PDU.
///
/// The session engine reads exactly four bytes, calls this, then reads the
/// remaining `frame_length - 4` bytes of the frame.
pub fn frame_length(prefix: &[u8; 4]) -> u32 {
    u32::from_be_bytes(*prefix)
}

/// Errors raised while building wire bytes from a PDU value.
///
/// All of these surface synchronously from the send call; the socket is
/// untouched when one is returned.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("'{param}' with its NUL terminator exceeds {max} octets")]
    CStringTooLong { param: String, max: usize },

    #[error("'{param}' value {value} does not fit in {size} octet(s)")]
    IntegerOutOfRange { param: String, value: u32, size: usize },

    #[error("'{param}' exceeds its maximum of {max} octets (got {len})")]
    OctetStringTooLong { param: String, max: usize, len: usize },

    #[error("'{param}' requires exactly {expected} octets, got {actual}")]
    FixedLengthMismatch {
        param: String,
        expected: usize,
        actual: usize,
    },

    #[error("'{param}' takes a {expected} value")]
    WrongType { param: String, expected: &'static str },

    #[error("{command} has no parameter named '{param}'")]
    UnknownParam { command: &'static str, param: String },
}

/// Errors raised while parsing wire bytes into a PDU value.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("frame is shorter than a PDU header")]
    HeaderTooShort,

    #[error("command_length {length} out of bounds ({min}..={max})")]
    InvalidCommandLength { length: u32, min: u32, max: u32 },

    #[error("unknown command_id {id:#010x}")]
    UnknownCommandId { id: u32, raw: Bytes },

    #[error("body ended inside parameter '{param}'")]
    UnexpectedEof { param: String },

    #[error("no NUL terminator for '{param}' within {max} octets")]
    UnterminatedCString { param: String, max: usize },

    #[error("'{param}' is not valid UTF-8")]
    BadString {
        param: String,
        #[source]
        source: std::string::FromUtf8Error,
    },

    #[error("octet string '{param}' has no parsed length field")]
    MissingLength { param: String },

    #[error("TLV {tag:#06x} value extends past the end of the body")]
    TruncatedTlv { tag: u16 },

    #[error("TLV {tag:#06x} carries {len} octets where {expected} are expected")]
    BadTlvLength { tag: u16, len: usize, expected: usize },

    #[error("{remaining} dangling octets after the last parameter")]
    TrailingBytes { remaining: usize },
}

/// Write a c_octet_string: the value followed by one NUL. `max` includes the
/// terminator.
pub fn encode_cstring(
    buf: &mut BytesMut,
    value: &str,
    max: usize,
    param: &str,
) -> Result<(), EncodeError> {
    let bytes = value.as_bytes();
    if bytes.len() + 1 > max {
        return Err(EncodeError::CStringTooLong {
            param: param.to_string(),
            max,
        });
    }
    buf.put_slice(bytes);
    buf.put_u8(0);
    Ok(())
}

/// Read a c_octet_string of at most `max` octets including the terminator.
pub fn decode_cstring(
    cur: &mut Cursor<&[u8]>,
    max: usize,
    param: &str,
) -> Result<String, DecodeError> {
    let start = cur.position() as usize;
    let data = *cur.get_ref();
    let window = &data[start..data.len().min(start + max)];
    let nul = window
        .iter()
        .position(|&b| b == 0)
        .ok_or_else(|| if start + max > data.len() {
            DecodeError::UnexpectedEof {
                param: param.to_string(),
            }
        } else {
            DecodeError::UnterminatedCString {
                param: param.to_string(),
                max,
            }
        })?;
    let value = String::from_utf8(window[..nul].to_vec()).map_err(|source| {
        DecodeError::BadString {
            param: param.to_string(),
            source,
        }
    })?;
    cur.set_position((start + nul + 1) as u64);
    Ok(value)
}

/// Write an unsigned integer of 1, 2 or 4 octets, big-endian.
pub fn encode_uint(
    buf: &mut BytesMut,
    value: u32,
    size: usize,
    param: &str,
) -> Result<(), EncodeError> {
    let out_of_range = match size {
        1 => value > u8::MAX as u32,
        2 => value > u16::MAX as u32,
        _ => false,
    };
    if out_of_range {
        return Err(EncodeError::IntegerOutOfRange {
            param: param.to_string(),
            value,
            size,
        });
    }
    match size {
        1 => buf.put_u8(value as u8),
        2 => buf.put_u16(value as u16),
        _ => buf.put_u32(value),
    }
    Ok(())
}

/// Read an unsigned integer of 1, 2 or 4 octets, big-endian.
pub fn decode_uint(cur: &mut Cursor<&[u8]>, size: usize, param: &str) -> Result<u32, DecodeError> {
    if cur.remaining() < size {
        return Err(DecodeError::UnexpectedEof {
            param: param.to_string(),
        });
    }
    Ok(match size {
        1 => cur.get_u8() as u32,
        2 => cur.get_u16() as u32,
        _ => cur.get_u32(),
    })
}

/// Read `len` raw octets.
pub fn decode_octets(
    cur: &mut Cursor<&[u8]>,
    len: usize,
    param: &str,
) -> Result<Bytes, DecodeError> {
    if cur.remaining() < len {
        return Err(DecodeError::UnexpectedEof {
            param: param.to_string(),
        });
    }
    Ok(cur.copy_to_bytes(len))
}
