//! S7 response decoding.
//!
//! Replies are decoded at fixed offsets, which is valid for single-item
//! Read-Var and Write-Var responses only.
//!
//! # Response Layout
//!
//! | Offset | Read-Var reply | Write-Var reply |
//! |--------|----------------|-----------------|
//! | 0-6 | TPKT + COTP | TPKT + COTP |
//! | 7-18 | S7 Ack-Data header | S7 Ack-Data header |
//! | 19-20 | function, item count | function, item count |
//! | 21 | item return code | item return code (0xFF = success) |
//! | 22-24 | transport size, bit length | - |
//! | 25.. | item data | - |
//!
//! # Example
//!
//! ```
//! use s7_db::{decode_reply, decode_write_ack, DataType, Value};
//!
//! let mut reply = vec![0u8; 25];
//! reply.extend_from_slice(&[0xFF, 0xFF]);
//! assert_eq!(decode_reply(&reply, DataType::Integer, 2).unwrap(), Value::Integer(-1));
//!
//! let mut ack = vec![0u8; 22];
//! ack[21] = 0xFF;
//! assert!(decode_write_ack(&ack).unwrap());
//! ```

use crate::error::{Result, S7Error};
use crate::utils::{get_bit, trim_plc_string};
use crate::value::{DataType, Value};

/// Offset of the item data in a single-item Read-Var reply.
pub const READ_DATA_OFFSET: usize = 25;

/// Offset of the item return code in a single-item Write-Var reply.
pub const WRITE_ACK_OFFSET: usize = 21;

/// Item return code for a successful access.
pub const RETURN_CODE_SUCCESS: u8 = 0xFF;

/// Header bytes (capacity, current length) in front of the text of an S7 string.
pub const STRING_HEADER_SIZE: usize = 2;

/// Returns the `len` data bytes starting `skip` bytes past [`READ_DATA_OFFSET`].
fn data_slice(response: &[u8], skip: usize, len: usize) -> Result<&[u8]> {
    let start = READ_DATA_OFFSET + skip;
    let end = start + len;
    response.get(start..end).ok_or_else(|| {
        S7Error::protocol(format!(
            "read reply too short: expected at least {} bytes, got {}",
            end,
            response.len()
        ))
    })
}

/// Decodes the value carried by a single-item Read-Var reply.
///
/// # Arguments
///
/// * `response` - Complete reply frame, TPKT header included
/// * `data_type` - Type to decode
/// * `size` - Declared size of the tag; only `String` and `Block` use it
///
/// A `Block` copies exactly `size` bytes. A `String` reply carries the same
/// layout a write stores: capacity byte, length byte, then the text. The
/// text is `min(length byte, size)` bytes, decoded as UTF-8 and trimmed.
/// Every other type reads its natural width.
///
/// # Errors
///
/// Returns `S7Error::Protocol` if the reply is too short to hold the value.
///
/// # Example
///
/// ```
/// use s7_db::{decode_reply, DataType, Value};
///
/// let mut reply = vec![0u8; 25];
/// reply.extend_from_slice(&[6, 5]);
/// reply.extend_from_slice(b"pump \0");
/// let value = decode_reply(&reply, DataType::String(6), 6).unwrap();
/// assert_eq!(value, Value::String("pump".into()));
/// ```
pub fn decode_reply(response: &[u8], data_type: DataType, size: u16) -> Result<Value> {
    let value = match data_type {
        DataType::Bit => Value::Bit(get_bit(data_slice(response, 0, 1)?[0], 0)),
        DataType::Byte => Value::Byte(i8::from_be_bytes([data_slice(response, 0, 1)?[0]])),
        DataType::Integer => {
            let data = data_slice(response, 0, 2)?;
            Value::Integer(i16::from_be_bytes([data[0], data[1]]))
        }
        DataType::Float => {
            let data = data_slice(response, 0, 4)?;
            Value::Float(f32::from_be_bytes([data[0], data[1], data[2], data[3]]))
        }
        DataType::String(_) => {
            let header = data_slice(response, 0, STRING_HEADER_SIZE)?;
            let len = usize::from(header[1]).min(usize::from(size));
            let data = data_slice(response, STRING_HEADER_SIZE, len)?;
            let text = String::from_utf8_lossy(data);
            Value::String(trim_plc_string(&text).to_string())
        }
        DataType::Block(_) => Value::Block(data_slice(response, 0, usize::from(size))?.to_vec()),
    };
    Ok(value)
}

/// Decodes the acknowledgement of a single-item Write-Var request.
///
/// Returns `true` when the item return code is 0xFF, `false` for any other code.
///
/// # Errors
///
/// Returns `S7Error::Protocol` if the reply does not reach the return code byte.
pub fn decode_write_ack(response: &[u8]) -> Result<bool> {
    response
        .get(WRITE_ACK_OFFSET)
        .map(|&code| code == RETURN_CODE_SUCCESS)
        .ok_or_else(|| {
            S7Error::protocol(format!(
                "write reply too short: expected at least {} bytes, got {}",
                WRITE_ACK_OFFSET + 1,
                response.len()
            ))
        })
}
