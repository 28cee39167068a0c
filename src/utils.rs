//! Utility functions for hex conversion and byte manipulation.
//!
//! This module provides helpers for working with raw data block contents:
//! hex string conversion for block values, bit access on single bytes, and
//! the trimming rule applied to PLC strings.
//!
//! # Example
//!
//! ```
//! use s7_db::utils::{bytes_to_hex, get_bit, hex_to_bytes, set_bit};
//!
//! let bytes = hex_to_bytes("0A1F").unwrap();
//! assert_eq!(bytes, vec![0x0A, 0x1F]);
//! assert_eq!(bytes_to_hex(&bytes), "0A 1F");
//!
//! assert!(get_bit(0b0000_1000, 3));
//! assert_eq!(set_bit(0x00, 7, true), 0x80);
//! ```

use crate::error::{Result, S7Error};

/// Converts a hex string into bytes.
///
/// Upper- and lower-case digits are accepted.
///
/// # Errors
///
/// Returns `S7Error::InvalidEncoding` if the string has an odd number of
/// characters or contains a non-hex character.
///
/// # Example
///
/// ```
/// use s7_db::utils::hex_to_bytes;
///
/// assert_eq!(hex_to_bytes("0a1f").unwrap(), vec![0x0A, 0x1F]);
/// assert!(hex_to_bytes("ABC").is_err());
/// ```
pub fn hex_to_bytes(hex_string: &str) -> Result<Vec<u8>> {
    if hex_string.len() % 2 != 0 {
        return Err(S7Error::invalid_encoding(format!(
            "hex string must have an even number of characters, got {}",
            hex_string.len()
        )));
    }
    hex::decode(hex_string).map_err(|e| S7Error::invalid_encoding(e.to_string()))
}

/// Formats bytes as space-separated upper-case hex pairs.
///
/// # Example
///
/// ```
/// use s7_db::utils::bytes_to_hex;
///
/// assert_eq!(bytes_to_hex(&[0x03, 0x00, 0x00, 0x16]), "03 00 00 16");
/// assert_eq!(bytes_to_hex(&[]), "");
/// ```
pub fn bytes_to_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Gets a single bit from a byte.
///
/// # Arguments
///
/// * `value` - Byte to read from
/// * `bit` - Bit position (0-7)
///
/// Bit positions above 7 read as OFF.
///
/// # Example
///
/// ```
/// use s7_db::utils::get_bit;
///
/// assert!(get_bit(0b0000_0101, 0));
/// assert!(!get_bit(0b0000_0101, 1));
/// ```
pub fn get_bit(value: u8, bit: u8) -> bool {
    bit < 8 && (value >> bit) & 0x01 == 1
}

/// Returns `value` with the given bit set to `state`.
///
/// Bit positions above 7 leave the byte unchanged.
pub fn set_bit(value: u8, bit: u8, state: bool) -> u8 {
    if bit > 7 {
        return value;
    }
    if state {
        value | (1 << bit)
    } else {
        value & !(1 << bit)
    }
}

/// Trims a PLC string the way values are stored and displayed.
///
/// Leading and trailing characters up to U+0020 are removed, which covers
/// ASCII whitespace, control characters and NUL padding.
///
/// # Example
///
/// ```
/// use s7_db::utils::trim_plc_string;
///
/// assert_eq!(trim_plc_string("\u{0A}\u{05}hello\0\0"), "hello");
/// ```
pub fn trim_plc_string(value: &str) -> &str {
    value.trim_matches(|c: char| c <= ' ')
}
