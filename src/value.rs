//! Typed values stored in PLC data blocks.
//!
//! [`DataType`] is the closed set of types this client reads and writes, and
//! [`Value`] is the matching tagged value. A [`Tag`] ties a data type to its
//! [`Address`].
//!
//! | Type | Size (bytes) | Encoding |
//! |------|--------------|----------|
//! | Bit | 1 bit | low bit of the data byte |
//! | Byte | 1 | signed byte |
//! | Integer | 2 | big-endian `i16` (S7 `INT`) |
//! | Float | 4 | big-endian IEEE-754 `f32` (S7 `REAL`) |
//! | String(n) | n + 2 | capacity byte, length byte, UTF-8 bytes |
//! | Block(n) | n | raw bytes |
//!
//! # Example
//!
//! ```
//! use s7_db::{DataType, Tag, Value};
//!
//! let data_type: DataType = "integer".parse().unwrap();
//! assert_eq!(data_type, DataType::Integer);
//!
//! let tag = Tag::new(10, 4, DataType::Float);
//! assert_eq!(tag.address.size, 4);
//! assert!(Value::Float(1.5).matches(&tag.data_type));
//! ```

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, S7Error};
use crate::memory::{Address, TransportSize};

/// Data types supported by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DataType {
    /// Single bit.
    Bit,
    /// Signed byte.
    Byte,
    /// 16-bit signed integer.
    Integer,
    /// 32-bit IEEE-754 float.
    Float,
    /// String with the given maximum capacity in bytes.
    String(u16),
    /// Raw byte block of the given length.
    Block(u16),
}

impl DataType {
    /// Returns the transport size used to address this type.
    pub fn transport_size(self) -> TransportSize {
        match self {
            DataType::Bit => TransportSize::Bit,
            _ => TransportSize::Byte,
        }
    }

    /// Returns the natural size of this type in bytes (1 for a bit).
    ///
    /// # Example
    ///
    /// ```
    /// use s7_db::DataType;
    ///
    /// assert_eq!(DataType::Integer.size(), 2);
    /// assert_eq!(DataType::String(20).size(), 20);
    /// ```
    pub fn size(self) -> u16 {
        match self {
            DataType::Bit | DataType::Byte => 1,
            DataType::Integer => 2,
            DataType::Float => 4,
            DataType::String(max_len) => max_len,
            DataType::Block(len) => len,
        }
    }

    /// Returns this type with its length replaced by `len`.
    ///
    /// Only `String` and `Block` carry a length; other types are returned
    /// unchanged.
    ///
    /// # Example
    ///
    /// ```
    /// use s7_db::DataType;
    ///
    /// assert_eq!(DataType::String(0).with_len(16), DataType::String(16));
    /// assert_eq!(DataType::Integer.with_len(16), DataType::Integer);
    /// ```
    pub fn with_len(self, len: u16) -> Self {
        match self {
            DataType::String(_) => DataType::String(len),
            DataType::Block(_) => DataType::Block(len),
            other => other,
        }
    }

    /// Returns the name of this type, without its length.
    pub fn name(self) -> &'static str {
        match self {
            DataType::Bit => "Bit",
            DataType::Byte => "Byte",
            DataType::Integer => "Integer",
            DataType::Float => "Float",
            DataType::String(_) => "String",
            DataType::Block(_) => "Block",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::String(len) | DataType::Block(len) => write!(f, "{}({})", self.name(), len),
            _ => f.write_str(self.name()),
        }
    }
}

/// Parses the type names used by form and record collaborators.
///
/// Names are case-insensitive. `String` and `Block` parse with length 0 and
/// must be sized with [`Tag::with_size`]; at size 0 they carry no text or bytes.
impl FromStr for DataType {
    type Err = S7Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bit" | "bool" | "boolean" => Ok(DataType::Bit),
            "byte" => Ok(DataType::Byte),
            "int" | "integer" => Ok(DataType::Integer),
            "float" | "real" => Ok(DataType::Float),
            "string" => Ok(DataType::String(0)),
            "block" => Ok(DataType::Block(0)),
            _ => Err(S7Error::type_mismatch(
                "one of Bit, Byte, Integer, Float, String, Block",
                s,
            )),
        }
    }
}

/// A value read from or written to a data block.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    /// Bit value.
    Bit(bool),
    /// Signed byte.
    Byte(i8),
    /// 16-bit signed integer.
    Integer(i16),
    /// 32-bit float.
    Float(f32),
    /// Trimmed string.
    String(String),
    /// Raw bytes.
    Block(Vec<u8>),
}

impl Value {
    /// Returns the name of the data type this value carries.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bit(_) => "Bit",
            Value::Byte(_) => "Byte",
            Value::Integer(_) => "Integer",
            Value::Float(_) => "Float",
            Value::String(_) => "String",
            Value::Block(_) => "Block",
        }
    }

    /// Returns whether this value can be encoded as `data_type`.
    pub fn matches(&self, data_type: &DataType) -> bool {
        matches!(
            (self, data_type),
            (Value::Bit(_), DataType::Bit)
                | (Value::Byte(_), DataType::Byte)
                | (Value::Integer(_), DataType::Integer)
                | (Value::Float(_), DataType::Float)
                | (Value::String(_), DataType::String(_))
                | (Value::Block(_), DataType::Block(_))
        )
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bit(v) => write!(f, "{}", v),
            Value::Byte(v) => write!(f, "{}", v),
            Value::Integer(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::String(v) => f.write_str(v),
            Value::Block(v) => f.write_str(&crate::utils::bytes_to_hex(v)),
        }
    }
}

/// A typed location in a data block.
///
/// `address.size` is the size put on the wire and handed to the decoder.
/// [`Tag::new`] and [`Tag::with_size`] keep the length carried by a `String`
/// or `Block` data type equal to it.
///
/// # Example
///
/// ```
/// use s7_db::{DataType, Tag};
///
/// let data_type: DataType = "string".parse().unwrap();
/// let tag = Tag::new(1, 0, data_type).with_size(20);
/// assert_eq!(tag.address.size, 20);
/// assert_eq!(tag.data_type, DataType::String(20));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tag {
    /// Where the value lives.
    pub address: Address,
    /// How the value is encoded.
    pub data_type: DataType,
}

impl Tag {
    /// Creates a tag sized by the natural size of `data_type`.
    pub fn new(db_number: u16, byte_offset: u32, data_type: DataType) -> Self {
        Self {
            address: Address::new(db_number, byte_offset, data_type.size()),
            data_type,
        }
    }

    /// Creates a single-bit tag.
    pub fn bit(db_number: u16, byte_offset: u32, bit_number: u8) -> Self {
        Self {
            address: Address::bit(db_number, byte_offset, bit_number),
            data_type: DataType::Bit,
        }
    }

    /// Overrides the declared size.
    ///
    /// The size is sent to the PLC as-is, even when it disagrees with the
    /// natural size of the value. A `String` or `Block` data type takes the
    /// new size as its length.
    pub fn with_size(mut self, size: u16) -> Self {
        self.address.size = size;
        self.data_type = self.data_type.with_len(size);
        self
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.address, self.data_type)
    }
}
