//! Data block addressing for the S7 protocol.
//!
//! This module defines the [`Address`] of a value inside a PLC data block and
//! the [`TransportSize`] that tells the PLC whether a request targets a single
//! bit or a run of bytes.
//!
//! Only the classic S7-300/400 data block area (`0x84`) is addressed.
//!
//! # Bit Addresses
//!
//! S7 requests carry a 24-bit *bit address* rather than a byte offset:
//!
//! | Transport | Bit address |
//! |-----------|-------------|
//! | Bit | `(byte_offset << 3) & 0xFFF8 \| (bit_number & 0x07)` |
//! | Byte | `byte_offset << 3` |
//!
//! # Example
//!
//! ```
//! use s7_db::{Address, TransportSize};
//!
//! let addr = Address::bit(1, 8, 3);
//! assert_eq!(addr.bit_address(TransportSize::Bit), 67);
//!
//! let addr = Address::new(1, 8, 2);
//! assert_eq!(addr.bit_address(TransportSize::Byte), 64);
//! ```

/// Area code for S7 data blocks.
pub const AREA_DATA_BLOCK: u8 = 0x84;

/// Transport size used in the parameter section of a Read-Var / Write-Var item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportSize {
    /// Single bit access.
    Bit,
    /// Byte-granular access (used for every non-bit type).
    Byte,
}

impl TransportSize {
    /// Returns the code used in the item descriptor.
    pub fn code(self) -> u8 {
        match self {
            TransportSize::Bit => 0x01,
            TransportSize::Byte => 0x02,
        }
    }

    /// Returns the code used in the data section of a write (`code + 2`).
    pub fn data_code(self) -> u8 {
        self.code() + 2
    }
}

/// Location of a value inside a PLC data block.
///
/// `bit_number` is only meaningful for bit access and is ignored otherwise.
/// `size` is always supplied by the caller and is never derived from the
/// value being written. For strings it is the capacity, excluding the two
/// header bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Address {
    /// Data block number.
    pub db_number: u16,
    /// Byte offset inside the data block.
    pub byte_offset: u32,
    /// Bit position (0-7) for bit access.
    pub bit_number: u8,
    /// Number of bytes (or bits, for bit access) transferred.
    pub size: u16,
}

impl Address {
    /// Creates a byte-granular address (bit number 0).
    ///
    /// # Example
    ///
    /// ```
    /// use s7_db::Address;
    ///
    /// let addr = Address::new(10, 4, 2);
    /// assert_eq!(addr.db_number, 10);
    /// assert_eq!(addr.byte_offset, 4);
    /// assert_eq!(addr.bit_number, 0);
    /// assert_eq!(addr.size, 2);
    /// ```
    pub fn new(db_number: u16, byte_offset: u32, size: u16) -> Self {
        Self {
            db_number,
            byte_offset,
            bit_number: 0,
            size,
        }
    }

    /// Creates a single-bit address (size 1).
    pub fn bit(db_number: u16, byte_offset: u32, bit_number: u8) -> Self {
        Self {
            db_number,
            byte_offset,
            bit_number,
            size: 1,
        }
    }

    /// Returns a copy of this address with a different size.
    pub fn with_size(mut self, size: u16) -> Self {
        self.size = size;
        self
    }

    /// Computes the 24-bit protocol bit address for the given transport.
    ///
    /// Bit access keeps only 16 bits of the shifted offset, so bit addresses
    /// alias every 8192 bytes: `Address::bit(1, 8192, 3)` targets DB1.DBX0.3.
    /// Byte access keeps the full 24 bits.
    ///
    /// # Example
    ///
    /// ```
    /// use s7_db::{Address, TransportSize};
    ///
    /// let high = Address::bit(1, 8192, 3).bit_address(TransportSize::Bit);
    /// let low = Address::bit(1, 0, 3).bit_address(TransportSize::Bit);
    /// assert_eq!(high, low);
    /// ```
    pub fn bit_address(&self, transport: TransportSize) -> u32 {
        match transport {
            TransportSize::Bit => {
                ((self.byte_offset << 3) & 0xFFF8) | u32::from(self.bit_number & 0x07)
            }
            TransportSize::Byte => (self.byte_offset << 3) & 0x00FF_FFFF,
        }
    }

    /// Serializes the bit address into the 3-byte big-endian address field.
    pub(crate) fn address_bytes(&self, transport: TransportSize) -> [u8; 3] {
        let [_, b2, b1, b0] = self.bit_address(transport).to_be_bytes();
        [b2, b1, b0]
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "DB{}.{}.{} ({} bytes)",
            self.db_number, self.byte_offset, self.bit_number, self.size
        )
    }
}
