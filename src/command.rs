//! S7 request frames and their serialization.
//!
//! This module contains every frame the client sends to a PLC. Each command
//! handles its own serialization to bytes for transmission.
//!
//! # Command Types
//!
//! ## Session Setup
//! - [`ConnectionRequest`] - ISO-COTP connection request (fixed 22 bytes)
//! - [`SetupCommunication`] - S7 "Setup Communication" job (fixed 25 bytes)
//!
//! ## Data Block Access
//! - [`ReadVarCommand`] - Read one item from a data block (31 bytes)
//! - [`WriteVarCommand`] - Write one item to a data block (35 bytes + payload)
//!
//! Session setup frames are fixed templates: PDU size is not negotiated and the
//! PLC is assumed to accept every request this client issues.
//!
//! # Example
//!
//! ```
//! use s7_db::{DataType, ReadVarCommand, Tag};
//!
//! let cmd = ReadVarCommand::new(Tag::new(1, 8, DataType::Integer));
//! let bytes = cmd.to_bytes();
//! assert_eq!(bytes.len(), 31);
//! assert_eq!(bytes[17], 0x04); // Read Var
//! ```

use crate::error::{Result, S7Error};
use crate::header::{write_preamble, S7Header, TpktHeader, COTP_DATA, PREAMBLE_SIZE};
use crate::memory::AREA_DATA_BLOCK;
use crate::utils::{set_bit, trim_plc_string};
use crate::value::{DataType, Tag, Value};

/// Read Var function code.
pub(crate) const FUNC_READ_VAR: u8 = 0x04;
/// Write Var function code.
pub(crate) const FUNC_WRITE_VAR: u8 = 0x05;
/// Setup Communication function code.
pub(crate) const FUNC_SETUP_COMMUNICATION: u8 = 0xF0;

/// Variable specification marker of an item descriptor.
const VAR_SPEC: u8 = 0x12;
/// Length of the address specification that follows.
const VAR_SPEC_LEN: u8 = 0x0A;
/// `S7ANY` syntax ID.
const SYNTAX_S7ANY: u8 = 0x10;

/// Parameter section length of a single-item Read-Var / Write-Var request.
const ITEM_PARAM_LEN: u16 = 14;

/// Size of the ISO-COTP connection request frame.
pub const CONNECTION_REQUEST_SIZE: usize = 22;
/// Size of the Setup Communication frame.
pub const SETUP_COMMUNICATION_SIZE: usize = 25;
/// Size of a single-item Read-Var request.
pub const READ_REQUEST_SIZE: usize = 31;
/// Size of a single-item Write-Var request without its payload.
pub const WRITE_REQUEST_BASE_SIZE: usize = 35;
/// Largest payload area whose bit length still fits the 2-byte length field.
pub const MAX_WRITE_PAYLOAD: usize = (u16::MAX >> 3) as usize;

/// ISO-COTP connection request (CR TPDU).
///
/// Source TSAP 0x0100, destination TSAP 0x0101 (rack 0, slot 1), TPDU size 512.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConnectionRequest;

impl ConnectionRequest {
    /// Serializes the request to bytes for transmission.
    ///
    /// # Example
    ///
    /// ```
    /// use s7_db::ConnectionRequest;
    ///
    /// let bytes = ConnectionRequest.to_bytes();
    /// assert_eq!(&bytes[..4], &[0x03, 0x00, 0x00, 0x16]);
    /// ```
    pub fn to_bytes(self) -> [u8; CONNECTION_REQUEST_SIZE] {
        let tpkt = TpktHeader::new(CONNECTION_REQUEST_SIZE as u16).to_bytes();
        [
            tpkt[0], tpkt[1], tpkt[2], tpkt[3],
            0x11, // COTP header length
            0xE0, // CR Connect Request
            0x00, 0x00, // destination reference
            0x00, 0x01, // source reference
            0x00, // class 0
            0xC1, 0x02, 0x01, 0x00, // source TSAP
            0xC2, 0x02, 0x01, 0x01, // destination TSAP
            0xC0, 0x01, 0x09, // TPDU size
        ]
    }
}

/// S7 Setup Communication job with max AmQ calling/called fixed at 1.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetupCommunication;

impl SetupCommunication {
    /// Serializes the request to bytes for transmission.
    pub fn to_bytes(self) -> [u8; SETUP_COMMUNICATION_SIZE] {
        let mut bytes = [0u8; SETUP_COMMUNICATION_SIZE];
        bytes[..4].copy_from_slice(&TpktHeader::new(SETUP_COMMUNICATION_SIZE as u16).to_bytes());
        bytes[4..7].copy_from_slice(&COTP_DATA);
        bytes[7..PREAMBLE_SIZE].copy_from_slice(&S7Header::job(8, 0).to_bytes());
        bytes[PREAMBLE_SIZE..].copy_from_slice(&[
            FUNC_SETUP_COMMUNICATION,
            0x00, // reserved
            0x00, 0x01, // max AmQ calling
            0x00, 0x01, // max AmQ called
            0x03, 0xC0, // PDU length
        ]);
        bytes
    }
}

/// Builds the 14-byte parameter section shared by Read-Var and Write-Var.
///
/// `count` is the item length in transport units (bits or bytes).
fn item_parameter(function: u8, tag: &Tag, count: u16) -> [u8; ITEM_PARAM_LEN as usize] {
    let transport = tag.data_type.transport_size();
    let address = &tag.address;
    let [size_hi, size_lo] = count.to_be_bytes();
    let [db_hi, db_lo] = address.db_number.to_be_bytes();
    let [a2, a1, a0] = address.address_bytes(transport);
    [
        function,
        0x01, // item count
        VAR_SPEC,
        VAR_SPEC_LEN,
        SYNTAX_S7ANY,
        transport.code(),
        size_hi,
        size_lo,
        db_hi,
        db_lo,
        AREA_DATA_BLOCK,
        a2,
        a1,
        a0,
    ]
}

/// Command for reading one item from a data block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadVarCommand {
    tag: Tag,
}

impl ReadVarCommand {
    /// Creates a new read command for `tag`.
    pub fn new(tag: Tag) -> Self {
        Self { tag }
    }

    /// Returns the tag being read.
    pub fn tag(&self) -> &Tag {
        &self.tag
    }

    /// Number of bytes (or bits) requested from the PLC.
    ///
    /// A String covers its capacity plus the capacity and length header
    /// bytes, so the reply holds the whole stored string. Every other type
    /// requests exactly `address.size`.
    pub fn item_len(&self) -> u16 {
        let size = self.tag.address.size;
        match self.tag.data_type {
            DataType::String(_) => size.saturating_add(2),
            _ => size,
        }
    }

    /// Serializes the command to bytes for transmission.
    ///
    /// # Example
    ///
    /// ```
    /// use s7_db::{ReadVarCommand, Tag};
    ///
    /// let bytes = ReadVarCommand::new(Tag::bit(1, 8, 3)).to_bytes();
    /// assert_eq!(bytes[22], 0x01); // bit transport
    /// assert_eq!(&bytes[28..], &[0x00, 0x00, 67]);
    /// ```
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(READ_REQUEST_SIZE);
        write_preamble(
            &mut bytes,
            READ_REQUEST_SIZE as u16,
            S7Header::job(ITEM_PARAM_LEN, 0),
        );
        bytes.extend_from_slice(&item_parameter(FUNC_READ_VAR, &self.tag, self.item_len()));
        bytes
    }
}

/// Command for writing one item to a data block.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteVarCommand {
    tag: Tag,
    value: Value,
}

impl WriteVarCommand {
    /// Creates a new write command.
    ///
    /// # Arguments
    ///
    /// * `tag` - Target location; `tag.address.size` sets the payload area
    /// * `value` - Value to encode, which must match `tag.data_type`
    ///
    /// # Errors
    ///
    /// Returns:
    /// - `S7Error::TypeMismatch` if `value` is not a `tag.data_type` value
    /// - `S7Error::InvalidParameter` if the payload area exceeds
    ///   [`MAX_WRITE_PAYLOAD`] bytes, which the length fields cannot express
    ///
    /// # Example
    ///
    /// ```
    /// use s7_db::{DataType, Tag, Value, WriteVarCommand};
    ///
    /// let tag = Tag::new(1, 0, DataType::Integer);
    /// assert!(WriteVarCommand::new(tag, Value::Integer(-1)).is_ok());
    /// assert!(WriteVarCommand::new(tag, Value::Float(1.0)).is_err());
    /// ```
    pub fn new(tag: Tag, value: Value) -> Result<Self> {
        if !value.matches(&tag.data_type) {
            return Err(S7Error::type_mismatch(tag.data_type.name(), value.type_name()));
        }
        let command = Self { tag, value };
        if command.payload_len() > MAX_WRITE_PAYLOAD {
            return Err(S7Error::invalid_parameter(
                "size",
                format!("write payload is limited to {} bytes", MAX_WRITE_PAYLOAD),
            ));
        }
        Ok(command)
    }

    /// Returns the tag being written.
    pub fn tag(&self) -> &Tag {
        &self.tag
    }

    /// Number of payload bytes carried by the data section.
    ///
    /// Strings carry two extra header bytes (capacity and length).
    pub fn payload_len(&self) -> usize {
        let size = usize::from(self.tag.address.size);
        match self.tag.data_type {
            DataType::String(_) => size + 2,
            _ => size,
        }
    }

    /// Value of the 2-byte length field that precedes the payload.
    ///
    /// Bit writes declare the bit count; every other type declares
    /// its payload length in bits.
    fn length_field(&self) -> u16 {
        match self.tag.data_type {
            DataType::Bit => self.tag.address.size,
            _ => (self.payload_len() as u16) << 3,
        }
    }

    /// Encodes the value into a payload area of exactly `payload_len` bytes.
    ///
    /// Shorter values are zero-filled and longer values truncated; the
    /// declared size is never checked against the value.
    ///
    /// A String is trimmed, then cut on a character boundary to at most
    /// `size` bytes (and at most 255, the range of the length byte). The
    /// length byte counts the UTF-8 bytes actually written.
    fn payload(&self) -> Vec<u8> {
        let mut payload = vec![0u8; self.payload_len()];
        match &self.value {
            Value::Bit(v) => copy_truncated(&mut payload, &[set_bit(0, 0, *v)]),
            Value::Byte(v) => copy_truncated(&mut payload, &v.to_be_bytes()),
            Value::Integer(v) => copy_truncated(&mut payload, &v.to_be_bytes()),
            Value::Float(v) => copy_truncated(&mut payload, &v.to_be_bytes()),
            Value::String(s) => {
                let size = self.tag.address.size;
                let limit = usize::from(size).min(usize::from(u8::MAX));
                let text = truncate_on_char_boundary(trim_plc_string(s), limit);
                payload[0] = u8::try_from(size).unwrap_or(u8::MAX);
                payload[1] = text.len() as u8;
                copy_truncated(&mut payload[2..], text.as_bytes());
            }
            Value::Block(bytes) => copy_truncated(&mut payload, bytes),
        }
        payload
    }

    /// Serializes the command to bytes for transmission.
    ///
    /// # Example
    ///
    /// ```
    /// use s7_db::{DataType, Tag, Value, WriteVarCommand};
    ///
    /// let tag = Tag::new(1, 0, DataType::Integer);
    /// let bytes = WriteVarCommand::new(tag, Value::Integer(-1)).unwrap().to_bytes();
    /// assert_eq!(bytes.len(), 37);
    /// assert_eq!(&bytes[35..], &[0xFF, 0xFF]);
    /// ```
    pub fn to_bytes(&self) -> Vec<u8> {
        let payload = self.payload();
        let frame_len = WRITE_REQUEST_BASE_SIZE + payload.len();
        let data_len = 4 + payload.len();
        let transport = self.tag.data_type.transport_size();

        // payload_len <= MAX_WRITE_PAYLOAD keeps every length below u16::MAX
        let mut bytes = Vec::with_capacity(frame_len);
        write_preamble(
            &mut bytes,
            frame_len as u16,
            S7Header::job(ITEM_PARAM_LEN, data_len as u16),
        );
        bytes.extend_from_slice(&item_parameter(
            FUNC_WRITE_VAR,
            &self.tag,
            self.tag.address.size,
        ));
        bytes.push(0x00); // return code, reserved in requests
        bytes.push(transport.data_code());
        bytes.extend_from_slice(&self.length_field().to_be_bytes());
        bytes.extend_from_slice(&payload);
        bytes
    }
}

fn copy_truncated(dst: &mut [u8], src: &[u8]) {
    let n = dst.len().min(src.len());
    dst[..n].copy_from_slice(&src[..n]);
}

fn truncate_on_char_boundary(text: &str, max_len: usize) -> &str {
    if text.len() <= max_len {
        return text;
    }
    let mut end = max_len;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
