//! TPKT, ISO-COTP and S7 header structures.
//!
//! Every frame exchanged with the PLC after the connection request starts with
//! the same 17-byte preamble:
//!
//! | Bytes | Layer | Field |
//! |-------|-------|-------|
//! | 0 | TPKT | Version (0x03) |
//! | 1 | TPKT | Reserved (0x00) |
//! | 2-3 | TPKT | Total frame length |
//! | 4 | COTP | Header length (0x02) |
//! | 5 | COTP | PDU type (0xF0 = DT Data) |
//! | 6 | COTP | TPDU number / EOT (0x80) |
//! | 7 | S7 | Protocol ID (0x32) |
//! | 8 | S7 | ROSCTR (0x01 = Job) |
//! | 9-10 | S7 | Redundancy identification |
//! | 11-12 | S7 | PDU reference |
//! | 13-14 | S7 | Parameter length |
//! | 15-16 | S7 | Data length |
//!
//! # Example
//!
//! ```
//! use s7_db::{S7Header, TpktHeader};
//!
//! let tpkt = TpktHeader::new(31);
//! assert_eq!(tpkt.to_bytes(), [0x03, 0x00, 0x00, 0x1F]);
//!
//! let s7 = S7Header::job(14, 0);
//! assert_eq!(s7.to_bytes()[0], 0x32);
//! ```

use crate::error::{Result, S7Error};

/// TPKT header size in bytes.
pub const TPKT_HEADER_SIZE: usize = 4;

/// COTP data header size in bytes.
pub const COTP_DATA_HEADER_SIZE: usize = 3;

/// S7 Job header size in bytes.
pub const S7_HEADER_SIZE: usize = 10;

/// Size of the TPKT + COTP + S7 preamble.
pub const PREAMBLE_SIZE: usize = TPKT_HEADER_SIZE + COTP_DATA_HEADER_SIZE + S7_HEADER_SIZE;

/// RFC 1006 version byte.
pub(crate) const TPKT_VERSION: u8 = 0x03;

/// COTP header for a DT Data PDU with the EOT flag set.
pub(crate) const COTP_DATA: [u8; COTP_DATA_HEADER_SIZE] = [0x02, 0xF0, 0x80];

/// S7comm protocol identifier.
pub(crate) const S7_PROTOCOL_ID: u8 = 0x32;

/// ROSCTR value for a Job request.
pub(crate) const ROSCTR_JOB: u8 = 0x01;

/// TPKT header (RFC 1006).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TpktHeader {
    /// Protocol version (always 0x03).
    pub version: u8,
    /// Total frame length, this header included.
    pub length: u16,
}

impl TpktHeader {
    /// Creates a TPKT header declaring `length` bytes in total.
    pub fn new(length: u16) -> Self {
        Self {
            version: TPKT_VERSION,
            length,
        }
    }

    /// Serializes the header to bytes.
    pub fn to_bytes(self) -> [u8; TPKT_HEADER_SIZE] {
        let [hi, lo] = self.length.to_be_bytes();
        [self.version, 0x00, hi, lo]
    }

    /// Parses a TPKT header from the start of a frame.
    ///
    /// # Errors
    ///
    /// Returns `S7Error::Protocol` if the slice is too short or the version
    /// byte is not 0x03.
    ///
    /// # Example
    ///
    /// ```
    /// use s7_db::TpktHeader;
    ///
    /// let header = TpktHeader::from_bytes(&[0x03, 0x00, 0x00, 0x16]).unwrap();
    /// assert_eq!(header.length, 22);
    /// ```
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < TPKT_HEADER_SIZE {
            return Err(S7Error::protocol(format!(
                "TPKT header too short: expected {} bytes, got {}",
                TPKT_HEADER_SIZE,
                data.len()
            )));
        }
        if data[0] != TPKT_VERSION {
            return Err(S7Error::protocol(format!(
                "unexpected TPKT version 0x{:02X}",
                data[0]
            )));
        }

        Ok(Self {
            version: data[0],
            length: u16::from_be_bytes([data[2], data[3]]),
        })
    }
}

/// S7 Job header (10 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct S7Header {
    /// Protocol ID (always 0x32).
    pub protocol_id: u8,
    /// Remote operating service control (0x01 = Job).
    pub rosctr: u8,
    /// PDU reference echoed back by the PLC.
    pub pdu_ref: u16,
    /// Length of the parameter section.
    pub param_len: u16,
    /// Length of the data section.
    pub data_len: u16,
}

impl S7Header {
    /// Creates a Job header with PDU reference 0.
    pub fn job(param_len: u16, data_len: u16) -> Self {
        Self {
            protocol_id: S7_PROTOCOL_ID,
            rosctr: ROSCTR_JOB,
            pdu_ref: 0,
            param_len,
            data_len,
        }
    }

    /// Serializes the header to bytes.
    pub fn to_bytes(self) -> [u8; S7_HEADER_SIZE] {
        let pdu_ref = self.pdu_ref.to_be_bytes();
        let param_len = self.param_len.to_be_bytes();
        let data_len = self.data_len.to_be_bytes();
        [
            self.protocol_id,
            self.rosctr,
            0x00, // redundancy identification
            0x00,
            pdu_ref[0],
            pdu_ref[1],
            param_len[0],
            param_len[1],
            data_len[0],
            data_len[1],
        ]
    }
}

/// Writes the 17-byte TPKT + COTP + S7 preamble into `buf`.
pub(crate) fn write_preamble(buf: &mut Vec<u8>, frame_len: u16, s7: S7Header) {
    buf.extend_from_slice(&TpktHeader::new(frame_len).to_bytes());
    buf.extend_from_slice(&COTP_DATA);
    buf.extend_from_slice(&s7.to_bytes());
}
