//! # S7 Data Block Client
//!
//! A Rust library for reading and writing typed values in the data blocks of
//! Siemens S7-300/400 PLCs, using S7comm over ISO-COTP / TPKT on TCP port 102.
//!
//! This is a **protocol-only** library: no dashboards, polling or simulators.
//! Each call produces exactly 1 request and 1 response.
//! No automatic retries, caching, or reconnection.
//!
//! ## Features
//!
//! - **Fixed session setup**: one COTP connection request template and one
//!   setup communication template, no PDU size negotiation
//! - **Typed access**: bit, byte, 16-bit integer, float, string and raw block
//! - **Closed type set**: [`DataType`] and [`Value`] are enums; encoding and
//!   decoding are exhaustive matches
//! - **No panics**: all errors returned as `Result<T, S7Error>`
//!
//! ## Quick Start
//!
//! ```no_run
//! use s7_db::{Client, ClientConfig};
//! use std::net::Ipv4Addr;
//!
//! fn main() -> s7_db::Result<()> {
//!     let mut client = Client::new(ClientConfig::new(Ipv4Addr::new(192, 168, 0, 1)));
//!     client.connect()?;
//!
//!     // DB10.DBW0
//!     let level = client.read_int(10, 0)?;
//!     println!("level = {}", level);
//!
//!     // DB10.DBX2.3
//!     let pump_on = client.read_bit(10, 2, 3)?;
//!     println!("pump = {}", pump_on);
//!
//!     // DB10.DBD4
//!     let ok = client.write_float(10, 4, 21.5)?;
//!     println!("write acknowledged: {}", ok);
//!
//!     client.disconnect();
//!     Ok(())
//! }
//! ```
//!
//! ## Data Types
//!
//! | Type | Read | Write | Size |
//! |------|------|-------|------|
//! | Bit | [`Client::read_bit`] | [`Client::write_bit`] | 1 bit |
//! | Byte | [`Client::read_byte`] | [`Client::write_byte`] | 1 byte |
//! | Integer | [`Client::read_int`] | [`Client::write_int`] | 2 bytes |
//! | Float | [`Client::read_float`] | [`Client::write_float`] | 4 bytes |
//! | String | [`Client::read_string`] | [`Client::write_string`] | caller supplied |
//! | Block | [`Client::read_block`] | [`Client::write_block`] | caller supplied |
//!
//! The declared size is sent as-is. It is never derived from or checked
//! against the value: a string longer than its declared size is cut off.
//! Strings are stored as S7 strings (capacity byte, length byte, text), so
//! a string tag of size `n` occupies `n + 2` bytes in the data block.
//!
//! ## Generic Tags
//!
//! ```no_run
//! use s7_db::{Client, ClientConfig, DataType, Tag, Value};
//! use std::net::Ipv4Addr;
//!
//! let mut client = Client::new(ClientConfig::new(Ipv4Addr::new(192, 168, 0, 1)));
//! client.connect()?;
//!
//! let data_type: DataType = "integer".parse()?;
//! let tag = Tag::new(10, 8, data_type);
//! client.write(&tag, &Value::Integer(-5))?;
//! assert_eq!(client.read(&tag)?, Value::Integer(-5));
//! # Ok::<(), s7_db::S7Error>(())
//! ```
//!
//! ## Error Handling
//!
//! ```no_run
//! use s7_db::{Client, ClientConfig, S7Error};
//! use std::net::Ipv4Addr;
//!
//! let mut client = Client::new(ClientConfig::new(Ipv4Addr::new(192, 168, 0, 1)));
//!
//! match client.read_int(10, 0) {
//!     Ok(value) => println!("value: {}", value),
//!     Err(S7Error::NotConnected { state }) => println!("not connected ({})", state),
//!     Err(S7Error::Timeout) => println!("communication timeout"),
//!     Err(e) => println!("error: {}", e),
//! }
//! ```
//!
//! ## Configuration
//!
//! ```no_run
//! use s7_db::ClientConfig;
//! use std::net::Ipv4Addr;
//! use std::time::Duration;
//!
//! let config = ClientConfig::new(Ipv4Addr::new(192, 168, 0, 1))
//!     .with_port(1102)                             // default: 102
//!     .with_timeout(Duration::from_secs(5))        // default: 2s
//!     .with_read_delay(Duration::from_millis(20)); // default: 50ms
//! ```
//!
//! ## Logging
//!
//! The crate logs through [`tracing`]: session lifecycle and per-operation
//! summaries at `debug`, raw frames as hex at `trace`. No subscriber is
//! installed by the library.

#![warn(clippy::all)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

mod client;
mod command;
mod error;
mod header;
mod memory;
mod response;
mod transport;
pub mod utils;
mod value;

// Public re-exports
pub use client::{Client, ClientConfig, ConnectionState};
pub use command::{
    ConnectionRequest, ReadVarCommand, SetupCommunication, WriteVarCommand,
    CONNECTION_REQUEST_SIZE, MAX_WRITE_PAYLOAD, READ_REQUEST_SIZE, SETUP_COMMUNICATION_SIZE,
    WRITE_REQUEST_BASE_SIZE,
};
pub use error::{Result, S7Error};
pub use header::{S7Header, TpktHeader, PREAMBLE_SIZE};
pub use memory::{Address, TransportSize, AREA_DATA_BLOCK};
pub use response::{
    decode_reply, decode_write_ack, READ_DATA_OFFSET, RETURN_CODE_SUCCESS, STRING_HEADER_SIZE,
    WRITE_ACK_OFFSET,
};
pub use transport::{
    TcpTransport, DEFAULT_READ_DELAY, DEFAULT_S7_PORT, DEFAULT_TIMEOUT, MAX_PDU_SIZE,
};
pub use value::{DataType, Tag, Value};
