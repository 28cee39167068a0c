//! High-level S7 client for reading and writing data block values.
//!
//! This module provides the [`Client`] struct, which is the primary interface
//! for communicating with Siemens S7-300/400 PLCs.
//!
//! # Overview
//!
//! The client handles:
//! - Session setup (TCP connect, COTP connection request, S7 setup communication)
//! - Connection state tracking
//! - Request construction and reply decoding for each data type
//!
//! # Example
//!
//! ```no_run
//! use s7_db::{Client, ClientConfig};
//! use std::net::Ipv4Addr;
//!
//! let mut client = Client::new(ClientConfig::new(Ipv4Addr::new(192, 168, 0, 1)));
//! client.connect()?;
//!
//! let speed = client.read_int(10, 0)?;
//! let running = client.read_bit(10, 2, 0)?;
//! client.write_float(10, 4, 42.5)?;
//!
//! client.disconnect();
//! # Ok::<(), s7_db::S7Error>(())
//! ```
//!
//! # Thread Safety
//!
//! A `Client` is one session with one PLC and allows a single outstanding
//! request. Every operation takes `&mut self`; share a client between threads
//! only behind a mutex, or give each caller its own client.

use std::fmt;
use std::net::{IpAddr, SocketAddr, ToSocketAddrs};
use std::time::Duration;

use tracing::debug;

use crate::command::{ReadVarCommand, WriteVarCommand};
use crate::error::{Result, S7Error};
use crate::response::{decode_reply, decode_write_ack};
use crate::transport::{
    TcpTransport, DEFAULT_READ_DELAY, DEFAULT_S7_PORT, DEFAULT_TIMEOUT, MAX_PDU_SIZE,
};
use crate::utils::hex_to_bytes;
use crate::value::{DataType, Tag, Value};

/// Configuration for creating an S7 client.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClientConfig {
    /// PLC socket address.
    pub plc_addr: SocketAddr,
    /// Connect, read and write timeout.
    pub timeout: Duration,
    /// Pause between sending a read request and receiving its reply.
    pub read_delay: Duration,
    /// Receive buffer size for one reply.
    pub max_pdu_len: usize,
}

impl ClientConfig {
    /// Creates a configuration for the PLC at `plc_ip` on port 102.
    ///
    /// # Example
    ///
    /// ```
    /// use s7_db::ClientConfig;
    /// use std::net::Ipv4Addr;
    ///
    /// let config = ClientConfig::new(Ipv4Addr::new(192, 168, 0, 1));
    /// assert_eq!(config.plc_addr.port(), 102);
    /// ```
    pub fn new(plc_ip: impl Into<IpAddr>) -> Self {
        Self {
            plc_addr: SocketAddr::new(plc_ip.into(), DEFAULT_S7_PORT),
            timeout: DEFAULT_TIMEOUT,
            read_delay: DEFAULT_READ_DELAY,
            max_pdu_len: MAX_PDU_SIZE,
        }
    }

    /// Creates a configuration from a host name or IP string and a port.
    ///
    /// # Arguments
    ///
    /// * `host` - Host name or IP address of the PLC
    /// * `port` - TCP port (usually [`DEFAULT_S7_PORT`](crate::DEFAULT_S7_PORT))
    ///
    /// # Errors
    ///
    /// Returns `S7Error::InvalidParameter` if the host cannot be resolved.
    ///
    /// # Example
    ///
    /// ```
    /// use s7_db::ClientConfig;
    ///
    /// let config = ClientConfig::from_host("127.0.0.1", 1102).unwrap();
    /// assert_eq!(config.plc_addr.port(), 1102);
    /// ```
    pub fn from_host(host: &str, port: u16) -> Result<Self> {
        let plc_addr = (host, port)
            .to_socket_addrs()
            .map_err(|e| S7Error::invalid_parameter("host", e.to_string()))?
            .next()
            .ok_or_else(|| {
                S7Error::invalid_parameter("host", format!("{} did not resolve", host))
            })?;

        Ok(Self::new(plc_addr.ip()).with_port(plc_addr.port()))
    }

    /// Sets a custom PLC port (default is 102).
    pub fn with_port(mut self, port: u16) -> Self {
        self.plc_addr.set_port(port);
        self
    }

    /// Sets a custom timeout (default is 2 seconds).
    ///
    /// # Example
    ///
    /// ```
    /// use s7_db::ClientConfig;
    /// use std::net::Ipv4Addr;
    /// use std::time::Duration;
    ///
    /// let config = ClientConfig::new(Ipv4Addr::new(192, 168, 0, 1))
    ///     .with_timeout(Duration::from_secs(5));
    /// ```
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the pause between a read request and its reply (default is 50 ms).
    pub fn with_read_delay(mut self, read_delay: Duration) -> Self {
        self.read_delay = read_delay;
        self
    }
}

/// Session state of a [`Client`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    /// No socket is open.
    Disconnected,
    /// TCP is connected but the S7 session is not set up yet.
    TcpOpen,
    /// Handshake completed; reads and writes are allowed.
    SessionReady,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Disconnected => write!(f, "Disconnected"),
            ConnectionState::TcpOpen => write!(f, "TcpOpen"),
            ConnectionState::SessionReady => write!(f, "SessionReady"),
        }
    }
}

/// S7 client for one PLC.
///
/// Each operation sends exactly one request and waits for exactly one reply.
/// No automatic retries or reconnection: after any error the caller decides
/// whether to [`connect`](Self::connect) again.
///
/// # Example
///
/// ```no_run
/// use s7_db::{Client, ClientConfig, DataType, Tag, Value};
/// use std::net::Ipv4Addr;
///
/// let mut client = Client::new(ClientConfig::new(Ipv4Addr::new(192, 168, 0, 1)));
/// client.connect().unwrap();
///
/// let tag = Tag::new(10, 20, DataType::String(16));
/// client.write(&tag, &Value::String("BATCH-7".into())).unwrap();
/// let value = client.read(&tag).unwrap();
/// ```
pub struct Client {
    config: ClientConfig,
    transport: Option<TcpTransport>,
    state: ConnectionState,
}

impl Client {
    /// Creates a disconnected client. No socket is opened until [`connect`](Self::connect).
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            transport: None,
            state: ConnectionState::Disconnected,
        }
    }

    /// Opens the TCP connection and performs the session handshake.
    ///
    /// An existing session is closed first. If the handshake fails, the
    /// socket is released and the client stays `Disconnected`.
    ///
    /// # Errors
    ///
    /// Returns `S7Error::Connect` if TCP fails, or the transport error raised
    /// during the handshake.
    pub fn connect(&mut self) -> Result<()> {
        if self.transport.is_some() {
            self.disconnect();
        }

        let transport = TcpTransport::open(self.config.plc_addr, self.config.timeout)?;
        self.state = ConnectionState::TcpOpen;
        let transport = self.transport.insert(transport);

        if let Err(e) = transport.handshake() {
            debug!(addr = %self.config.plc_addr, error = %e, "handshake failed");
            self.disconnect();
            return Err(e);
        }

        self.state = ConnectionState::SessionReady;
        debug!(addr = %self.config.plc_addr, "session ready");
        Ok(())
    }

    /// Releases the socket and returns to `Disconnected`. Never fails.
    pub fn disconnect(&mut self) {
        if let Some(mut transport) = self.transport.take() {
            transport.close();
        }
        self.state = ConnectionState::Disconnected;
    }

    /// Returns the current connection state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Returns whether reads and writes are currently allowed.
    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::SessionReady
    }

    /// Returns the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn session(&mut self) -> Result<&mut TcpTransport> {
        if self.state != ConnectionState::SessionReady {
            return Err(S7Error::not_connected(self.state));
        }
        self.transport
            .as_mut()
            .ok_or_else(|| S7Error::not_connected(ConnectionState::Disconnected))
    }

    /// Reads the value described by `tag`.
    ///
    /// # Arguments
    ///
    /// * `tag` - Data block location, size and type to read
    ///
    /// # Errors
    ///
    /// Returns:
    /// - `S7Error::NotConnected` outside an established session
    /// - `S7Error::Protocol` if the reply is too short
    /// - Transport errors (timeout, I/O)
    pub fn read(&mut self, tag: &Tag) -> Result<Value> {
        let request = ReadVarCommand::new(*tag).to_bytes();
        let delay = self.config.read_delay;
        let max_len = self.config.max_pdu_len;

        let reply = self.session()?.send_receive(&request, delay, max_len)?;
        let value = decode_reply(&reply, tag.data_type, tag.address.size)?;
        debug!(%tag, %value, "read");
        Ok(value)
    }

    /// Writes `value` to the location described by `tag`.
    ///
    /// Returns `true` if the PLC acknowledged the write with return code 0xFF.
    ///
    /// # Arguments
    ///
    /// * `tag` - Data block location, size and type to write
    /// * `value` - Value to store; must match `tag.data_type`
    ///
    /// # Errors
    ///
    /// Returns:
    /// - `S7Error::NotConnected` outside an established session
    /// - `S7Error::TypeMismatch` if `value` does not match `tag.data_type`
    /// - `S7Error::Protocol` if the acknowledgement is missing
    /// - Transport errors (timeout, I/O)
    pub fn write(&mut self, tag: &Tag, value: &Value) -> Result<bool> {
        let max_len = self.config.max_pdu_len;
        let transport = self.session()?;
        let request = WriteVarCommand::new(*tag, value.clone())?.to_bytes();

        let reply = transport.send_receive(&request, Duration::ZERO, max_len)?;
        let success = decode_write_ack(&reply)?;
        debug!(%tag, %value, success, "write");
        Ok(success)
    }

    /// Reads a single bit.
    ///
    /// # Arguments
    ///
    /// * `db_number` - Data block number
    /// * `offset` - Byte offset inside the data block
    /// * `bit_number` - Bit position (0-7)
    ///
    /// # Errors
    ///
    /// Returns `S7Error::InvalidParameter` if `bit_number` > 7, otherwise as [`read`](Self::read).
    pub fn read_bit(&mut self, db_number: u16, offset: u32, bit_number: u8) -> Result<bool> {
        check_bit_number(bit_number)?;
        match self.read(&Tag::bit(db_number, offset, bit_number))? {
            Value::Bit(v) => Ok(v),
            other => Err(unexpected(DataType::Bit, &other)),
        }
    }

    /// Reads a signed byte.
    pub fn read_byte(&mut self, db_number: u16, offset: u32) -> Result<i8> {
        match self.read(&Tag::new(db_number, offset, DataType::Byte))? {
            Value::Byte(v) => Ok(v),
            other => Err(unexpected(DataType::Byte, &other)),
        }
    }

    /// Reads a 16-bit signed integer (S7 `INT`).
    ///
    /// # Example
    ///
    /// ```no_run
    /// use s7_db::{Client, ClientConfig};
    /// use std::net::Ipv4Addr;
    ///
    /// let mut client = Client::new(ClientConfig::new(Ipv4Addr::new(192, 168, 0, 1)));
    /// client.connect().unwrap();
    /// let counter = client.read_int(10, 0).unwrap();
    /// ```
    pub fn read_int(&mut self, db_number: u16, offset: u32) -> Result<i16> {
        match self.read(&Tag::new(db_number, offset, DataType::Integer))? {
            Value::Integer(v) => Ok(v),
            other => Err(unexpected(DataType::Integer, &other)),
        }
    }

    /// Reads a 32-bit float (S7 `REAL`).
    pub fn read_float(&mut self, db_number: u16, offset: u32) -> Result<f32> {
        match self.read(&Tag::new(db_number, offset, DataType::Float))? {
            Value::Float(v) => Ok(v),
            other => Err(unexpected(DataType::Float, &other)),
        }
    }

    /// Reads an S7 string of capacity `size` and returns its trimmed text.
    ///
    /// # Arguments
    ///
    /// * `db_number` - Data block number
    /// * `offset` - Byte offset of the string header
    /// * `size` - Declared capacity, excluding the 2 header bytes
    pub fn read_string(&mut self, db_number: u16, offset: u32, size: u16) -> Result<String> {
        match self.read(&Tag::new(db_number, offset, DataType::String(size)))? {
            Value::String(v) => Ok(v),
            other => Err(unexpected(DataType::String(size), &other)),
        }
    }

    /// Reads `size` raw bytes.
    pub fn read_block(&mut self, db_number: u16, offset: u32, size: u16) -> Result<Vec<u8>> {
        match self.read(&Tag::new(db_number, offset, DataType::Block(size)))? {
            Value::Block(v) => Ok(v),
            other => Err(unexpected(DataType::Block(size), &other)),
        }
    }

    /// Writes a single bit.
    ///
    /// # Arguments
    ///
    /// * `db_number` - Data block number
    /// * `offset` - Byte offset inside the data block
    /// * `bit_number` - Bit position (0-7)
    /// * `value` - Bit value to write
    ///
    /// # Errors
    ///
    /// Returns `S7Error::InvalidParameter` if `bit_number` > 7, otherwise as
    /// [`write`](Self::write).
    pub fn write_bit(
        &mut self,
        db_number: u16,
        offset: u32,
        bit_number: u8,
        value: bool,
    ) -> Result<bool> {
        check_bit_number(bit_number)?;
        self.write(&Tag::bit(db_number, offset, bit_number), &Value::Bit(value))
    }

    /// Writes a signed byte.
    pub fn write_byte(&mut self, db_number: u16, offset: u32, value: i8) -> Result<bool> {
        self.write(&Tag::new(db_number, offset, DataType::Byte), &Value::Byte(value))
    }

    /// Writes a 16-bit signed integer (S7 `INT`).
    pub fn write_int(&mut self, db_number: u16, offset: u32, value: i16) -> Result<bool> {
        self.write(
            &Tag::new(db_number, offset, DataType::Integer),
            &Value::Integer(value),
        )
    }

    /// Writes a 32-bit float (S7 `REAL`).
    pub fn write_float(&mut self, db_number: u16, offset: u32, value: f32) -> Result<bool> {
        self.write(&Tag::new(db_number, offset, DataType::Float), &Value::Float(value))
    }

    /// Writes a string with declared capacity `size`.
    ///
    /// The value is trimmed; anything beyond `size` bytes is cut off without error.
    ///
    /// # Arguments
    ///
    /// * `db_number` - Data block number
    /// * `offset` - Byte offset of the string header
    /// * `size` - Declared capacity, excluding the 2 header bytes
    /// * `value` - Text to store
    pub fn write_string(
        &mut self,
        db_number: u16,
        offset: u32,
        size: u16,
        value: &str,
    ) -> Result<bool> {
        self.write(
            &Tag::new(db_number, offset, DataType::String(size)),
            &Value::String(value.to_string()),
        )
    }

    /// Writes `size` raw bytes, zero-filling or truncating `value` to fit.
    pub fn write_block(
        &mut self,
        db_number: u16,
        offset: u32,
        size: u16,
        value: &[u8],
    ) -> Result<bool> {
        self.write(
            &Tag::new(db_number, offset, DataType::Block(size)),
            &Value::Block(value.to_vec()),
        )
    }

    /// Writes a block given as a hex string such as `"0A1F"`.
    ///
    /// # Arguments
    ///
    /// * `db_number` - Data block number
    /// * `offset` - Byte offset inside the data block
    /// * `size` - Number of bytes written
    /// * `hex` - Block contents as hex digits
    ///
    /// # Errors
    ///
    /// Returns `S7Error::InvalidEncoding` for malformed hex, otherwise as [`write`](Self::write).
    pub fn write_block_hex(
        &mut self,
        db_number: u16,
        offset: u32,
        size: u16,
        hex: &str,
    ) -> Result<bool> {
        self.session()?;
        let bytes = hex_to_bytes(hex)?;
        self.write_block(db_number, offset, size, &bytes)
    }
}

fn check_bit_number(bit_number: u8) -> Result<()> {
    if bit_number > 7 {
        return Err(S7Error::invalid_parameter("bit_number", "must be 0-7"));
    }
    Ok(())
}

fn unexpected(expected: DataType, found: &Value) -> S7Error {
    S7Error::type_mismatch(expected.name(), found.type_name())
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("plc_addr", &self.config.plc_addr)
            .field("state", &self.state)
            .field("transport", &self.transport)
            .finish()
    }
}
