//! TCP transport layer for S7 communication.
//!
//! This module provides the [`TcpTransport`] struct which owns the TCP socket
//! to a PLC and moves raw frames over it. Apart from the two fixed session
//! setup frames it knows nothing about S7 requests.
//!
//! # Design
//!
//! - **Synchronous** - Blocking send/receive with configurable timeout
//! - **One frame in flight** - Each send is followed by exactly one receive
//! - **Single read per reply** - A receive returns whatever the first read
//!   delivers; replies split across TCP segments are not reassembled
//!
//! # Constants
//!
//! - [`DEFAULT_S7_PORT`] - ISO-on-TCP port (102)
//! - [`DEFAULT_TIMEOUT`] - Default connect/read/write timeout (2 seconds)
//! - [`DEFAULT_READ_DELAY`] - Pause between sending a read and receiving (50 ms)
//! - [`MAX_PDU_SIZE`] - Receive buffer size (1024 bytes)
//!
//! # Example
//!
//! The transport is typically used through the [`Client`](crate::Client) struct,
//! but can be used directly for custom implementations:
//!
//! ```no_run
//! use s7_db::{ReadVarCommand, Tag, DataType, TcpTransport, MAX_PDU_SIZE};
//! use std::time::Duration;
//!
//! let mut transport = TcpTransport::open(
//!     "192.168.0.1:102".parse().unwrap(),
//!     Duration::from_secs(2),
//! )?;
//! transport.handshake()?;
//!
//! let request = ReadVarCommand::new(Tag::new(1, 0, DataType::Integer)).to_bytes();
//! transport.send_frame(&request)?;
//! let reply = transport.receive_frame(MAX_PDU_SIZE)?;
//! transport.close();
//! # Ok::<(), s7_db::S7Error>(())
//! ```

use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::time::Duration;

use tracing::{debug, trace, warn};

use crate::command::{ConnectionRequest, SetupCommunication};
use crate::error::{Result, S7Error};
use crate::header::TpktHeader;
use crate::utils::bytes_to_hex;

/// Default ISO-on-TCP port.
pub const DEFAULT_S7_PORT: u16 = 102;

/// Default timeout for connect, read and write operations.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

/// Default pause between sending a read request and receiving its reply.
///
/// Target hardware needs this turnaround slack; override it through
/// [`ClientConfig::with_read_delay`](crate::ClientConfig::with_read_delay).
pub const DEFAULT_READ_DELAY: Duration = Duration::from_millis(50);

/// Receive buffer size for a single reply.
pub const MAX_PDU_SIZE: usize = 1024;

/// TCP transport for S7 communication.
///
/// Handles synchronous TCP communication with configurable timeout.
/// The socket is released by [`close`](Self::close) or when the transport is dropped.
pub struct TcpTransport {
    stream: Option<TcpStream>,
    remote_addr: SocketAddr,
}

impl TcpTransport {
    /// Opens a TCP connection to the PLC.
    ///
    /// # Arguments
    ///
    /// * `plc_addr` - PLC socket address (port 102 for ISO-on-TCP)
    /// * `timeout` - Connect, read and write timeout
    ///
    /// Only the TCP connection is established; call [`handshake`](Self::handshake)
    /// before exchanging S7 requests.
    ///
    /// # Errors
    ///
    /// Returns `S7Error::Connect` if the host is unreachable or the port is
    /// refused, and `S7Error::InvalidParameter` for a zero timeout.
    pub fn open(plc_addr: SocketAddr, timeout: Duration) -> Result<Self> {
        if timeout.is_zero() {
            return Err(S7Error::invalid_parameter("timeout", "must be greater than 0"));
        }

        let stream = TcpStream::connect_timeout(&plc_addr, timeout)
            .map_err(|e| S7Error::connect(plc_addr, e))?;
        stream.set_read_timeout(Some(timeout))?;
        stream.set_write_timeout(Some(timeout))?;
        stream.set_nodelay(true)?;
        debug!(addr = %plc_addr, "TCP connection opened");

        Ok(Self {
            stream: Some(stream),
            remote_addr: plc_addr,
        })
    }

    /// Performs the ISO-COTP connection request and the S7 setup communication.
    ///
    /// Each step sends its fixed frame and waits for one reply. The replies
    /// are not inspected; the PLC is trusted to have accepted the session.
    ///
    /// # Errors
    ///
    /// Returns an error if either frame cannot be sent or no reply arrives.
    pub fn handshake(&mut self) -> Result<()> {
        self.send_frame(&ConnectionRequest.to_bytes())?;
        let reply = self.receive_frame(MAX_PDU_SIZE)?;
        debug!(len = reply.len(), "COTP connection confirmed");

        self.send_frame(&SetupCommunication.to_bytes())?;
        let reply = self.receive_frame(MAX_PDU_SIZE)?;
        debug!(len = reply.len(), "S7 communication set up");
        Ok(())
    }

    /// Writes a complete frame and flushes the socket.
    ///
    /// # Errors
    ///
    /// Returns `S7Error::Timeout` if the write times out, or an I/O error.
    pub fn send_frame(&mut self, frame: &[u8]) -> Result<()> {
        let stream = self.stream_mut()?;
        trace!(frame = %bytes_to_hex(frame), "send");
        stream.write_all(frame).map_err(map_io_error)?;
        stream.flush().map_err(map_io_error)?;
        Ok(())
    }

    /// Blocks until data arrives and returns what one read delivered, up to `max_len` bytes.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - `S7Error::Timeout` if nothing arrives within the read timeout
    /// - `S7Error::Protocol` if the peer closed the connection
    /// - Other I/O errors
    pub fn receive_frame(&mut self, max_len: usize) -> Result<Vec<u8>> {
        let stream = self.stream_mut()?;
        let mut buffer = vec![0u8; max_len];
        let size = stream.read(&mut buffer).map_err(map_io_error)?;
        if size == 0 {
            return Err(S7Error::protocol("connection closed by peer"));
        }
        buffer.truncate(size);
        trace!(frame = %bytes_to_hex(&buffer), "receive");

        if let Ok(tpkt) = TpktHeader::from_bytes(&buffer) {
            if usize::from(tpkt.length) > buffer.len() {
                debug!(
                    declared = tpkt.length,
                    received = buffer.len(),
                    "reply shorter than its TPKT length"
                );
            }
        }
        Ok(buffer)
    }

    /// Sends a frame, waits `delay`, then receives one reply.
    ///
    /// # Arguments
    ///
    /// * `frame` - Complete request frame
    /// * `delay` - Pause before reading; zero skips it
    /// * `max_len` - Receive buffer size
    pub fn send_receive(
        &mut self,
        frame: &[u8],
        delay: Duration,
        max_len: usize,
    ) -> Result<Vec<u8>> {
        self.send_frame(frame)?;
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
        self.receive_frame(max_len)
    }

    /// Releases the socket. Calling it again is a no-op and it never fails.
    pub fn close(&mut self) {
        if let Some(stream) = self.stream.take() {
            match stream.shutdown(Shutdown::Both) {
                Ok(()) => debug!(addr = %self.remote_addr, "connection closed"),
                Err(e) if e.kind() == io::ErrorKind::NotConnected => {}
                Err(e) => warn!(addr = %self.remote_addr, error = %e, "error closing connection"),
            }
        }
    }

    /// Returns whether the socket is still held.
    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    /// Returns the remote PLC address.
    pub fn remote_addr(&self) -> SocketAddr {
        self.remote_addr
    }

    fn stream_mut(&mut self) -> Result<&mut TcpStream> {
        self.stream
            .as_mut()
            .ok_or_else(|| S7Error::Io(io::Error::from(io::ErrorKind::NotConnected)))
    }
}

fn map_io_error(e: io::Error) -> S7Error {
    match e.kind() {
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => S7Error::Timeout,
        _ => S7Error::Io(e),
    }
}

impl Drop for TcpTransport {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for TcpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TcpTransport")
            .field("remote_addr", &self.remote_addr)
            .field(
                "local_addr",
                &self.stream.as_ref().and_then(|s| s.local_addr().ok()),
            )
            .finish()
    }
}
