//! Error types for the S7 client.

use std::io;
use std::net::SocketAddr;
use thiserror::Error;

use crate::client::ConnectionState;

/// Result type alias for S7 operations.
pub type Result<T> = std::result::Result<T, S7Error>;

/// Errors that can occur during S7 communication.
#[derive(Debug, Error)]
pub enum S7Error {
    /// The TCP connection to the PLC could not be opened.
    #[error("Failed to connect to {addr}: {source}")]
    Connect {
        /// Address the client tried to reach.
        addr: SocketAddr,
        /// Underlying socket error.
        #[source]
        source: io::Error,
    },

    /// A read or write was attempted before the session was established.
    #[error("Not connected (state: {state})")]
    NotConnected {
        /// State the client was in when the operation was attempted.
        state: ConnectionState,
    },

    /// Unknown data type tag, or a value that does not match its data type.
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        /// Type that was expected.
        expected: String,
        /// Type or tag that was supplied.
        found: String,
    },

    /// Malformed hex input for a block write.
    #[error("Invalid encoding: {reason}")]
    InvalidEncoding {
        /// Description of the encoding error.
        reason: String,
    },

    /// Reply from the PLC did not have the expected shape.
    #[error("Protocol error: {reason}")]
    Protocol {
        /// Description of the protocol error.
        reason: String,
    },

    /// Invalid parameter provided.
    #[error("Invalid parameter '{parameter}': {reason}")]
    InvalidParameter {
        /// Name of the invalid parameter.
        parameter: String,
        /// Description of why the parameter is invalid.
        reason: String,
    },

    /// Communication timeout.
    #[error("Communication timeout")]
    Timeout,

    /// I/O error during communication.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl S7Error {
    /// Creates a new `Connect` error.
    pub fn connect(addr: SocketAddr, source: io::Error) -> Self {
        Self::Connect { addr, source }
    }

    /// Creates a new `NotConnected` error.
    ///
    /// # Example
    ///
    /// ```
    /// use s7_db::{ConnectionState, S7Error};
    ///
    /// let err = S7Error::not_connected(ConnectionState::Disconnected);
    /// assert_eq!(err.to_string(), "Not connected (state: Disconnected)");
    /// ```
    pub fn not_connected(state: ConnectionState) -> Self {
        Self::NotConnected { state }
    }

    /// Creates a new `TypeMismatch` error.
    pub fn type_mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Creates a new `InvalidEncoding` error.
    ///
    /// # Example
    ///
    /// ```
    /// use s7_db::S7Error;
    ///
    /// let err = S7Error::invalid_encoding("odd number of hex digits");
    /// ```
    pub fn invalid_encoding(reason: impl Into<String>) -> Self {
        Self::InvalidEncoding {
            reason: reason.into(),
        }
    }

    /// Creates a new `Protocol` error.
    ///
    /// # Example
    ///
    /// ```
    /// use s7_db::S7Error;
    ///
    /// let err = S7Error::protocol("reply too short");
    /// ```
    pub fn protocol(reason: impl Into<String>) -> Self {
        Self::Protocol {
            reason: reason.into(),
        }
    }

    /// Creates a new `InvalidParameter` error.
    pub fn invalid_parameter(parameter: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_display() {
        let addr: SocketAddr = "192.168.0.1:102".parse().unwrap();
        let err = S7Error::connect(addr, io::Error::from(io::ErrorKind::ConnectionRefused));
        assert!(err.to_string().starts_with("Failed to connect to 192.168.0.1:102"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_not_connected_display() {
        let err = S7Error::not_connected(ConnectionState::TcpOpen);
        assert_eq!(err.to_string(), "Not connected (state: TcpOpen)");
    }

    #[test]
    fn test_type_mismatch_display() {
        let err = S7Error::type_mismatch("Integer", "Float");
        assert_eq!(err.to_string(), "Type mismatch: expected Integer, found Float");
    }

    #[test]
    fn test_invalid_encoding_display() {
        let err = S7Error::invalid_encoding("odd length");
        assert_eq!(err.to_string(), "Invalid encoding: odd length");
    }

    #[test]
    fn test_protocol_display() {
        let err = S7Error::protocol("reply too short");
        assert_eq!(err.to_string(), "Protocol error: reply too short");
    }

    #[test]
    fn test_timeout_display() {
        assert_eq!(S7Error::Timeout.to_string(), "Communication timeout");
    }
}
