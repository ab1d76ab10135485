//! # Error Types
//!
//! Error handling for the peer protocol core.
//!
//! This module defines every error variant that can occur while framing,
//! decoding, encoding and moving packets across a transport.
//!
//! ## Error Categories
//! - **Decode Errors**: Malformed or truncated input, one variant per validation step
//! - **Encode Errors**: Packets that cannot be represented on the wire
//! - **Transport Errors**: Read/write failures, closed connections, timeouts
//! - **Configuration Errors**: Invalid settings
//!
//! Decode errors are final: the decoder never attempts partial recovery, so a
//! caller should log the error kind and drop the packet (or the connection).
//!
//! ## Example Usage
//! ```rust
//! use peer_protocol::core::codec::decode;
//! use peer_protocol::error::ProtocolError;
//! use tracing::warn;
//!
//! match decode(&[0x00, 0x01], None) {
//!     Err(ProtocolError::TooShort(len)) => warn!(len, "Dropping runt packet"),
//!     other => panic!("unexpected: {other:?}"),
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::io;
use thiserror::Error;

use crate::protocol::message_type::MessageType;

/// Error message constants to reduce allocations in error paths.
pub mod constants {
    /// Dispatcher-related error messages
    pub const ERR_DISPATCHER_WRITE_LOCK: &str = "Failed to acquire write lock on dispatcher";
    pub const ERR_DISPATCHER_READ_LOCK: &str = "Failed to acquire read lock on dispatcher";

    /// Transport adapter errors
    pub const ERR_ZERO_READ_BUFFER: &str = "Read buffer size must be greater than 0";
}

// ProtocolError is the primary error type for all protocol operations
#[derive(Error, Debug, Serialize, Deserialize)]
pub enum ProtocolError {
    #[error("Packet too short: {0} bytes (minimum 4)")]
    TooShort(usize),

    #[error("Unable to read length")]
    UnreadableLength,

    #[error("Unable to read version")]
    UnreadableVersion,

    #[error("Unable to read type")]
    UnreadableType,

    #[error("Unknown message type: {0:#04x}")]
    UnknownType(u8),

    #[error("Unable to read vector")]
    UnreadableVector,

    #[error("Unable to read message: expected {expected} bytes, {available} available")]
    UnreadableMessage { expected: usize, available: usize },

    #[error("Declared length {declared} is shorter than the {minimum} bytes the type requires")]
    InvalidLength { declared: u16, minimum: usize },

    #[error("Unsupported protocol version: {0}")]
    UnsupportedVersion(u8),

    #[error("{0} trailing bytes after packet")]
    TrailingBytes(usize),

    #[error("{0} packet requires a vector")]
    MissingVector(MessageType),

    #[error("Packet too large: {0} bytes")]
    OversizedPacket(usize),

    #[error("Transport error: {0}")]
    #[serde(skip_serializing, skip_deserializing)]
    Transport(#[from] io::Error),

    #[error("Received 0 bytes")]
    EmptyRead,

    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Timeout occurred")]
    Timeout,

    #[error("No handler registered for {0}")]
    UnexpectedMessage(MessageType),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Custom error: {0}")]
    Custom(String),
}

impl ProtocolError {
    /// True for failures produced while parsing untrusted bytes.
    ///
    /// Transport failures are surfaced unchanged and never classified as
    /// parse errors.
    pub fn is_decode_error(&self) -> bool {
        matches!(
            self,
            ProtocolError::TooShort(_)
                | ProtocolError::UnreadableLength
                | ProtocolError::UnreadableVersion
                | ProtocolError::UnreadableType
                | ProtocolError::UnknownType(_)
                | ProtocolError::UnreadableVector
                | ProtocolError::UnreadableMessage { .. }
                | ProtocolError::InvalidLength { .. }
                | ProtocolError::UnsupportedVersion(_)
                | ProtocolError::TrailingBytes(_)
        )
    }

    /// True for read/write failures and connection lifecycle conditions.
    pub fn is_transport_error(&self) -> bool {
        matches!(
            self,
            ProtocolError::Transport(_)
                | ProtocolError::EmptyRead
                | ProtocolError::ConnectionClosed
                | ProtocolError::Timeout
        )
    }
}

/// Type alias for Results using ProtocolError
pub type Result<T> = std::result::Result<T, ProtocolError>;
