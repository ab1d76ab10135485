//! # Peer Protocol
//!
//! Binary framing and message dispatch for a peer-to-peer network.
//!
//! The crate turns byte streams into typed, validated [`Packet`]s and packets
//! back into bytes. Connection setup, session state and handshakes belong to
//! the caller; this crate only owns the wire format.
//!
//! ## Wire Format
//! ```text
//! offset  size  field
//! 0       2     length   byte count of everything after the header
//! 2       1     version  protocol version (currently 1)
//! 3       1     type     message type tag
//! 4       16    vector   present unless type is Handshake or Ok
//! 4|20    N     message  N = length - 1 - (16 if vector present)
//! ```
//!
//! ## Example
//! ```rust
//! use peer_protocol::{decode, encode, MessageType, Packet};
//!
//! let bytes = encode(&Packet::ok(&b"ACK"[..])).unwrap();
//! assert_eq!(&bytes[..], &[0x00, 0x04, 0x01, 0x01, b'A', b'C', b'K']);
//!
//! let packet = decode(&bytes, None).unwrap();
//! assert_eq!(packet.message_type(), MessageType::Ok);
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod protocol;
pub mod transport;
pub mod utils;

pub use crate::core::body::{Body, Vector};
pub use crate::core::codec::{
    decode, decode_prefix, decode_with, encode, DecodeOptions, Framing, PacketCodec, VersionPolicy,
};
pub use crate::core::header::Header;
pub use crate::core::packet::Packet;
pub use crate::error::{ProtocolError, Result};
pub use crate::protocol::dispatcher::Dispatcher;
pub use crate::protocol::message::{HandshakeMessage, Message, OkMessage, WireMessage};
pub use crate::protocol::message_type::{is_known, type_name, MessageType};
pub use crate::transport::connection::Connection;
pub use crate::transport::{receive_packet, send_packet};
