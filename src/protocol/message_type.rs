//! # Message Type Registry
//!
//! Maps the one-byte wire tag to a known message type.
//!
//! The registry is deliberately decoupled from the payload decode rules in
//! [`crate::protocol::message`]: a type may be registered (and therefore pass
//! framing validation) before its payload format is defined.
//!
//! | Tag | Type      | Vector |
//! |-----|-----------|--------|
//! | 0   | Handshake | no     |
//! | 1   | Ok        | no     |
//! | 2   | Heartbeat | yes    |
//! | 3   | Gone      | yes    |
//! | 4   | Transfer  | yes    |
//! | 5   | PeerInfo  | yes    |

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ProtocolError;

/// Name reported for tags outside the registry
pub const UNKNOWN_TYPE_NAME: &str = "Unknown";

/// Known message types, keyed by their wire tag
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MessageType {
    Handshake = 0,
    Ok = 1,
    Heartbeat = 2,
    Gone = 3,
    Transfer = 4,
    PeerInfo = 5,
}

impl MessageType {
    /// Every registered type in tag order
    pub const ALL: [MessageType; 6] = [
        MessageType::Handshake,
        MessageType::Ok,
        MessageType::Heartbeat,
        MessageType::Gone,
        MessageType::Transfer,
        MessageType::PeerInfo,
    ];

    /// Wire tag for this type
    #[inline]
    pub fn tag(self) -> u8 {
        self as u8
    }

    /// Human-readable name, used for diagnostics
    pub fn name(self) -> &'static str {
        match self {
            MessageType::Handshake => "Handshake",
            MessageType::Ok => "Ok",
            MessageType::Heartbeat => "Heartbeat",
            MessageType::Gone => "Gone",
            MessageType::Transfer => "Transfer",
            MessageType::PeerInfo => "PeerInfo",
        }
    }

    /// Whether bodies of this type carry the fixed 16-byte vector.
    ///
    /// Handshake and Ok never read or write it.
    #[inline]
    pub fn carries_vector(self) -> bool {
        !matches!(self, MessageType::Handshake | MessageType::Ok)
    }

    /// Look up a tag without producing an error
    #[inline]
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(MessageType::Handshake),
            1 => Some(MessageType::Ok),
            2 => Some(MessageType::Heartbeat),
            3 => Some(MessageType::Gone),
            4 => Some(MessageType::Transfer),
            5 => Some(MessageType::PeerInfo),
            _ => None,
        }
    }
}

impl TryFrom<u8> for MessageType {
    type Error = ProtocolError;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        MessageType::from_tag(tag).ok_or(ProtocolError::UnknownType(tag))
    }
}

impl From<MessageType> for u8 {
    fn from(message_type: MessageType) -> Self {
        message_type.tag()
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Whether `tag` is a registered message type
#[inline]
pub fn is_known(tag: u8) -> bool {
    MessageType::from_tag(tag).is_some()
}

/// Diagnostic name for any tag. Never fails; unknown tags map to
/// [`UNKNOWN_TYPE_NAME`].
pub fn type_name(tag: u8) -> &'static str {
    MessageType::from_tag(tag).map_or(UNKNOWN_TYPE_NAME, MessageType::name)
}
