//! # Message Variants
//!
//! Type-specific payloads carried inside a [`Body`](crate::core::body::Body).
//!
//! Only Handshake and Ok have a decode rule today; both are opaque byte
//! payloads written verbatim with no inner framing. Every other registered
//! type decodes to [`Message::Undecoded`], which keeps the raw bytes so the
//! envelope can still be inspected or forwarded unchanged.

use bytes::{BufMut, Bytes, BytesMut};

use crate::protocol::message_type::MessageType;

/// Capabilities every payload variant provides to the body serializer
pub trait WireMessage {
    /// Number of bytes `write_to` appends
    fn wire_len(&self) -> usize;

    /// Append the payload to `buf`
    fn write_to(&self, buf: &mut BytesMut);
}

/// Handshake payload
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HandshakeMessage(pub Bytes);

/// Ok payload
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OkMessage(pub Bytes);

impl HandshakeMessage {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl OkMessage {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl WireMessage for HandshakeMessage {
    fn wire_len(&self) -> usize {
        self.0.len()
    }

    fn write_to(&self, buf: &mut BytesMut) {
        buf.put_slice(&self.0);
    }
}

impl WireMessage for OkMessage {
    fn wire_len(&self) -> usize {
        self.0.len()
    }

    fn write_to(&self, buf: &mut BytesMut) {
        buf.put_slice(&self.0);
    }
}

/// Payload carried by a body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Handshake(HandshakeMessage),
    Ok(OkMessage),
    /// Registered type without a decode rule. The envelope was validated but
    /// the payload is opaque.
    Undecoded(Bytes),
}

impl Message {
    /// Build the payload variant for `message_type` from raw payload bytes.
    ///
    /// This is the only place decode rules are attached to registered types.
    pub fn from_wire(message_type: MessageType, payload: Bytes) -> Self {
        match message_type {
            MessageType::Handshake => Message::Handshake(HandshakeMessage(payload)),
            MessageType::Ok => Message::Ok(OkMessage(payload)),
            MessageType::Heartbeat
            | MessageType::Gone
            | MessageType::Transfer
            | MessageType::PeerInfo => Message::Undecoded(payload),
        }
    }

    /// False for envelope-only payloads
    pub fn is_decoded(&self) -> bool {
        !matches!(self, Message::Undecoded(_))
    }

    /// Raw payload bytes regardless of variant
    pub fn payload(&self) -> &[u8] {
        match self {
            Message::Handshake(m) => m.as_bytes(),
            Message::Ok(m) => m.as_bytes(),
            Message::Undecoded(raw) => raw,
        }
    }
}

impl WireMessage for Message {
    fn wire_len(&self) -> usize {
        match self {
            Message::Handshake(m) => m.wire_len(),
            Message::Ok(m) => m.wire_len(),
            Message::Undecoded(raw) => raw.len(),
        }
    }

    fn write_to(&self, buf: &mut BytesMut) {
        match self {
            Message::Handshake(m) => m.write_to(buf),
            Message::Ok(m) => m.write_to(buf),
            Message::Undecoded(raw) => buf.put_slice(raw),
        }
    }
}
