//! # Packet
//!
//! One complete protocol unit: a [`Header`] followed by a [`Body`].
//!
//! A packet is a plain value. It is built either by decoding untrusted bytes
//! or by the caller assembling one to send, consumed once, and dropped.
//!
//! The header length is an output of encoding: the encoder always recomputes
//! it from the body, so locally produced packets satisfy
//! `wire_len() == Header::LEN + data.wire_len()`.

use bytes::Bytes;

use crate::core::body::{Body, Vector};
use crate::core::codec;
use crate::core::header::Header;
use crate::error::Result;
use crate::protocol::message::Message;
use crate::protocol::message_type::MessageType;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub head: Header,
    pub data: Body,
}

impl Packet {
    /// Assemble a packet, stamping a header consistent with `data`.
    ///
    /// Bodies larger than the length field can describe get a saturated
    /// header length; `encode` rejects them.
    pub fn new(data: Body) -> Self {
        let length = u16::try_from(data.wire_len()).unwrap_or(u16::MAX);
        Self {
            head: Header::new(length),
            data,
        }
    }

    pub fn handshake(payload: impl Into<Bytes>) -> Self {
        Self::new(Body {
            message_type: MessageType::Handshake,
            vector: None,
            message: Message::from_wire(MessageType::Handshake, payload.into()),
        })
    }

    pub fn ok(payload: impl Into<Bytes>) -> Self {
        Self::new(Body {
            message_type: MessageType::Ok,
            vector: None,
            message: Message::from_wire(MessageType::Ok, payload.into()),
        })
    }

    /// Packet for any type; the vector is dropped for Handshake and Ok
    pub fn with_vector(
        message_type: MessageType,
        vector: Vector,
        payload: impl Into<Bytes>,
    ) -> Self {
        let vector = message_type.carries_vector().then_some(vector);
        Self::new(Body {
            message_type,
            vector,
            message: Message::from_wire(message_type, payload.into()),
        })
    }

    pub fn message_type(&self) -> MessageType {
        self.data.message_type
    }

    /// Total serialized size, header included
    pub fn wire_len(&self) -> usize {
        Header::LEN + self.data.wire_len()
    }

    /// Serialize with [`codec::encode`]
    pub fn to_bytes(&self) -> Result<Bytes> {
        codec::encode(self)
    }

    /// Parse with [`codec::decode`] and default options
    pub fn from_bytes(buf: &[u8]) -> Result<Self> {
        codec::decode(buf, None)
    }
}
