//! # Body
//!
//! Everything after the header: type tag, optional vector, message payload.
//!
//! ```text
//! [Type(1)] [Vector(16), only for vector-carrying types] [Message(N)]
//! ```
//!
//! Neither the vector nor the message has its own length prefix. Their
//! boundaries come from the fixed vector size and the header's body length.

use bytes::{BufMut, BytesMut};
use std::fmt;

use crate::config::VECTOR_LEN;
use crate::error::ProtocolError;
use crate::protocol::message::{Message, WireMessage};
use crate::protocol::message_type::MessageType;

/// Fixed-size auxiliary field carried by every type except Handshake and Ok
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Vector([u8; VECTOR_LEN]);

impl Vector {
    pub fn new(bytes: [u8; VECTOR_LEN]) -> Self {
        Self(bytes)
    }

    /// Fresh vector filled from the OS random source
    pub fn random() -> Result<Self, ProtocolError> {
        let mut bytes = [0u8; VECTOR_LEN];
        getrandom::fill(&mut bytes)
            .map_err(|e| ProtocolError::Custom(format!("Failed to generate vector: {e}")))?;
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; VECTOR_LEN] {
        &self.0
    }
}

impl From<[u8; VECTOR_LEN]> for Vector {
    fn from(bytes: [u8; VECTOR_LEN]) -> Self {
        Self(bytes)
    }
}

impl TryFrom<&[u8]> for Vector {
    type Error = ProtocolError;

    fn try_from(slice: &[u8]) -> Result<Self, Self::Error> {
        let bytes: [u8; VECTOR_LEN] = slice
            .try_into()
            .map_err(|_| ProtocolError::UnreadableVector)?;
        Ok(Self(bytes))
    }
}

impl fmt::Debug for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Vector(")?;
        for b in &self.0 {
            write!(f, "{b:02x}")?;
        }
        write!(f, ")")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Body {
    pub message_type: MessageType,
    /// Ignored on the wire for types that do not carry a vector
    pub vector: Option<Vector>,
    pub message: Message,
}

impl Body {
    /// Vector as it will appear on the wire
    pub fn wire_vector(&self) -> Option<&Vector> {
        if self.message_type.carries_vector() {
            self.vector.as_ref()
        } else {
            None
        }
    }

    /// Serialized size: type byte, vector if written, message
    pub fn wire_len(&self) -> usize {
        let vector_len = if self.wire_vector().is_some() {
            VECTOR_LEN
        } else {
            0
        };
        1 + vector_len + self.message.wire_len()
    }

    pub fn write_to(&self, buf: &mut BytesMut) {
        buf.put_u8(self.message_type.tag());
        if let Some(vector) = self.wire_vector() {
            buf.put_slice(vector.as_bytes());
        }
        self.message.write_to(buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::message::OkMessage;
    use bytes::Bytes;

    #[test]
    fn test_handshake_body_never_writes_vector() {
        let body = Body {
            message_type: MessageType::Handshake,
            vector: Some(Vector::new([0xAA; VECTOR_LEN])),
            message: Message::from_wire(MessageType::Handshake, Bytes::from_static(b"hi")),
        };
        assert_eq!(body.wire_len(), 3);

        let mut buf = BytesMut::new();
        body.write_to(&mut buf);
        assert_eq!(&buf[..], &[0x00, b'h', b'i']);
    }

    #[test]
    fn test_heartbeat_body_length_includes_vector() {
        let body = Body {
            message_type: MessageType::Heartbeat,
            vector: Some(Vector::new([7; VECTOR_LEN])),
            message: Message::Undecoded(Bytes::new()),
        };
        assert_eq!(body.wire_len(), 17);

        let mut buf = BytesMut::new();
        body.write_to(&mut buf);
        assert_eq!(buf.len(), 17);
        assert_eq!(buf[0], 2);
        assert!(buf[1..].iter().all(|&b| b == 7));
    }

    #[test]
    fn test_ok_body_length() {
        let body = Body {
            message_type: MessageType::Ok,
            vector: None,
            message: Message::Ok(OkMessage(Bytes::from_static(b"ACK"))),
        };
        assert_eq!(body.wire_len(), 4);
    }

    #[test]
    fn test_vector_from_slice() {
        assert!(Vector::try_from(&[0u8; 16][..]).is_ok());
        assert!(matches!(
            Vector::try_from(&[0u8; 10][..]),
            Err(ProtocolError::UnreadableVector)
        ));
    }

    #[test]
    fn test_random_vectors_differ() {
        let a = Vector::random().expect("os rng");
        let b = Vector::random().expect("os rng");
        assert_ne!(a, b);
    }
}
