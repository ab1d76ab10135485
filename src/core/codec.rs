//! # Codec
//!
//! Conversion between bytes and [`Packet`] values.
//!
//! `encode` and `decode` are pure: they touch only their arguments and
//! allocate a fresh output, so they can be called from any number of tasks
//! without synchronization. [`PacketCodec`] wraps the same logic for
//! `tokio_util` framed streams.
//!
//! ## Decode sequence
//! Decoding is a single front-to-back pass. The first failing step aborts
//! with its own error:
//!
//! 1. fewer than 4 bytes: `TooShort`
//! 2. length field: `UnreadableLength`
//! 3. version field: `UnreadableVersion` (`UnsupportedVersion` when enforced)
//! 4. type field: `UnreadableType`
//! 5. registry lookup: `UnknownType`
//! 6. declared length cannot hold the type byte: `InvalidLength`
//! 7. vector for vector-carrying types: `UnreadableVector`, then `InvalidLength`
//!    if the declared length cannot hold it
//! 8. message payload of the remaining declared length: `UnreadableMessage`
//! 9. strict framing only: leftover input is `TrailingBytes`

use bytes::{Buf, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};
use tracing::trace;

use crate::config::{MIN_PACKET_LEN, PROTOCOL_VERSION, VECTOR_LEN};
use crate::core::body::{Body, Vector};
use crate::core::header::Header;
use crate::core::packet::Packet;
use crate::error::{ProtocolError, Result};
use crate::protocol::message::Message;
use crate::protocol::message_type::MessageType;

/// How input beyond the declared packet length is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Framing {
    /// The input must hold exactly one packet
    #[default]
    Strict,
    /// Trailing bytes are left for the caller (e.g. the next packet)
    Streaming,
}

/// Which header versions the decoder accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VersionPolicy {
    /// Only `PROTOCOL_VERSION`
    #[default]
    Current,
    /// Any version byte
    Any,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecodeOptions {
    pub framing: Framing,
    pub version_policy: VersionPolicy,
}

impl DecodeOptions {
    pub fn streaming() -> Self {
        Self {
            framing: Framing::Streaming,
            ..Self::default()
        }
    }
}

/// Serialize a packet into a buffer sized exactly `packet.wire_len()`.
///
/// Encoding is checked on purpose: a vector-carrying type without a vector
/// fails with `MissingVector`, and a body longer than the length field can
/// express fails with `OversizedPacket`, instead of emitting bytes no peer
/// can decode.
pub fn encode(packet: &Packet) -> Result<Bytes> {
    let mut buf = BytesMut::with_capacity(packet.wire_len());
    encode_into(packet, &mut buf)?;
    Ok(buf.freeze())
}

/// Append a packet to `buf`.
///
/// The header length is always recomputed from the body; the value stored in
/// `packet.head.length` is ignored.
pub fn encode_into(packet: &Packet, buf: &mut BytesMut) -> Result<()> {
    let body = &packet.data;
    if body.message_type.carries_vector() && body.vector.is_none() {
        return Err(ProtocolError::MissingVector(body.message_type));
    }

    let body_len = body.wire_len();
    let length = u16::try_from(body_len)
        .map_err(|_| ProtocolError::OversizedPacket(Header::LEN + body_len))?;

    buf.reserve(Header::LEN + body_len);
    Header {
        length,
        version: packet.head.version,
    }
    .write_to(buf);
    body.write_to(buf);

    Ok(())
}

/// Decode exactly one packet with the default options.
///
/// `session_key` is reserved for authenticating the vector field and is not
/// enforced yet.
pub fn decode(data: &[u8], session_key: Option<&[u8]>) -> Result<Packet> {
    decode_with(data, session_key, &DecodeOptions::default())
}

pub fn decode_with(
    data: &[u8],
    session_key: Option<&[u8]>,
    options: &DecodeOptions,
) -> Result<Packet> {
    decode_buf(data, session_key, options).map(|(packet, _)| packet)
}

/// Decode the packet at the front of `data`, tolerating trailing bytes.
///
/// Returns the packet and the number of bytes it occupied.
pub fn decode_prefix(
    data: &[u8],
    session_key: Option<&[u8]>,
    options: &DecodeOptions,
) -> Result<(Packet, usize)> {
    let options = DecodeOptions {
        framing: Framing::Streaming,
        ..*options
    };
    decode_buf(data, session_key, &options)
}

fn decode_buf<B: Buf>(
    mut buf: B,
    session_key: Option<&[u8]>,
    options: &DecodeOptions,
) -> Result<(Packet, usize)> {
    let total = buf.remaining();
    if total < MIN_PACKET_LEN {
        return Err(ProtocolError::TooShort(total));
    }

    // TODO: authenticate the vector once session keys are negotiated
    if session_key.is_some() {
        trace!("Session key supplied; vector authentication is not enforced");
    }

    let head = Header::read_from(&mut buf)?;
    if options.version_policy == VersionPolicy::Current && head.version != PROTOCOL_VERSION {
        return Err(ProtocolError::UnsupportedVersion(head.version));
    }

    if !buf.has_remaining() {
        return Err(ProtocolError::UnreadableType);
    }
    let message_type = MessageType::try_from(buf.get_u8())?;

    let mut remaining = usize::from(head.length)
        .checked_sub(1)
        .ok_or_else(|| invalid_length(head.length, 1))?;

    let vector = if message_type.carries_vector() {
        if buf.remaining() < VECTOR_LEN {
            return Err(ProtocolError::UnreadableVector);
        }
        let mut bytes = [0u8; VECTOR_LEN];
        buf.copy_to_slice(&mut bytes);
        remaining = remaining
            .checked_sub(VECTOR_LEN)
            .ok_or_else(|| invalid_length(head.length, 1 + VECTOR_LEN))?;
        Some(Vector::new(bytes))
    } else {
        None
    };

    if buf.remaining() < remaining {
        return Err(ProtocolError::UnreadableMessage {
            expected: remaining,
            available: buf.remaining(),
        });
    }
    let payload = buf.copy_to_bytes(remaining);

    if options.framing == Framing::Strict && buf.has_remaining() {
        return Err(ProtocolError::TrailingBytes(buf.remaining()));
    }

    let packet = Packet {
        head,
        data: Body {
            message_type,
            vector,
            message: Message::from_wire(message_type, payload),
        },
    };
    Ok((packet, total - buf.remaining()))
}

fn invalid_length(declared: u16, minimum: usize) -> ProtocolError {
    ProtocolError::InvalidLength { declared, minimum }
}

/// Length-delimited codec for framed byte streams.
///
/// Decoding waits until the header's declared length is fully buffered, then
/// splits the frame off without copying and decodes it strictly.
#[derive(Debug, Clone, Copy, Default)]
pub struct PacketCodec {
    options: DecodeOptions,
}

impl PacketCodec {
    pub fn new(options: DecodeOptions) -> Self {
        Self { options }
    }
}

impl Decoder for PacketCodec {
    type Item = Packet;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        if src.len() < 2 {
            return Ok(None);
        }

        let length = usize::from(u16::from_be_bytes([src[0], src[1]]));
        let options = DecodeOptions {
            framing: Framing::Strict,
            ..self.options
        };

        // A zero length cannot hold the type byte; classify it the same way
        // `decode` does once the 4-byte minimum is buffered.
        if length == 0 {
            if src.len() < MIN_PACKET_LEN {
                return Ok(None);
            }
            return decode_buf(&src[..MIN_PACKET_LEN], None, &options)
                .and(Err(invalid_length(0, 1)));
        }

        let frame_len = Header::LEN + length;
        if src.len() < frame_len {
            src.reserve(frame_len - src.len());
            return Ok(None);
        }

        let frame = src.split_to(frame_len).freeze();
        decode_buf(frame, None, &options).map(|(packet, _)| Some(packet))
    }
}

impl Encoder<Packet> for PacketCodec {
    type Error = ProtocolError;

    fn encode(&mut self, item: Packet, dst: &mut BytesMut) -> Result<()> {
        encode_into(&item, dst)
    }
}
