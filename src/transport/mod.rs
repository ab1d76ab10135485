//! # Transport Adapter
//!
//! Thin glue between byte streams and the codec.
//!
//! - [`receive_packet`] performs one bounded read and decodes the packet at
//!   the front of the bytes it got. A zero-byte read is reported as
//!   `EmptyRead`, never as a parse error; I/O failures are surfaced
//!   unchanged as `Transport`. Reads on a stream may coalesce packets, so
//!   the adapter uses streaming framing: the first packet is returned and
//!   bytes after it are discarded (logged at debug). Callers that must keep
//!   every packet of a stream use [`connection::Connection`].
//! - [`send_packet`] encodes a packet and writes all of it. A partial write
//!   fails the whole operation; nothing is retried or resumed.
//! - [`connection::Connection`] frames a long-lived stream with
//!   [`PacketCodec`](crate::core::codec::PacketCodec) so packets split
//!   across reads, or sharing one read, are reassembled.
//!
//! Deadlines are the caller's choice: the `*_with_timeout` variants wrap
//! the plain operations and fail with `Timeout`.

pub mod connection;

use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, error, instrument, trace, warn};

use crate::core::codec::{decode_prefix, decode_with, encode, DecodeOptions, Framing};
use crate::core::packet::Packet;
use crate::error::constants::ERR_ZERO_READ_BUFFER;
use crate::error::{ProtocolError, Result};
use crate::utils::metrics::global_metrics;
use crate::utils::timeout::with_timeout_error;

/// Read up to `max_bytes` once and decode the first packet in them.
///
/// Uses [`DecodeOptions::streaming`]; see the module docs for what happens to
/// the bytes after that packet.
pub async fn receive_packet<R>(
    source: &mut R,
    max_bytes: usize,
    session_key: Option<&[u8]>,
) -> Result<Packet>
where
    R: AsyncRead + Unpin,
{
    receive_packet_with(source, max_bytes, session_key, &DecodeOptions::streaming()).await
}

/// [`receive_packet`] with explicit decode options.
///
/// `DecodeOptions::default()` is strict: a read holding anything beyond one
/// packet fails with `TrailingBytes`.
#[instrument(skip(source, session_key, options), level = "debug")]
pub async fn receive_packet_with<R>(
    source: &mut R,
    max_bytes: usize,
    session_key: Option<&[u8]>,
    options: &DecodeOptions,
) -> Result<Packet>
where
    R: AsyncRead + Unpin,
{
    if max_bytes == 0 {
        return Err(ProtocolError::ConfigError(ERR_ZERO_READ_BUFFER.to_string()));
    }

    let mut buf = vec![0u8; max_bytes];
    let n = match source.read(&mut buf).await {
        Ok(n) => n,
        Err(e) => {
            error!(error = %e, "Error on read from connection");
            let err = ProtocolError::from(e);
            global_metrics().record_error(&err);
            return Err(err);
        }
    };

    if n == 0 {
        debug!("Received 0 bytes");
        global_metrics().record_error(&ProtocolError::EmptyRead);
        return Err(ProtocolError::EmptyRead);
    }

    buf.truncate(n);
    trace!(bytes = n, data = ?buf, "Received bytes");

    let decoded = match options.framing {
        Framing::Strict => decode_with(&buf, session_key, options).map(|packet| (packet, n)),
        Framing::Streaming => decode_prefix(&buf, session_key, options),
    };
    let (packet, consumed) = decoded.map_err(|e| {
        warn!(error = %e, bytes = n, "Unable to decode packet");
        global_metrics().record_error(&e);
        e
    })?;

    if consumed < n {
        debug!(discarded = n - consumed, "Bytes after packet discarded");
    }

    debug!(
        message_type = %packet.message_type(),
        version = packet.head.version,
        length = packet.head.length,
        "Received packet"
    );
    global_metrics().packet_received(consumed as u64);

    Ok(packet)
}

/// Encode `packet` and write the whole result to `sink`
#[instrument(skip(sink, packet), fields(message_type = %packet.message_type()), level = "debug")]
pub async fn send_packet<W>(sink: &mut W, packet: &Packet) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let type_name = packet.message_type().name();

    let bytes = encode(packet).map_err(|e| {
        error!(error = %e, "Error on encoding {type_name}");
        e
    })?;

    debug!(bytes = bytes.len(), "Sending {type_name} message");

    let written = async {
        sink.write_all(&bytes).await?;
        sink.flush().await
    }
    .await;

    if let Err(e) = written {
        error!(error = %e, "Error on write {type_name}");
        let err = ProtocolError::from(e);
        global_metrics().record_error(&err);
        return Err(err);
    }

    trace!(bytes = bytes.len(), "{type_name} message sent");
    global_metrics().packet_sent(bytes.len() as u64);

    Ok(())
}

/// [`receive_packet`] bounded by `deadline`
pub async fn receive_packet_with_timeout<R>(
    source: &mut R,
    max_bytes: usize,
    session_key: Option<&[u8]>,
    deadline: Duration,
) -> Result<Packet>
where
    R: AsyncRead + Unpin,
{
    with_timeout_error(receive_packet(source, max_bytes, session_key), deadline).await
}

/// [`send_packet`] bounded by `deadline`
pub async fn send_packet_with_timeout<W>(
    sink: &mut W,
    packet: &Packet,
    deadline: Duration,
) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    with_timeout_error(send_packet(sink, packet), deadline).await
}
