//! # Connection
//!
//! A framed packet stream over any `AsyncRead + AsyncWrite` transport.
//!
//! Reads are reassembled by [`PacketCodec`], so a packet split across TCP
//! segments (or several packets in one segment) decode correctly. A decode
//! failure is terminal for the connection: the caller should log it and
//! drop the connection.

use std::time::{Duration, Instant};

use futures::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio_util::codec::Framed;
use tracing::{debug, info, instrument, warn};

use crate::config::NetworkConfig;
use crate::core::codec::PacketCodec;
use crate::core::packet::Packet;
use crate::error::{ProtocolError, Result};
use crate::utils::metrics::global_metrics;
use crate::utils::timeout::{with_timeout_error, DEFAULT_TIMEOUT};

pub struct Connection<S> {
    framed: Framed<S, PacketCodec>,
    send_timeout: Duration,
    recv_timeout: Duration,
    last_activity: Instant,
    _active: ActiveConnection,
}

/// Keeps the active-connection gauge in step with live connections
struct ActiveConnection;

impl ActiveConnection {
    fn open() -> Self {
        global_metrics().connection_established();
        Self
    }
}

impl Drop for ActiveConnection {
    fn drop(&mut self) {
        global_metrics().connection_closed();
    }
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Wrap `stream` with default decode options and timeouts
    pub fn new(stream: S) -> Self {
        Self::with_codec(stream, PacketCodec::default())
    }

    /// Wrap `stream` using the codec and transport settings from `config`.
    ///
    /// `transport.read_buffer_size` is the initial read buffer capacity; the
    /// buffer still grows to hold any single frame.
    pub fn from_config(stream: S, config: &NetworkConfig) -> Self {
        let codec = PacketCodec::new(config.codec.decode_options());
        Self::with_framed(Framed::with_capacity(
            stream,
            codec,
            config.transport.read_buffer_size,
        ))
        .with_timeouts(config.transport.write_timeout, config.transport.read_timeout)
    }

    fn with_codec(stream: S, codec: PacketCodec) -> Self {
        Self::with_framed(Framed::new(stream, codec))
    }

    fn with_framed(framed: Framed<S, PacketCodec>) -> Self {
        Self {
            framed,
            send_timeout: DEFAULT_TIMEOUT,
            recv_timeout: DEFAULT_TIMEOUT,
            last_activity: Instant::now(),
            _active: ActiveConnection::open(),
        }
    }

    /// Set custom timeout durations
    pub fn with_timeouts(mut self, send_timeout: Duration, recv_timeout: Duration) -> Self {
        self.send_timeout = send_timeout;
        self.recv_timeout = recv_timeout;
        self
    }

    /// Get the time since the last activity (send or receive)
    pub fn time_since_last_activity(&self) -> Duration {
        self.last_activity.elapsed()
    }

    fn update_activity(&mut self) {
        self.last_activity = Instant::now();
    }

    #[instrument(skip(self, packet), fields(message_type = %packet.message_type()), level = "debug")]
    pub async fn send(&mut self, packet: Packet) -> Result<()> {
        let byte_count = packet.wire_len() as u64;
        let timeout = self.send_timeout;

        let sent = with_timeout_error(
            async {
                self.framed.send(packet).await?;
                Ok(())
            },
            timeout,
        )
        .await;

        if let Err(e) = sent {
            warn!(error = %e, "Failed to send packet");
            global_metrics().record_error(&e);
            return Err(e);
        }

        global_metrics().packet_sent(byte_count);
        self.update_activity();
        Ok(())
    }

    #[instrument(skip(self), level = "debug")]
    pub async fn recv(&mut self) -> Result<Packet> {
        let timeout = self.recv_timeout;
        let received = with_timeout_error(
            async {
                self.framed
                    .next()
                    .await
                    .ok_or(ProtocolError::ConnectionClosed)?
            },
            timeout,
        )
        .await;

        let packet = match received {
            Ok(packet) => packet,
            Err(e) => {
                warn!(error = %e, "Failed to receive packet");
                global_metrics().record_error(&e);
                return Err(e);
            }
        };

        debug!(
            message_type = %packet.message_type(),
            length = packet.head.length,
            "Received packet"
        );
        global_metrics().packet_received(packet.wire_len() as u64);
        self.update_activity();
        Ok(packet)
    }

    /// Flush pending writes and shut the stream down
    pub async fn close(mut self) -> Result<()> {
        SinkExt::<Packet>::close(&mut self.framed).await?;
        debug!("Connection closed");
        Ok(())
    }

    /// Give back the underlying stream
    pub fn into_inner(self) -> S {
        self.framed.into_inner()
    }
}

impl Connection<TcpStream> {
    /// Open a TCP connection to `config.client.address`
    #[instrument(skip(config), fields(address = %config.client.address))]
    pub async fn connect(config: &NetworkConfig) -> Result<Self> {
        let stream = with_timeout_error(
            async { Ok(TcpStream::connect(&config.client.address).await?) },
            config.client.connection_timeout,
        )
        .await?;
        stream.set_nodelay(true)?;

        info!("Connected to peer");
        Ok(Self::from_config(stream, config))
    }
}
