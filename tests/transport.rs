//! Integration tests for the transport adapter and framed connections
//!
//! In-memory duplex pipes stand in for sockets so every test is hermetic.

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use peer_protocol::core::packet::Packet;
use peer_protocol::error::ProtocolError;
use peer_protocol::protocol::message_type::MessageType;
use peer_protocol::transport::{
    receive_packet, receive_packet_with, receive_packet_with_timeout, send_packet,
    send_packet_with_timeout,
};
use peer_protocol::{encode, Connection, DecodeOptions, Dispatcher, Vector};
use tokio::io::{duplex, AsyncRead, AsyncWrite, AsyncWriteExt, ReadBuf};

/// Sink that accepts a few bytes, then refuses the rest
struct ShortWriter {
    accepted: usize,
}

impl AsyncWrite for ShortWriter {
    fn poll_write(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        if self.accepted >= 3 {
            return Poll::Ready(Ok(0));
        }
        let n = buf.len().min(3 - self.accepted);
        self.accepted += n;
        Poll::Ready(Ok(n))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

/// Source whose reads always fail
struct BrokenReader;

impl AsyncRead for BrokenReader {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        _buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Poll::Ready(Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset")))
    }
}

#[tokio::test]
async fn test_send_then_receive_packet() {
    let (mut client, mut server) = duplex(1024);

    send_packet(&mut client, &Packet::ok(&b"ACK"[..])).await.unwrap();

    let packet = receive_packet(&mut server, 1024, None).await.unwrap();
    assert_eq!(packet.message_type(), MessageType::Ok);
    assert_eq!(packet.data.message.payload(), b"ACK");
}

#[tokio::test]
async fn test_send_writes_exact_wire_bytes() {
    let (mut client, mut server) = duplex(64);
    send_packet(&mut client, &Packet::ok(&b"ACK"[..])).await.unwrap();
    drop(client);

    let mut received = Vec::new();
    tokio::io::AsyncReadExt::read_to_end(&mut server, &mut received)
        .await
        .unwrap();
    assert_eq!(received, vec![0x00, 0x04, 0x01, 0x01, 0x41, 0x43, 0x4B]);
}

#[tokio::test]
async fn test_closed_source_is_empty_read() {
    let (client, mut server) = duplex(64);
    drop(client);

    match receive_packet(&mut server, 64, None).await {
        Err(ProtocolError::EmptyRead) => {}
        other => panic!("unexpected: {other:?}"),
    }
}

#[tokio::test]
async fn test_read_failure_is_transport_error() {
    match receive_packet(&mut BrokenReader, 64, None).await {
        Err(ProtocolError::Transport(e)) => assert_eq!(e.kind(), io::ErrorKind::ConnectionReset),
        other => panic!("unexpected: {other:?}"),
    }
}

#[tokio::test]
async fn test_zero_max_bytes_rejected() {
    let (_client, mut server) = duplex(64);
    assert!(matches!(
        receive_packet(&mut server, 0, None).await,
        Err(ProtocolError::ConfigError(_))
    ));
}

#[tokio::test]
async fn test_malformed_bytes_are_decode_errors() {
    let (mut client, mut server) = duplex(64);
    client.write_all(&[0x00, 0x04, 0x01, 0xFF]).await.unwrap();

    let err = receive_packet(&mut server, 64, None).await.unwrap_err();
    assert!(matches!(err, ProtocolError::UnknownType(0xFF)));
    assert!(err.is_decode_error());
}

#[tokio::test]
async fn test_coalesced_read_returns_first_packet() {
    let (mut client, mut server) = duplex(1024);
    let mut wire = encode(&Packet::ok(&b"one"[..])).unwrap().to_vec();
    wire.extend_from_slice(&encode(&Packet::ok(&b"two"[..])).unwrap());
    client.write_all(&wire).await.unwrap();

    let packet = receive_packet(&mut server, 1024, None).await.unwrap();
    assert_eq!(packet.message_type(), MessageType::Ok);
    assert_eq!(packet.data.message.payload(), b"one");
}

#[tokio::test]
async fn test_strict_receive_rejects_coalesced_read() {
    let (mut client, mut server) = duplex(1024);
    let mut wire = encode(&Packet::ok(&b"one"[..])).unwrap().to_vec();
    wire.extend_from_slice(&encode(&Packet::ok(&b"two"[..])).unwrap());
    client.write_all(&wire).await.unwrap();

    let result = receive_packet_with(&mut server, 1024, None, &DecodeOptions::default()).await;
    assert!(matches!(result, Err(ProtocolError::TrailingBytes(7))));
}

#[tokio::test]
async fn test_bounded_read_truncates_packet() {
    let (mut client, mut server) = duplex(1024);
    let packet = Packet::with_vector(MessageType::Transfer, Vector::new([2; 16]), vec![0u8; 100]);
    send_packet(&mut client, &packet).await.unwrap();

    // Only 10 bytes requested: the vector cannot be read
    assert!(matches!(
        receive_packet(&mut server, 10, None).await,
        Err(ProtocolError::UnreadableVector)
    ));
}

#[tokio::test]
async fn test_partial_write_fails_whole_send() {
    let mut sink = ShortWriter { accepted: 0 };
    match send_packet(&mut sink, &Packet::ok(&b"ACK"[..])).await {
        Err(ProtocolError::Transport(e)) => assert_eq!(e.kind(), io::ErrorKind::WriteZero),
        other => panic!("unexpected: {other:?}"),
    }
}

#[tokio::test]
async fn test_send_reports_encode_errors() {
    let (mut client, _server) = duplex(64);
    let mut packet = Packet::with_vector(MessageType::Gone, Vector::default(), &b""[..]);
    packet.data.vector = None;

    assert!(matches!(
        send_packet(&mut client, &packet).await,
        Err(ProtocolError::MissingVector(MessageType::Gone))
    ));
}

#[tokio::test]
async fn test_receive_deadline() {
    let (_client, mut server) = duplex(64);
    let result =
        receive_packet_with_timeout(&mut server, 64, None, Duration::from_millis(20)).await;
    assert!(matches!(result, Err(ProtocolError::Timeout)));
}

#[tokio::test]
async fn test_send_deadline_on_full_pipe() {
    // Pipe buffer smaller than the packet and nobody reading
    let (mut client, _server) = duplex(4);
    let packet = Packet::ok(vec![0u8; 64]);
    let result = send_packet_with_timeout(&mut client, &packet, Duration::from_millis(20)).await;
    assert!(matches!(result, Err(ProtocolError::Timeout)));
}

// ============================================================================
// FRAMED CONNECTIONS
// ============================================================================

#[tokio::test]
async fn test_connection_exchange() {
    let (a, b) = duplex(4096);
    let mut alice = Connection::new(a);
    let mut bob = Connection::new(b);

    alice.send(Packet::handshake(&b"alice"[..])).await.unwrap();
    alice
        .send(Packet::with_vector(MessageType::Heartbeat, Vector::new([9; 16]), &b""[..]))
        .await
        .unwrap();

    let first = bob.recv().await.unwrap();
    let second = bob.recv().await.unwrap();
    assert_eq!(first.message_type(), MessageType::Handshake);
    assert_eq!(first.data.message.payload(), b"alice");
    assert_eq!(second.message_type(), MessageType::Heartbeat);
    assert_eq!(second.data.vector, Some(Vector::new([9; 16])));
}

#[tokio::test]
async fn test_connection_with_dispatcher() {
    let (a, b) = duplex(4096);
    let mut client = Connection::new(a);
    let mut server = Connection::new(b);

    let dispatcher = Dispatcher::new();
    dispatcher
        .register(MessageType::Handshake, |_| Ok(Some(Packet::ok(&b"ACK"[..]))))
        .unwrap();

    client.send(Packet::handshake(&b"hi"[..])).await.unwrap();
    let incoming = server.recv().await.unwrap();
    if let Some(reply) = dispatcher.dispatch(&incoming).unwrap() {
        server.send(reply).await.unwrap();
    }

    let reply = client.recv().await.unwrap();
    assert_eq!(reply.message_type(), MessageType::Ok);
    assert_eq!(reply.data.message.payload(), b"ACK");
}

#[tokio::test]
async fn test_connection_closed() {
    let (a, b) = duplex(64);
    let mut conn = Connection::new(a);
    drop(b);

    assert!(matches!(
        conn.recv().await,
        Err(ProtocolError::ConnectionClosed)
    ));
}

#[tokio::test]
async fn test_connection_recv_timeout() {
    let (a, _b) = duplex(64);
    let mut conn =
        Connection::new(a).with_timeouts(Duration::from_secs(1), Duration::from_millis(20));

    assert!(matches!(conn.recv().await, Err(ProtocolError::Timeout)));
}

#[tokio::test]
async fn test_connection_tracks_activity() {
    let (a, b) = duplex(64);
    let mut conn = Connection::new(a);
    let _peer = Connection::new(b);

    tokio::time::sleep(Duration::from_millis(30)).await;
    assert!(conn.time_since_last_activity() >= Duration::from_millis(30));

    conn.send(Packet::ok(&b""[..])).await.unwrap();
    assert!(conn.time_since_last_activity() < Duration::from_millis(30));
}

#[tokio::test]
async fn test_connection_over_tcp() {
    use peer_protocol::config::NetworkConfig;
    use tokio::net::TcpListener;

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut conn = Connection::new(stream);
        let packet = conn.recv().await.unwrap();
        conn.send(Packet::ok(packet.data.message.payload().to_vec()))
            .await
            .unwrap();
    });

    let config = NetworkConfig::default_with_overrides(|c| c.client.address = addr.to_string());
    let mut client = Connection::connect(&config).await.unwrap();
    client.send(Packet::handshake(&b"echo"[..])).await.unwrap();

    let reply = client.recv().await.unwrap();
    assert_eq!(reply.message_type(), MessageType::Ok);
    assert_eq!(reply.data.message.payload(), b"echo");

    server.await.unwrap();
}

#[tokio::test]
async fn test_into_inner_returns_raw_stream() {
    let (a, b) = duplex(1024);
    let mut framed = Connection::new(b);

    let mut raw = Connection::new(a).into_inner();
    raw.write_all(&[0x00, 0x04, 0x01, 0x01, b'A', b'C', b'K'])
        .await
        .unwrap();

    let packet = framed.recv().await.unwrap();
    assert_eq!(packet.message_type(), MessageType::Ok);
    assert_eq!(packet.data.message.payload(), b"ACK");
}

#[tokio::test]
async fn test_from_config_reads_large_packet_with_small_buffer() {
    use peer_protocol::config::NetworkConfig;

    let (a, b) = duplex(64 * 1024);
    let config = NetworkConfig::default_with_overrides(|c| c.transport.read_buffer_size = 8);
    let mut sender = Connection::from_config(a, &config);
    let mut receiver = Connection::from_config(b, &config);

    let packet = Packet::with_vector(MessageType::Transfer, Vector::new([3; 16]), vec![9u8; 4000]);
    sender.send(packet.clone()).await.unwrap();
    assert_eq!(receiver.recv().await.unwrap(), packet);
}
