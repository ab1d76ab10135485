//! # Core Protocol Components
//!
//! Low-level packet layout, length accounting and the byte codec.
//!
//! ## Components
//! - **Header**: fixed 3-byte prefix (body length + version)
//! - **Body**: type tag, optional 16-byte vector, message payload
//! - **Packet**: header + body
//! - **Codec**: `encode`/`decode` plus a Tokio codec for framed streams
//!
//! ## Wire Format
//! ```text
//! [Length(2)] [Version(1)] [Type(1)] [Vector(16)?] [Message(N)]
//! ```
//!
//! All integers are big-endian. `Length` counts everything after the header.
//! The vector is present for every type except Handshake and Ok.

pub mod body;
pub mod codec;
pub mod header;
pub mod packet;
