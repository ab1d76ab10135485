//! # Header
//!
//! Fixed 3-byte packet prefix.
//!
//! ```text
//! [Length(2, BE)] [Version(1)]
//! ```
//!
//! `length` counts the body only, never the header itself.

use bytes::{Buf, BufMut, BytesMut};

use crate::config::{HEADER_LEN, PROTOCOL_VERSION};
use crate::error::{ProtocolError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Byte count of the body that follows
    pub length: u16,
    /// Sender's protocol version
    pub version: u8,
}

impl Header {
    pub const LEN: usize = HEADER_LEN;

    /// Header for a body of `length` bytes at the current protocol version
    pub fn new(length: u16) -> Self {
        Self {
            length,
            version: PROTOCOL_VERSION,
        }
    }

    pub fn write_to(&self, buf: &mut BytesMut) {
        buf.put_u16(self.length);
        buf.put_u8(self.version);
    }

    /// Read both header fields, reporting which one was truncated
    pub fn read_from<B: Buf>(buf: &mut B) -> Result<Self> {
        if buf.remaining() < 2 {
            return Err(ProtocolError::UnreadableLength);
        }
        let length = buf.get_u16();

        if buf.remaining() < 1 {
            return Err(ProtocolError::UnreadableVersion);
        }
        let version = buf.get_u8();

        Ok(Self { length, version })
    }
}

impl Default for Header {
    fn default() -> Self {
        Self::new(0)
    }
}
