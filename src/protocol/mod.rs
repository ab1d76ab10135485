//! # Protocol Layer
//!
//! Message types, payload variants and type-driven dispatch.
//!
//! - [`message_type`]: the wire tag registry
//! - [`message`]: payload variants and their decode rules
//! - [`dispatcher`]: routes decoded packets to per-type handlers

pub mod dispatcher;
pub mod message;
pub mod message_type;
