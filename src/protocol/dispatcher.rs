use crate::core::packet::Packet;
use crate::error::constants::{ERR_DISPATCHER_READ_LOCK, ERR_DISPATCHER_WRITE_LOCK};
use crate::error::{ProtocolError, Result};
use crate::protocol::message_type::MessageType;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::debug;

/// A handler may answer with a packet or consume the input silently.
type HandlerFn = dyn Fn(&Packet) -> Result<Option<Packet>> + Send + Sync + 'static;

/// Routes decoded packets to the handler registered for their message type.
///
/// Cloning shares the handler table.
#[derive(Clone)]
pub struct Dispatcher {
    handlers: Arc<RwLock<HashMap<MessageType, Box<HandlerFn>>>>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Register `handler` for `message_type`, replacing any previous one
    pub fn register<F>(&self, message_type: MessageType, handler: F) -> Result<()>
    where
        F: Fn(&Packet) -> Result<Option<Packet>> + Send + Sync + 'static,
    {
        let mut handlers = self
            .handlers
            .write()
            .map_err(|_| ProtocolError::Custom(ERR_DISPATCHER_WRITE_LOCK.to_string()))?;

        handlers.insert(message_type, Box::new(handler));
        Ok(())
    }

    pub fn is_registered(&self, message_type: MessageType) -> bool {
        self.handlers
            .read()
            .map(|handlers| handlers.contains_key(&message_type))
            .unwrap_or(false)
    }

    pub fn dispatch(&self, packet: &Packet) -> Result<Option<Packet>> {
        let message_type = packet.message_type();

        let handlers = self
            .handlers
            .read()
            .map_err(|_| ProtocolError::Custom(ERR_DISPATCHER_READ_LOCK.to_string()))?;

        debug!(message_type = %message_type, "Dispatching packet");

        handlers
            .get(&message_type)
            .ok_or(ProtocolError::UnexpectedMessage(message_type))
            .and_then(|handler| handler(packet))
    }
}
