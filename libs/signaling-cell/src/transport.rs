// libs/signaling-cell/src/transport.rs
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use crate::models::{ConnectionId, ServerEvent};
use crate::services::OutboundSink;

/// Table of live per-connection senders. The WebSocket handler registers a
/// sender at upgrade time and removes it when the socket goes away; the
/// dispatcher delivers through it.
///
/// Delivery is fire-and-forget: a send to a connection whose writer task
/// has already exited is dropped without error or retry.
#[derive(Debug, Clone, Default)]
pub struct ClientSinks {
    inner: Arc<Mutex<HashMap<ConnectionId, UnboundedSender<ServerEvent>>>>,
}

impl ClientSinks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, connection_id: ConnectionId, sender: UnboundedSender<ServerEvent>) {
        self.inner.lock().unwrap().insert(connection_id, sender);
    }

    pub fn unregister(&self, connection_id: ConnectionId) {
        self.inner.lock().unwrap().remove(&connection_id);
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl OutboundSink for ClientSinks {
    fn deliver(&mut self, target: ConnectionId, event: ServerEvent) {
        let sinks = self.inner.lock().unwrap();
        match sinks.get(&target) {
            Some(sender) => {
                if sender.send(event).is_err() {
                    debug!("Connection {} writer is gone, dropping event", target);
                }
            }
            None => debug!("No live sink for connection {}, dropping event", target),
        }
    }
}
