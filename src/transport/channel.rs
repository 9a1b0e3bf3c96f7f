//! Channel-backed transport
//!
//! Each connected peer owns a bounded `mpsc` outbox. The WebSocket writer
//! task drains it onto the socket; everything else only ever `try_send`s
//! into it, so a stalled client fills its own outbox and nothing else.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::RwLock;

use super::{Transport, TransportError};
use crate::registry::PeerId;
use crate::websocket::ServerEvent;

/// Per-peer outboxes keyed by peer id
#[derive(Default)]
pub struct ChannelTransport {
    outboxes: RwLock<HashMap<PeerId, mpsc::Sender<ServerEvent>>>,
}

impl ChannelTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a peer's outbox
    ///
    /// Refuses to replace an existing outbox so a colliding id can never
    /// hijack another peer's connection.
    pub async fn attach(
        &self,
        peer_id: &str,
        sender: mpsc::Sender<ServerEvent>,
    ) -> Result<(), TransportError> {
        let mut outboxes = self.outboxes.write().await;
        if outboxes.contains_key(peer_id) {
            return Err(TransportError::AlreadyAttached(peer_id.to_string()));
        }
        outboxes.insert(peer_id.to_string(), sender);
        Ok(())
    }

    /// Detach a peer's outbox, returning whether one was attached
    pub async fn detach(&self, peer_id: &str) -> bool {
        self.outboxes.write().await.remove(peer_id).is_some()
    }

    /// Number of attached outboxes
    pub async fn attached_count(&self) -> usize {
        self.outboxes.read().await.len()
    }
}

#[async_trait]
impl Transport for ChannelTransport {
    async fn emit_to_one(&self, peer_id: &str, event: &ServerEvent) -> Result<(), TransportError> {
        let outboxes = self.outboxes.read().await;
        let sender = outboxes
            .get(peer_id)
            .ok_or_else(|| TransportError::NotAttached(peer_id.to_string()))?;

        sender.try_send(event.clone()).map_err(|e| match e {
            TrySendError::Full(_) => TransportError::Backpressure(peer_id.to_string()),
            TrySendError::Closed(_) => TransportError::Closed(peer_id.to_string()),
        })
    }
}
