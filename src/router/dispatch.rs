//! Event Router
//!
//! Turns connection lifecycle signals and inbound location events into
//! registry mutations and outbound fan-out.
//!
//! Each mutation and its fan-out run under a single ordering guard, so every
//! peer observes events in the same order the registry applied them. In
//! particular no peer ever receives a `receive-location` for a peer after
//! that peer's `user-disconnected`. The registry lock itself is released
//! before any send, and sends are non-blocking hand-offs to the transport.

use std::sync::Arc;
use tokio::sync::Mutex;

use super::stats::{RelayStats, RelayStatsSnapshot};
use crate::registry::{Peer, RegistryResult, SessionRegistry};
use crate::transport::{FanOut, Transport};
use crate::websocket::ServerEvent;

/// Event router configuration
#[derive(Debug, Clone, Default)]
pub struct RouterConfig {
    /// Replay known peer locations to a peer as soon as it connects
    pub initial_sync: bool,
}

/// Routes peer events between the session registry and the transport
pub struct EventRouter {
    registry: Arc<SessionRegistry>,
    transport: Arc<dyn Transport>,
    stats: RelayStats,
    ordering: Mutex<()>,
    config: RouterConfig,
}

impl EventRouter {
    /// Create a router over an injected registry and transport
    pub fn new(
        registry: Arc<SessionRegistry>,
        transport: Arc<dyn Transport>,
        config: RouterConfig,
    ) -> Self {
        Self {
            registry,
            transport,
            stats: RelayStats::default(),
            ordering: Mutex::new(()),
            config,
        }
    }

    /// A new peer connected
    ///
    /// Nothing is broadcast: a peer without a location stays invisible to
    /// others. The peer itself is told its id, and optionally receives the
    /// current locations of everyone else.
    pub async fn on_connect(&self, id: &str) -> RegistryResult<Peer> {
        let _order = self.ordering.lock().await;

        let peer = self.registry.add(id).await?;
        self.stats.record_connect();
        tracing::info!(peer_id = %id, "Peer connected");

        let welcome = ServerEvent::Connected { id: id.to_string() };
        if let Err(e) = self.transport.emit_to_one(id, &welcome).await {
            tracing::debug!(peer_id = %id, error = %e, "Failed to send welcome");
        }

        if self.config.initial_sync {
            let synced = self.sync_new_peer(id).await;
            self.stats.record_fan_out(synced);
            tracing::debug!(
                peer_id = %id,
                delivered = synced.delivered,
                dropped = synced.dropped,
                "Initial sync sent"
            );
        }

        Ok(peer)
    }

    /// A peer reported its position
    ///
    /// On success every other connected peer is sent one `receive-location`.
    /// Rejected updates (bad coordinates, peer already gone) broadcast nothing
    /// and are returned so the caller can log them.
    pub async fn on_location_update(
        &self,
        id: &str,
        latitude: f64,
        longitude: f64,
    ) -> RegistryResult<FanOut> {
        let _order = self.ordering.lock().await;

        let location = match self.registry.set_location(id, latitude, longitude).await {
            Ok(location) => location,
            Err(e) => {
                self.stats.record_rejected();
                return Err(e);
            }
        };
        self.stats.record_accepted();

        let targets = self.registry.all_except(id).await;
        let event = ServerEvent::receive_location(id, location);
        let fan_out = self.transport.emit_to_many(&targets, &event).await;
        self.stats.record_fan_out(fan_out);

        tracing::trace!(
            peer_id = %id,
            targets = targets.len(),
            delivered = fan_out.delivered,
            dropped = fan_out.dropped,
            "Broadcast location"
        );

        Ok(fan_out)
    }

    /// A peer's connection closed, for whatever reason
    ///
    /// Idempotent: returns `None` without broadcasting if the peer was
    /// already removed.
    pub async fn on_disconnect(&self, id: &str) -> Option<FanOut> {
        let _order = self.ordering.lock().await;

        self.registry.remove(id).await?;
        self.stats.record_disconnect();

        let targets = self.registry.all().await;
        let event = ServerEvent::UserDisconnected(id.to_string());
        let fan_out = self.transport.emit_to_many(&targets, &event).await;
        self.stats.record_fan_out(fan_out);

        tracing::info!(
            peer_id = %id,
            notified = fan_out.delivered,
            dropped = fan_out.dropped,
            "Peer disconnected"
        );

        Some(fan_out)
    }

    /// The registry this router owns
    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    /// Current relay counters
    pub fn stats(&self) -> RelayStatsSnapshot {
        self.stats.snapshot()
    }

    async fn sync_new_peer(&self, id: &str) -> FanOut {
        let mut fan_out = FanOut::default();

        for peer in self.registry.snapshot().await {
            let Some(location) = peer.location else {
                continue;
            };
            if peer.id == id {
                continue;
            }

            let event = ServerEvent::receive_location(&peer.id, location);
            match self.transport.emit_to_one(id, &event).await {
                Ok(()) => fan_out.delivered += 1,
                Err(_) => fan_out.dropped += 1,
            }
        }

        fan_out
    }
}
