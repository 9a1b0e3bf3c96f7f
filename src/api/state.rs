//! Application State
//!
//! Shared state accessible by all handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use std::sync::Arc;
use std::time::Instant;

use crate::config::RelayConfig;
use crate::registry::{RegistryConfig, SessionRegistry};
use crate::router::{EventRouter, RouterConfig};
use crate::transport::ChannelTransport;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Event router owning the session registry
    pub router: Arc<EventRouter>,
    /// Per-peer outboxes the router delivers into
    pub transport: Arc<ChannelTransport>,
    /// Relay tuning shared by connection handlers
    pub relay: Arc<RelayConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    /// Wire up a fresh registry, transport and router
    pub fn new(relay: RelayConfig) -> Self {
        let registry = Arc::new(SessionRegistry::new(RegistryConfig {
            max_peers: relay.max_peers,
        }));
        let transport = Arc::new(ChannelTransport::new());
        let router = Arc::new(EventRouter::new(
            registry,
            transport.clone(),
            RouterConfig {
                initial_sync: relay.initial_sync,
            },
        ));

        Self {
            router,
            transport,
            relay: Arc::new(relay),
            start_time: Instant::now(),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Get connected peer count
    pub async fn peer_count(&self) -> usize {
        self.router.registry().len().await
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(RelayConfig::default())
    }
}
