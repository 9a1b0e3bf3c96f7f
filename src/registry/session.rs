//! Session Registry
//!
//! The authoritative table of connected peers and their last-known
//! locations. All state sits behind a single lock so that `add`, `remove`,
//! `set_location` and target collection never observe a torn intermediate
//! state. Callers collect fan-out targets here, release the lock, and only
//! then perform network sends.

use std::collections::HashMap;
use tokio::sync::RwLock;

use super::error::{RegistryError, RegistryResult};
use super::peer::{Location, Peer, PeerId};

/// Registry configuration
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Maximum number of concurrently registered peers
    pub max_peers: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self { max_peers: 10_000 }
    }
}

/// Connected peers keyed by id
pub struct SessionRegistry {
    peers: RwLock<HashMap<PeerId, Peer>>,
    config: RegistryConfig,
}

impl SessionRegistry {
    /// Create an empty registry
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            peers: RwLock::new(HashMap::new()),
            config,
        }
    }

    /// Register a new peer with no location
    pub async fn add(&self, id: &str) -> RegistryResult<Peer> {
        let mut peers = self.peers.write().await;

        if peers.contains_key(id) {
            return Err(RegistryError::DuplicateId(id.to_string()));
        }
        if peers.len() >= self.config.max_peers {
            return Err(RegistryError::RegistryFull(self.config.max_peers));
        }

        let peer = Peer::new(id);
        peers.insert(peer.id.clone(), peer.clone());
        Ok(peer)
    }

    /// Remove a peer, returning it if it was present
    ///
    /// Absent ids are not an error: disconnect handling may race with cleanup.
    pub async fn remove(&self, id: &str) -> Option<Peer> {
        self.peers.write().await.remove(id)
    }

    /// Record a new location for a registered peer
    ///
    /// Coordinates are validated before the lock is taken; a rejected update
    /// leaves the previous location untouched.
    pub async fn set_location(
        &self,
        id: &str,
        latitude: f64,
        longitude: f64,
    ) -> RegistryResult<Location> {
        let location = Location::new(latitude, longitude)?;

        let mut peers = self.peers.write().await;
        let peer = peers
            .get_mut(id)
            .ok_or_else(|| RegistryError::UnknownPeer(id.to_string()))?;
        peer.location = Some(location);

        Ok(location)
    }

    /// Point-in-time copy of every peer
    pub async fn snapshot(&self) -> Vec<Peer> {
        self.peers.read().await.values().cloned().collect()
    }

    /// Ids of every connected peer
    pub async fn all(&self) -> Vec<PeerId> {
        self.peers.read().await.keys().cloned().collect()
    }

    /// Ids of every connected peer other than `id`
    pub async fn all_except(&self, id: &str) -> Vec<PeerId> {
        self.peers
            .read()
            .await
            .keys()
            .filter(|peer_id| peer_id.as_str() != id)
            .cloned()
            .collect()
    }

    /// Look up a single peer
    pub async fn get(&self, id: &str) -> Option<Peer> {
        self.peers.read().await.get(id).cloned()
    }

    /// Whether `id` is currently registered
    pub async fn contains(&self, id: &str) -> bool {
        self.peers.read().await.contains_key(id)
    }

    /// Number of connected peers
    pub async fn len(&self) -> usize {
        self.peers.read().await.len()
    }

    /// Whether no peers are connected
    pub async fn is_empty(&self) -> bool {
        self.peers.read().await.is_empty()
    }

    /// Configured peer capacity
    pub fn capacity(&self) -> usize {
        self.config.max_peers
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new(RegistryConfig::default())
    }
}
