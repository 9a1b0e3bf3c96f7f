//! Data Transfer Objects
//!
//! Response types for the HTTP endpoints, serialized to JSON.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::registry::{Location, Peer};
use crate::router::RelayStatsSnapshot;

/// One connected peer
#[derive(Debug, Serialize)]
pub struct PeerResponse {
    pub id: String,
    /// Absent until the peer reports its first valid location
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    pub connected_at: DateTime<Utc>,
}

impl From<Peer> for PeerResponse {
    fn from(peer: Peer) -> Self {
        Self {
            id: peer.id,
            location: peer.location,
            connected_at: peer.connected_at,
        }
    }
}

/// Registry snapshot
#[derive(Debug, Serialize)]
pub struct PeerListResponse {
    pub peers: Vec<PeerResponse>,
    pub total: usize,
    /// How many of `peers` have a location
    pub located: usize,
}

/// Full health status
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall status: healthy, saturated
    pub status: String,
    /// Connected peers
    pub peers: usize,
    /// Configured peer capacity
    pub capacity: usize,
    /// Relay counters since start
    pub relay: RelayStatsSnapshot,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    /// Application version
    pub version: String,
}
