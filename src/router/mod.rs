//! Event Router
//!
//! One operation per inbound signal:
//!
//! - `on_connect` registers a peer (no broadcast)
//! - `on_location_update` validates, stores and fans out to everyone else
//! - `on_disconnect` removes the peer and tells everyone left
//!
//! ## Architecture
//!
//! ```text
//! WebSocket reader ──► EventRouter ──► SessionRegistry (single lock)
//!                           │
//!                           └──► Transport::emit_to_many ──► per-peer outboxes
//! ```

mod dispatch;
mod stats;

pub use dispatch::{EventRouter, RouterConfig};
pub use stats::{RelayStats, RelayStatsSnapshot};
