//! # Meridian
//!
//! Real-time location-sharing relay. Clients report their position over a
//! WebSocket and the server fans each update out to every other connected
//! client, so each can keep a live map of its peers.
//!
//! ## Features
//!
//! - **Join/update/leave semantics**: a peer appears to others only after its
//!   first valid location, and disappears the moment its connection closes
//! - **Sender exclusion**: location broadcasts never echo back to the sender
//! - **Slow-peer isolation**: bounded per-peer outboxes, dropped deliveries
//!   are counted rather than stalling anyone else
//!
//! ## Modules
//!
//! - [`registry`]: Session Registry, who is online and where
//! - [`router`]: Event Router, registry mutation and fan-out
//! - [`transport`]: Outbound delivery to individual peers
//! - [`websocket`]: Wire format and connection handling
//! - [`api`]: HTTP server with Axum
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use meridian::{EventRouter, RouterConfig, SessionRegistry, ChannelTransport};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let registry = Arc::new(SessionRegistry::default());
//!     let transport = Arc::new(ChannelTransport::new());
//!     let router = EventRouter::new(registry, transport, RouterConfig::default());
//!
//!     router.on_connect("a").await.unwrap();
//!     router.on_connect("b").await.unwrap();
//!
//!     // "b" is sent one receive-location; "a" is sent nothing
//!     let fan_out = router.on_location_update("a", 40.0, -73.0).await.unwrap();
//!     println!("delivered to {} peers", fan_out.delivered);
//!
//!     router.on_disconnect("a").await;
//! }
//! ```

pub mod api;
pub mod config;
pub mod registry;
pub mod router;
pub mod transport;
pub mod websocket;

// Re-export top-level types for convenience
pub use registry::{Location, Peer, PeerId, RegistryError, RegistryResult, SessionRegistry};

pub use router::{EventRouter, RelayStatsSnapshot, RouterConfig};

pub use transport::{ChannelTransport, FanOut, Transport, TransportError};

pub use websocket::{websocket_handler, ClientEvent, ServerEvent};

pub use api::{build_router, serve, ApiError, AppState};

pub use config::{Config, ConfigError, LoggingConfig, RelayConfig, ServerConfig};
