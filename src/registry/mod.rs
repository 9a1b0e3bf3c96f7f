//! Session Registry
//!
//! In-memory table of who is online and where they last reported being.
//!
//! - **peer**: `Peer` and validated `Location` types
//! - **session**: `SessionRegistry`, the single lock-guarded peer table
//! - **error**: Error types
//!
//! The registry is owned by the [`EventRouter`](crate::router::EventRouter)
//! and is the only place that knows which peers are connected.

pub mod error;
pub mod peer;
pub mod session;

pub use error::{RegistryError, RegistryResult};
pub use peer::{Location, Peer, PeerId, LATITUDE_RANGE, LONGITUDE_RANGE};
pub use session::{RegistryConfig, SessionRegistry};
