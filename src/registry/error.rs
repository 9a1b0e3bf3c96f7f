//! Session registry error types
//!
//! Every variant is scoped to a single peer. None of them should ever abort
//! processing for other peers.

use thiserror::Error;

use super::peer::PeerId;

/// Errors that can occur while mutating the session registry
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    /// Coordinates outside [-90, 90] x [-180, 180] (or not finite)
    #[error("Invalid coordinate: latitude={latitude}, longitude={longitude}")]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    /// Peer disconnected between sending an event and it being processed
    #[error("Unknown peer: {0}")]
    UnknownPeer(PeerId),

    /// An id was registered twice; the id generator or transport is broken
    #[error("Duplicate peer id: {0}")]
    DuplicateId(PeerId),

    /// Peer capacity reached
    #[error("Registry full (limit: {0})")]
    RegistryFull(usize),
}

/// Result type alias for registry operations
pub type RegistryResult<T> = Result<T, RegistryError>;
