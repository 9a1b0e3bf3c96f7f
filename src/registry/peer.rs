//! Peer and location types
//!
//! - `Location`: a validated latitude/longitude pair
//! - `Peer`: one connected client and its last-known location

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::error::{RegistryError, RegistryResult};

/// Unique identifier for a connected peer
pub type PeerId = String;

/// Valid latitude range in degrees
pub const LATITUDE_RANGE: std::ops::RangeInclusive<f64> = -90.0..=90.0;

/// Valid longitude range in degrees
pub const LONGITUDE_RANGE: std::ops::RangeInclusive<f64> = -180.0..=180.0;

/// A geographic position in decimal degrees
///
/// Can only be constructed through [`Location::new`], so every value held by
/// the registry is known to be in range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    /// Validate and build a location
    ///
    /// NaN and infinities fail the range checks as well.
    pub fn new(latitude: f64, longitude: f64) -> RegistryResult<Self> {
        if LATITUDE_RANGE.contains(&latitude) && LONGITUDE_RANGE.contains(&longitude) {
            Ok(Self {
                latitude,
                longitude,
            })
        } else {
            Err(RegistryError::InvalidCoordinate {
                latitude,
                longitude,
            })
        }
    }
}

/// One connected client
#[derive(Debug, Clone, PartialEq)]
pub struct Peer {
    /// Connection id, stable for the lifetime of the connection
    pub id: PeerId,
    /// Last accepted location; `None` until the first valid update
    pub location: Option<Location>,
    /// When the connection was registered
    pub connected_at: DateTime<Utc>,
}

impl Peer {
    /// Create a peer with no location, stamped with the current time
    pub fn new(id: impl Into<PeerId>) -> Self {
        Self {
            id: id.into(),
            location: None,
            connected_at: Utc::now(),
        }
    }

    /// Whether this peer has reported a location yet
    pub fn is_located(&self) -> bool {
        self.location.is_some()
    }
}
