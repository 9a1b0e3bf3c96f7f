//! Relay counters
//!
//! Tracked with atomics so the broadcast path never takes a lock for
//! bookkeeping. Read through [`RelayStats::snapshot`].

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::transport::FanOut;

/// Live counters owned by the event router
#[derive(Debug, Default)]
pub struct RelayStats {
    connects: AtomicU64,
    disconnects: AtomicU64,
    updates_accepted: AtomicU64,
    updates_rejected: AtomicU64,
    deliveries: AtomicU64,
    dropped_deliveries: AtomicU64,
}

/// Point-in-time copy of [`RelayStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RelayStatsSnapshot {
    pub connects: u64,
    pub disconnects: u64,
    pub updates_accepted: u64,
    pub updates_rejected: u64,
    pub deliveries: u64,
    pub dropped_deliveries: u64,
}

impl RelayStats {
    pub fn record_connect(&self) {
        self.connects.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_disconnect(&self) {
        self.disconnects.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_accepted(&self) {
        self.updates_accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rejected(&self) {
        self.updates_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fan_out(&self, fan_out: FanOut) {
        self.deliveries
            .fetch_add(fan_out.delivered as u64, Ordering::Relaxed);
        self.dropped_deliveries
            .fetch_add(fan_out.dropped as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> RelayStatsSnapshot {
        RelayStatsSnapshot {
            connects: self.connects.load(Ordering::Relaxed),
            disconnects: self.disconnects.load(Ordering::Relaxed),
            updates_accepted: self.updates_accepted.load(Ordering::Relaxed),
            updates_rejected: self.updates_rejected.load(Ordering::Relaxed),
            deliveries: self.deliveries.load(Ordering::Relaxed),
            dropped_deliveries: self.dropped_deliveries.load(Ordering::Relaxed),
        }
    }
}
