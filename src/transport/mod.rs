//! Transport Layer
//!
//! The outbound half of a peer connection as seen by the
//! [`EventRouter`](crate::router::EventRouter). Implementations deliver a
//! [`ServerEvent`] to one peer without blocking; a failed delivery is counted
//! and skipped, never retried.
//!
//! - [`Transport`]: the send primitives the router depends on
//! - [`ChannelTransport`]: bounded per-peer outboxes drained by WebSocket writer tasks

mod channel;

pub use channel::ChannelTransport;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::registry::PeerId;
use crate::websocket::ServerEvent;

/// Outcome of delivering one event to a set of targets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FanOut {
    /// Targets whose outbox accepted the event
    pub delivered: usize,
    /// Targets the event could not be handed to
    pub dropped: usize,
}

impl FanOut {
    /// Total number of delivery attempts
    pub fn attempted(&self) -> usize {
        self.delivered + self.dropped
    }
}

/// Send primitives consumed by the event router
#[async_trait]
pub trait Transport: Send + Sync {
    /// Hand `event` to a single peer's connection
    ///
    /// Must not block on a slow peer.
    async fn emit_to_one(&self, peer_id: &str, event: &ServerEvent) -> Result<(), TransportError>;

    /// Hand `event` to each target exactly once
    ///
    /// Failures are isolated to their target and do not stop delivery to the rest.
    async fn emit_to_many(&self, targets: &[PeerId], event: &ServerEvent) -> FanOut {
        let mut fan_out = FanOut::default();

        for peer_id in targets {
            match self.emit_to_one(peer_id, event).await {
                Ok(()) => fan_out.delivered += 1,
                Err(e) => {
                    tracing::debug!(
                        peer_id = %peer_id,
                        event = event.name(),
                        error = %e,
                        "Dropped delivery"
                    );
                    fan_out.dropped += 1;
                }
            }
        }

        fan_out
    }
}

/// Errors delivering to a single peer
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("No outbox attached for peer {0}")]
    NotAttached(PeerId),

    #[error("Outbox already attached for peer {0}")]
    AlreadyAttached(PeerId),

    #[error("Outbox full for peer {0}")]
    Backpressure(PeerId),

    #[error("Connection closed for peer {0}")]
    Closed(PeerId),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Fails for one specific peer, succeeds for everyone else
    struct FlakyTransport {
        broken: String,
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Transport for FlakyTransport {
        async fn emit_to_one(
            &self,
            peer_id: &str,
            _event: &ServerEvent,
        ) -> Result<(), TransportError> {
            self.seen.lock().unwrap().push(peer_id.to_string());
            if peer_id == self.broken {
                Err(TransportError::Closed(peer_id.to_string()))
            } else {
                Ok(())
            }
        }
    }

    #[tokio::test]
    async fn test_emit_to_many_continues_past_failure() {
        let transport = FlakyTransport {
            broken: "b".to_string(),
            seen: Mutex::new(Vec::new()),
        };
        let targets: Vec<PeerId> = vec!["a".into(), "b".into(), "c".into()];
        let event = ServerEvent::UserDisconnected("z".to_string());

        let fan_out = transport.emit_to_many(&targets, &event).await;

        assert_eq!(fan_out, FanOut { delivered: 2, dropped: 1 });
        assert_eq!(fan_out.attempted(), 3);
        assert_eq!(*transport.seen.lock().unwrap(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_emit_to_many_empty_targets() {
        let transport = FlakyTransport {
            broken: String::new(),
            seen: Mutex::new(Vec::new()),
        };
        let event = ServerEvent::UserDisconnected("z".to_string());

        let fan_out = transport.emit_to_many(&[], &event).await;
        assert_eq!(fan_out.attempted(), 0);
    }
}
