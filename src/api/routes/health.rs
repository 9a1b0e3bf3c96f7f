//! Health Routes
//!
//! Health check endpoints for monitoring and Kubernetes probes.
//!
//! - GET /health/live - Liveness probe (process is alive)
//! - GET /health/ready - Readiness probe (accepting new peers)
//! - GET /health - Full health status

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::api::dto::HealthResponse;
use crate::api::state::AppState;

/// GET /health/live
///
/// Kubernetes liveness probe.
/// Returns 200 if the process is alive, no dependency checks.
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// GET /health/ready
///
/// Kubernetes readiness probe.
/// Returns 503 once the registry is at capacity, since new connections
/// would be refused.
pub async fn readiness(State(state): State<Arc<AppState>>) -> StatusCode {
    if has_capacity(&state).await {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// GET /health
///
/// Full health status with relay counters.
pub async fn full_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let status = if has_capacity(&state).await {
        "healthy"
    } else {
        "saturated"
    };

    Json(HealthResponse {
        status: status.to_string(),
        peers: state.peer_count().await,
        capacity: state.router.registry().capacity(),
        relay: state.router.stats(),
        uptime_seconds: state.uptime_seconds(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn has_capacity(state: &AppState) -> bool {
    state.peer_count().await < state.router.registry().capacity()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RelayConfig;

    #[tokio::test]
    async fn test_liveness() {
        let status = liveness().await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_readiness_reports_saturation() {
        let state = Arc::new(AppState::new(RelayConfig {
            max_peers: 1,
            ..Default::default()
        }));
        assert_eq!(readiness(State(state.clone())).await, StatusCode::OK);

        state.router.on_connect("a").await.unwrap();
        assert_eq!(
            readiness(State(state.clone())).await,
            StatusCode::SERVICE_UNAVAILABLE
        );

        let Json(health) = full_health(State(state)).await;
        assert_eq!(health.status, "saturated");
        assert_eq!(health.peers, 1);
        assert_eq!(health.relay.connects, 1);
    }
}
