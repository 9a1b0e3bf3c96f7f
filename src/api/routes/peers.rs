//! Peer Routes
//!
//! Read-only view of the session registry.
//!
//! - GET /api/v1/peers - Snapshot of every connected peer
//! - GET /api/v1/peers/:id - A single peer

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::api::dto::{PeerListResponse, PeerResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;

/// GET /api/v1/peers
pub async fn list_peers(State(state): State<Arc<AppState>>) -> Json<PeerListResponse> {
    let mut peers = state.router.registry().snapshot().await;
    peers.sort_by(|a, b| a.connected_at.cmp(&b.connected_at));

    let located = peers.iter().filter(|p| p.is_located()).count();
    let peers: Vec<PeerResponse> = peers.into_iter().map(PeerResponse::from).collect();

    Json(PeerListResponse {
        total: peers.len(),
        located,
        peers,
    })
}

/// GET /api/v1/peers/:id
pub async fn get_peer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<PeerResponse>> {
    let peer = state
        .router
        .registry()
        .get(&id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("Peer {} not connected", id)))?;

    Ok(Json(peer.into()))
}
