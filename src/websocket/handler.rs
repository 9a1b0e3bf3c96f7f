//! WebSocket Handler
//!
//! Handles WebSocket upgrade requests and drives one peer's connection
//! lifecycle: connect, inbound location events, keepalive and disconnect.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{stream::SplitStream, Sink, SinkExt, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::messages::{ClientEvent, ServerEvent};
use crate::api::AppState;
use crate::config::RelayConfig;
use crate::registry::RegistryError;
use crate::router::EventRouter;

/// WebSocket upgrade handler
///
/// This is the entry point for peer connections.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle an established WebSocket connection
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, receiver) = socket.split();
    let peer_id = Uuid::new_v4().to_string();
    let relay = Arc::clone(&state.relay);

    // Outbox must exist before the router can address this peer;
    // mpsc::channel panics on a zero capacity
    let (tx, rx) = mpsc::channel::<ServerEvent>(relay.outbox_capacity.max(1));
    if let Err(e) = state.transport.attach(&peer_id, tx).await {
        tracing::error!(peer_id = %peer_id, error = %e, "Failed to attach outbox");
        let _ = sender.send(Message::Close(None)).await;
        return;
    }

    if let Err(e) = state.router.on_connect(&peer_id).await {
        match e {
            RegistryError::RegistryFull(_) => {
                tracing::warn!(peer_id = %peer_id, error = %e, "Connection refused")
            }
            _ => tracing::error!(peer_id = %peer_id, error = %e, "Connection refused"),
        }
        state.transport.detach(&peer_id).await;
        let _ = sender.send(Message::Close(None)).await;
        return;
    }

    let mut send_task = tokio::spawn(write_loop(
        sender,
        rx,
        peer_id.clone(),
        Arc::clone(&relay),
    ));
    let mut recv_task = tokio::spawn(read_loop(
        receiver,
        Arc::clone(&state.router),
        peer_id.clone(),
        relay,
    ));

    // Wait for either half to finish
    tokio::select! {
        _ = &mut send_task => {
            recv_task.abort();
        }
        _ = &mut recv_task => {
            send_task.abort();
        }
    }

    state.transport.detach(&peer_id).await;
    state.router.on_disconnect(&peer_id).await;
}

/// Drain the outbox onto the socket and keep the connection alive with pings
async fn write_loop<S>(
    mut sender: S,
    mut outbox: mpsc::Receiver<ServerEvent>,
    peer_id: String,
    relay: Arc<RelayConfig>,
) where
    S: Sink<Message> + Unpin,
{
    let write_timeout = relay.write_timeout();
    let mut heartbeat = tokio::time::interval(relay.heartbeat_interval());
    // First tick completes immediately
    heartbeat.tick().await;

    loop {
        let message = tokio::select! {
            event = outbox.recv() => match event {
                Some(event) => match serde_json::to_string(&event) {
                    Ok(text) => Message::Text(text),
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to serialize event");
                        continue;
                    }
                },
                None => break,
            },
            _ = heartbeat.tick() => Message::Ping(Vec::new()),
        };

        if let Err(reason) = write_bounded(&mut sender, message, write_timeout).await {
            tracing::debug!(
                peer_id = %peer_id,
                reason,
                "WebSocket write failed, closing connection"
            );
            break;
        }
    }
}

/// Write one frame, giving up once `limit` passes
async fn write_bounded<S>(
    sender: &mut S,
    message: Message,
    limit: Duration,
) -> Result<(), &'static str>
where
    S: Sink<Message> + Unpin,
{
    match tokio::time::timeout(limit, sender.send(message)).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(_)) => Err("send error"),
        Err(_) => Err("write timed out"),
    }
}

/// Read frames until the peer closes, errors, or goes silent
async fn read_loop(
    mut receiver: SplitStream<WebSocket>,
    router: Arc<EventRouter>,
    peer_id: String,
    relay: Arc<RelayConfig>,
) {
    let idle_limit = relay.client_timeout();

    loop {
        let frame = match tokio::time::timeout(idle_limit, receiver.next()).await {
            Ok(Some(Ok(frame))) => frame,
            Ok(Some(Err(e))) => {
                tracing::debug!(peer_id = %peer_id, error = %e, "WebSocket receive error");
                break;
            }
            Ok(None) => break,
            Err(_) => {
                tracing::debug!(peer_id = %peer_id, "Peer timed out");
                break;
            }
        };

        if !handle_ws_message(&router, &peer_id, frame).await {
            break;
        }
    }
}

/// Handle a received WebSocket frame
///
/// Returns false if the connection should be closed.
async fn handle_ws_message(router: &EventRouter, peer_id: &str, message: Message) -> bool {
    match message {
        Message::Text(text) => {
            match serde_json::from_str::<ClientEvent>(&text) {
                Ok(event) => handle_client_event(router, peer_id, event).await,
                Err(e) => {
                    tracing::debug!(
                        peer_id = %peer_id,
                        error = %e,
                        text = %text,
                        "Ignoring malformed client event"
                    );
                }
            }
            true
        }
        Message::Binary(_) => {
            tracing::debug!(peer_id = %peer_id, "Ignoring binary frame");
            true
        }
        // Axum answers pings; any pong proves liveness via the idle timer
        Message::Ping(_) | Message::Pong(_) => true,
        Message::Close(_) => {
            tracing::debug!(peer_id = %peer_id, "Peer requested close");
            false
        }
    }
}

/// Dispatch a parsed client event to the router
async fn handle_client_event(router: &EventRouter, peer_id: &str, event: ClientEvent) {
    match event {
        ClientEvent::SendLocation {
            latitude,
            longitude,
        } => {
            if let Err(e) = router
                .on_location_update(peer_id, latitude, longitude)
                .await
            {
                tracing::debug!(peer_id = %peer_id, error = %e, "Location update dropped");
            }
        }
    }
}
