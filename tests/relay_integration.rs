//! End-to-end relay tests.
//!
//! Each test starts a real server on an ephemeral port and connects
//! WebSocket clients to it, verifying join/update/leave semantics through
//! the full network stack.

use futures_util::{SinkExt, StreamExt};
use meridian::{build_router, AppState, RelayConfig};
use serde_json::{json, Value};
use std::net::SocketAddr;
use tokio::net::TcpStream;
use tokio::time::{sleep, timeout, Duration, Instant};
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Start a server on a free port, return its address and shared state.
async fn start_server(relay: RelayConfig) -> (SocketAddr, AppState) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let state = AppState::new(relay);
    let app = build_router(state.clone(), None);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, state)
}

/// Connect a client and consume its welcome, returning the assigned id.
async fn connect(addr: SocketAddr) -> (Client, String) {
    let (mut ws, _) = connect_async(format!("ws://{}/ws", addr)).await.unwrap();
    let welcome = next_event(&mut ws).await;
    assert_eq!(welcome["event"], "connected");
    let id = welcome["data"]["id"].as_str().unwrap().to_string();
    (ws, id)
}

/// Next JSON event, skipping control frames.
async fn next_event(ws: &mut Client) -> Value {
    next_event_within(ws, Duration::from_secs(2)).await
}

async fn next_event_within(ws: &mut Client, limit: Duration) -> Value {
    let deadline = Instant::now() + limit;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        let frame = timeout(remaining, ws.next())
            .await
            .expect("timed out waiting for event")
            .expect("stream ended")
            .expect("websocket error");

        if let Message::Text(text) = frame {
            return serde_json::from_str(&text).unwrap();
        }
    }
}

/// Assert no event arrives for a short while.
async fn expect_silence(ws: &mut Client) {
    let deadline = Instant::now() + Duration::from_millis(300);
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match timeout(remaining, ws.next()).await {
            Err(_) => return,
            Ok(Some(Ok(Message::Text(text)))) => panic!("unexpected event: {}", text),
            Ok(Some(Ok(_))) => continue,
            Ok(other) => panic!("connection ended: {:?}", other),
        }
    }
}

async fn send_location(ws: &mut Client, latitude: f64, longitude: f64) {
    let frame = json!({
        "event": "send-location",
        "data": {"latitude": latitude, "longitude": longitude}
    });
    ws.send(Message::Text(frame.to_string())).await.unwrap();
}

/// Poll until `check` holds or two seconds pass.
async fn wait_until<F, Fut>(mut check: F)
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if check().await {
            return;
        }
        sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not met in time");
}

// ─── Join / update / leave ───────────────────────────────────────

#[tokio::test]
async fn test_two_peer_scenario() {
    let (addr, state) = start_server(RelayConfig::default()).await;
    let (mut a, a_id) = connect(addr).await;
    let (mut b, b_id) = connect(addr).await;
    assert_ne!(a_id, b_id);

    // A reports; B sees it, A does not
    send_location(&mut a, 40.0, -73.0).await;
    let event = next_event(&mut b).await;
    assert_eq!(
        event,
        json!({
            "event": "receive-location",
            "data": {"id": a_id, "latitude": 40.0, "longitude": -73.0}
        })
    );
    expect_silence(&mut a).await;

    // B sends an impossible latitude; nobody hears anything
    send_location(&mut b, 200.0, 0.0).await;
    expect_silence(&mut a).await;
    let router = state.router.clone();
    wait_until(|| {
        let router = router.clone();
        async move { router.stats().updates_rejected == 1 }
    })
    .await;
    let registry = state.router.registry().clone();
    assert!(registry.get(&b_id).await.unwrap().location.is_none());

    // A leaves; B is told with a bare id
    a.close(None).await.unwrap();
    let event = next_event(&mut b).await;
    assert_eq!(event, json!({"event": "user-disconnected", "data": a_id}));

    wait_until(|| {
        let registry = registry.clone();
        let a_id = a_id.clone();
        async move { !registry.contains(&a_id).await }
    })
    .await;
}

#[tokio::test]
async fn test_three_peers_exactly_two_deliveries() {
    let (addr, _state) = start_server(RelayConfig::default()).await;
    let (mut a, _) = connect(addr).await;
    let (mut b, b_id) = connect(addr).await;
    let (mut c, _) = connect(addr).await;

    send_location(&mut b, 48.85, 2.35).await;

    for peer in [&mut a, &mut c] {
        let event = next_event(peer).await;
        assert_eq!(event["event"], "receive-location");
        assert_eq!(event["data"]["id"], b_id.as_str());
        expect_silence(peer).await;
    }
    expect_silence(&mut b).await;
}

#[tokio::test]
async fn test_dropped_connection_announces_leave() {
    let (addr, state) = start_server(RelayConfig::default()).await;
    let (a, a_id) = connect(addr).await;
    let (mut b, _) = connect(addr).await;

    // No close handshake
    drop(a);

    let event = next_event(&mut b).await;
    assert_eq!(event, json!({"event": "user-disconnected", "data": a_id}));
    assert_eq!(state.router.stats().disconnects, 1);
}

#[tokio::test]
async fn test_malformed_frames_are_ignored() {
    let (addr, _state) = start_server(RelayConfig::default()).await;
    let (mut a, a_id) = connect(addr).await;
    let (mut b, _) = connect(addr).await;

    a.send(Message::Text("not json".to_string())).await.unwrap();
    a.send(Message::Text(r#"{"event":"teleport","data":{}}"#.to_string()))
        .await
        .unwrap();
    a.send(Message::Binary(vec![0, 1, 2])).await.unwrap();
    expect_silence(&mut b).await;

    // Connection still usable
    send_location(&mut a, 1.0, 2.0).await;
    let event = next_event(&mut b).await;
    assert_eq!(event["data"]["id"], a_id.as_str());
}

#[tokio::test]
async fn test_late_joiner_sees_no_one_by_default() {
    let (addr, state) = start_server(RelayConfig::default()).await;
    let (mut a, a_id) = connect(addr).await;
    send_location(&mut a, 10.0, 10.0).await;

    let registry = state.router.registry().clone();
    wait_until(|| {
        let registry = registry.clone();
        let a_id = a_id.clone();
        async move {
            registry
                .get(&a_id)
                .await
                .map(|p| p.is_located())
                .unwrap_or(false)
        }
    })
    .await;

    let (mut late, _) = connect(addr).await;
    expect_silence(&mut late).await;
}

#[tokio::test]
async fn test_initial_sync_replays_locations() {
    let relay = RelayConfig {
        initial_sync: true,
        ..Default::default()
    };
    let (addr, state) = start_server(relay).await;
    let (mut a, a_id) = connect(addr).await;
    send_location(&mut a, -33.9, 151.2).await;

    let registry = state.router.registry().clone();
    wait_until(|| {
        let registry = registry.clone();
        let a_id = a_id.clone();
        async move {
            registry
                .get(&a_id)
                .await
                .map(|p| p.is_located())
                .unwrap_or(false)
        }
    })
    .await;

    let (mut late, _) = connect(addr).await;
    let event = next_event(&mut late).await;
    assert_eq!(
        event,
        json!({
            "event": "receive-location",
            "data": {"id": a_id, "latitude": -33.9, "longitude": 151.2}
        })
    );
}

#[tokio::test]
async fn test_zero_outbox_capacity_still_relays() {
    let relay = RelayConfig {
        outbox_capacity: 0,
        ..Default::default()
    };
    let (addr, _state) = start_server(relay).await;
    let (mut a, a_id) = connect(addr).await;
    let (mut b, _) = connect(addr).await;

    send_location(&mut a, 5.0, 6.0).await;
    let event = next_event(&mut b).await;
    assert_eq!(event["data"]["id"], a_id.as_str());
}

// ─── Keepalive ───────────────────────────────────────────────────

#[tokio::test]
async fn test_silent_peer_times_out() {
    let relay = RelayConfig {
        heartbeat_interval_secs: 1,
        client_timeout_secs: 2,
        ..Default::default()
    };
    let (addr, _state) = start_server(relay).await;

    // A never reads again, so never answers pings
    let (_a, a_id) = connect(addr).await;
    let (mut b, _) = connect(addr).await;

    let event = next_event_within(&mut b, Duration::from_secs(5)).await;
    assert_eq!(event, json!({"event": "user-disconnected", "data": a_id}));
}

// ─── HTTP surface ────────────────────────────────────────────────

#[tokio::test]
async fn test_connected_peer_visible_over_http() {
    let (addr, state) = start_server(RelayConfig::default()).await;
    let (_a, a_id) = connect(addr).await;

    assert!(state.router.registry().contains(&a_id).await);
    assert_eq!(state.peer_count().await, 1);
    assert_eq!(state.transport.attached_count().await, 1);
}
