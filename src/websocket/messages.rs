//! WebSocket Message Types
//!
//! Every text frame is a JSON envelope `{"event": <name>, "data": <payload>}`.
//! Event names and payload shapes are kept identical to what existing map
//! clients already speak.

use serde::{Deserialize, Serialize};

use crate::registry::{Location, PeerId};

/// Events sent from client to server
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientEvent {
    /// The client's current device position
    SendLocation {
        latitude: f64,
        longitude: f64,
    },
}

/// Events sent from server to client
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerEvent {
    /// Another peer reported a new location
    ReceiveLocation {
        id: PeerId,
        latitude: f64,
        longitude: f64,
    },
    /// A peer's connection closed; payload is the bare id
    UserDisconnected(PeerId),
    /// Sent once to a new peer with its own connection id
    Connected {
        id: PeerId,
    },
}

impl ServerEvent {
    /// Build a `receive-location` event for a peer's accepted location
    pub fn receive_location(id: &str, location: Location) -> Self {
        Self::ReceiveLocation {
            id: id.to_string(),
            latitude: location.latitude,
            longitude: location.longitude,
        }
    }

    /// Wire name of this event
    pub fn name(&self) -> &'static str {
        match self {
            Self::ReceiveLocation { .. } => "receive-location",
            Self::UserDisconnected(_) => "user-disconnected",
            Self::Connected { .. } => "connected",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_client_event_deserialize_send_location() {
        let text = r#"{"event": "send-location", "data": {"latitude": 40.0, "longitude": -73.0}}"#;
        let event: ClientEvent = serde_json::from_str(text).unwrap();
        assert_eq!(
            event,
            ClientEvent::SendLocation {
                latitude: 40.0,
                longitude: -73.0
            }
        );
    }

    #[test]
    fn test_client_event_accepts_integer_coordinates() {
        let text = r#"{"event": "send-location", "data": {"latitude": 200, "longitude": 0}}"#;
        let event: ClientEvent = serde_json::from_str(text).unwrap();
        assert!(matches!(
            event,
            ClientEvent::SendLocation { latitude, .. } if latitude == 200.0
        ));
    }

    #[test]
    fn test_client_event_rejects_unknown_event() {
        let text = r#"{"event": "teleport", "data": {}}"#;
        assert!(serde_json::from_str::<ClientEvent>(text).is_err());
    }

    #[test]
    fn test_client_event_rejects_non_numeric_coordinates() {
        let text = r#"{"event": "send-location", "data": {"latitude": "north", "longitude": 0}}"#;
        assert!(serde_json::from_str::<ClientEvent>(text).is_err());
    }

    #[test]
    fn test_receive_location_wire_shape() {
        let event = ServerEvent::ReceiveLocation {
            id: "A".to_string(),
            latitude: 40.0,
            longitude: -73.0,
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(
            value,
            json!({
                "event": "receive-location",
                "data": {"id": "A", "latitude": 40.0, "longitude": -73.0}
            })
        );
    }

    #[test]
    fn test_user_disconnected_payload_is_bare_string() {
        let event = ServerEvent::UserDisconnected("A".to_string());
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value, json!({"event": "user-disconnected", "data": "A"}));
    }

    #[test]
    fn test_connected_wire_shape() {
        let event = ServerEvent::Connected {
            id: "abc-123".to_string(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"event\":\"connected\""));
        assert!(json.contains("\"id\":\"abc-123\""));
        assert_eq!(event.name(), "connected");
    }
}
