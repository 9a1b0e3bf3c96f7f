//! WebSocket Transport
//!
//! Carries location events between map clients and the relay.
//!
//! ## Architecture
//!
//! - **Handler**: Upgrades the connection and runs the per-peer reader/writer tasks
//! - **Messages**: Defines the client and server event envelopes
//!
//! ## Example
//!
//! ```javascript
//! // Browser
//! const ws = new WebSocket('ws://localhost:3000/ws');
//!
//! navigator.geolocation.watchPosition(({ coords }) => {
//!   ws.send(JSON.stringify({
//!     event: 'send-location',
//!     data: { latitude: coords.latitude, longitude: coords.longitude },
//!   }));
//! });
//!
//! ws.onmessage = (msg) => {
//!   const { event, data } = JSON.parse(msg.data);
//!   if (event === 'receive-location') moveMarker(data.id, data.latitude, data.longitude);
//!   if (event === 'user-disconnected') removeMarker(data);
//! };
//! ```

mod handler;
mod messages;

pub use handler::websocket_handler;
pub use messages::{ClientEvent, ServerEvent};
