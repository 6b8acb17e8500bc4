//! Event-channel wire messages.
//!
//! Clients send `join` and `location_update`; the server greets with `ack`
//! and fans out timestamped `location_update` events to subscribers.
//! Malformed client frames are dropped without a reply.

use serde::{Deserialize, Serialize};

/// Messages received from a connected client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Subscribe this connection to an order's group
    Join {
        #[serde(rename = "orderId")]
        order_id: String,
    },
    /// Driver position report for an order
    LocationUpdate {
        #[serde(rename = "orderId")]
        order_id: String,
        lat: f64,
        lng: f64,
    },
}

impl ClientMessage {
    /// Parse a client frame. Returns `None` for anything malformed; bad
    /// telemetry payloads are dropped, not answered.
    pub fn parse(text: &str) -> Option<Self> {
        serde_json::from_str(text).ok()
    }
}

/// Messages sent to connected clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Connection acknowledgment
    Ack {
        /// Human-readable status message
        message: String,
    },
    /// A driver position sample for a subscribed order
    LocationUpdate {
        #[serde(rename = "orderId")]
        order_id: String,
        lat: f64,
        lng: f64,
        /// Server receipt time, RFC 3339
        timestamp: String,
    },
}
