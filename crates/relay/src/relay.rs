//! Location sample intake: validate, persist, fan out.

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, error};

use courier_core::{is_finite_coordinate, LocationSample};
use courier_store::LocationStore;

use crate::protocol::ServerMessage;
use crate::session::SessionManager;

/// Persists location samples and broadcasts them to the order's group.
///
/// Invalid payloads are silently dropped; senders must not depend on
/// receiving an error for bad telemetry. No authorization is performed at
/// this layer: any connected session claiming an order id may publish to
/// that order's group (documented contract, see DESIGN.md).
pub struct LocationRelay {
    sessions: Arc<SessionManager>,
    store: Arc<dyn LocationStore>,
}

impl LocationRelay {
    /// Create a relay over the given subscriber registry and trail store.
    pub fn new(sessions: Arc<SessionManager>, store: Arc<dyn LocationStore>) -> Self {
        Self { sessions, store }
    }

    /// Record one driver position sample and broadcast it to subscribers.
    ///
    /// The sample is appended to the location trail first; if persistence
    /// fails the broadcast is aborted (unpersisted data is never emitted)
    /// but the sender's session stays up.
    pub async fn record_and_broadcast(&self, order_id: &str, lat: f64, lng: f64) {
        if order_id.trim().is_empty()
            || !is_finite_coordinate(lat)
            || !is_finite_coordinate(lng)
        {
            debug!(order_id = %order_id, "Dropping invalid location update");
            return;
        }

        let now = Utc::now();
        let sample = LocationSample {
            order_id: order_id.to_string(),
            lat,
            lng,
            recorded_at: now.timestamp_millis() as u64,
        };

        if let Err(e) = self.store.append(&sample) {
            error!(order_id = %order_id, error = %e, "Failed to persist location sample, skipping broadcast");
            return;
        }

        let message = ServerMessage::LocationUpdate {
            order_id: order_id.to_string(),
            lat,
            lng,
            timestamp: now.to_rfc3339(),
        };

        self.sessions.broadcast(order_id, message).await;
    }
}
