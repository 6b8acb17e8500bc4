//! Order domain types and the status transition table.
//!
//! The order lifecycle is strictly linear:
//! CREATED → ASSIGNED → IN_PROGRESS → COMPLETED. No skips, no reverse
//! edges, no cycles. CREATED and ASSIGNED are both valid immediate
//! post-creation states; COMPLETED is terminal.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Order lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Created, no driver available at creation time
    Created,
    /// A driver has been assigned
    Assigned,
    /// The assigned driver has started the delivery
    InProgress,
    /// Delivery finished; terminal, retained for audit
    Completed,
}

impl OrderStatus {
    /// The single status that may follow this one, if any.
    pub fn next(self) -> Option<OrderStatus> {
        match self {
            OrderStatus::Created => Some(OrderStatus::Assigned),
            OrderStatus::Assigned => Some(OrderStatus::InProgress),
            OrderStatus::InProgress => Some(OrderStatus::Completed),
            OrderStatus::Completed => None,
        }
    }

    /// Check whether `next` is a valid immediate successor of this status.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        self.next() == Some(next)
    }

    /// Check if this status admits no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Completed)
    }

    /// Wire/database text for this status.
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Created => "CREATED",
            OrderStatus::Assigned => "ASSIGNED",
            OrderStatus::InProgress => "IN_PROGRESS",
            OrderStatus::Completed => "COMPLETED",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CREATED" => Ok(OrderStatus::Created),
            "ASSIGNED" => Ok(OrderStatus::Assigned),
            "IN_PROGRESS" => Ok(OrderStatus::InProgress),
            "COMPLETED" => Ok(OrderStatus::Completed),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// Error for a status string that is not part of the lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown order status: {0}")]
pub struct UnknownStatus(pub String);

/// A delivery order.
///
/// `customer_id` and the four coordinates are immutable after creation.
/// `driver_id` is set iff status is ASSIGNED, IN_PROGRESS or COMPLETED.
/// Orders are never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Opaque unique identifier
    pub id: String,
    /// Customer that created the order
    pub customer_id: String,
    /// Assigned driver, if any
    pub driver_id: Option<String>,
    pub pickup_lat: f64,
    pub pickup_lng: f64,
    pub dropoff_lat: f64,
    pub dropoff_lng: f64,
    /// Current lifecycle status
    pub status: OrderStatus,
    /// Creation time (Unix milliseconds), immutable
    pub created_at: u64,
}

impl Order {
    /// Check whether `driver_id` names the assigned driver of this order.
    pub fn is_assigned_to(&self, driver_id: &str) -> bool {
        self.driver_id.as_deref() == Some(driver_id)
    }

    /// Invariant: driver_id is non-null iff status is past CREATED.
    pub fn driver_link_consistent(&self) -> bool {
        match self.status {
            OrderStatus::Created => self.driver_id.is_none(),
            _ => self.driver_id.is_some(),
        }
    }
}

/// A single driver position report, append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationSample {
    /// Order this sample belongs to
    pub order_id: String,
    pub lat: f64,
    pub lng: f64,
    /// Receipt time (Unix milliseconds)
    pub recorded_at: u64,
}

/// Check that a coordinate is a finite numeric value (rejects NaN and ±∞).
pub fn is_finite_coordinate(value: f64) -> bool {
    value.is_finite()
}
