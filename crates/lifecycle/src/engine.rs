//! Guarded order lifecycle operations.

use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use courier_core::{is_finite_coordinate, Identity, Order, OrderStatus, Role};
use courier_store::{OrderStore, StoreError};

use crate::error::{LifecycleError, Result};

/// Coordinates for a new order, as received on the command channel.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub pickup_lat: f64,
    pub pickup_lng: f64,
    pub dropoff_lat: f64,
    pub dropoff_lng: f64,
}

impl CreateOrderRequest {
    fn coordinates(&self) -> [f64; 4] {
        [
            self.pickup_lat,
            self.pickup_lng,
            self.dropoff_lat,
            self.dropoff_lng,
        ]
    }
}

/// The order lifecycle engine.
///
/// Holds the order repository behind the narrow store trait; all status
/// mutations go through the store's atomic conditional update so concurrent
/// transitions on one order cannot both succeed against a stale read.
pub struct LifecycleEngine {
    store: Arc<dyn OrderStore>,
}

impl LifecycleEngine {
    /// Create an engine over the given order repository.
    pub fn new(store: Arc<dyn OrderStore>) -> Self {
        Self { store }
    }

    /// Create a new order for `customer`.
    ///
    /// A driver is picked by the assignment policy: the single driver with
    /// the earliest registration timestamp, irrespective of availability or
    /// location. If one exists the order starts ASSIGNED, otherwise CREATED
    /// with no driver.
    pub fn create_order(
        &self,
        customer: &Identity,
        request: &CreateOrderRequest,
    ) -> Result<Order> {
        if customer.role != Role::Customer {
            return Err(LifecycleError::Forbidden("wrong role".to_string()));
        }

        if !request.coordinates().iter().all(|c| is_finite_coordinate(*c)) {
            return Err(LifecycleError::InvalidInput(
                "invalid pickup/dropoff coordinates".to_string(),
            ));
        }

        let driver_id = self
            .store
            .find_earliest_registered_driver()
            .map_err(store_unavailable)?;

        let status = if driver_id.is_some() {
            OrderStatus::Assigned
        } else {
            OrderStatus::Created
        };

        let order = Order {
            id: Uuid::new_v4().to_string(),
            customer_id: customer.id.clone(),
            driver_id,
            pickup_lat: request.pickup_lat,
            pickup_lng: request.pickup_lng,
            dropoff_lat: request.dropoff_lat,
            dropoff_lng: request.dropoff_lng,
            status,
            created_at: Utc::now().timestamp_millis() as u64,
        };

        let order = self.store.insert(&order).map_err(store_unavailable)?;

        info!(
            order_id = %order.id,
            customer_id = %order.customer_id,
            status = %order.status,
            "Order created"
        );

        Ok(order)
    }

    /// Fetch an order, visible only to its customer or its assigned driver.
    ///
    /// Access denial is indistinguishable from absence: unrelated
    /// requesters get `NotFound` either way.
    pub fn get_order(&self, requester: &Identity, order_id: &str) -> Result<Order> {
        let order = self
            .store
            .get(order_id)
            .map_err(store_unavailable)?
            .ok_or(LifecycleError::NotFound)?;

        let related = match requester.role {
            Role::Customer => order.customer_id == requester.id,
            Role::Driver => order.is_assigned_to(&requester.id),
        };

        if !related {
            return Err(LifecycleError::NotFound);
        }

        Ok(order)
    }

    /// Transition ASSIGNED → IN_PROGRESS.
    pub fn start_order(&self, driver: &Identity, order_id: &str) -> Result<Order> {
        self.transition(
            driver,
            order_id,
            OrderStatus::Assigned,
            OrderStatus::InProgress,
            "start",
        )
    }

    /// Transition IN_PROGRESS → COMPLETED.
    pub fn complete_order(&self, driver: &Identity, order_id: &str) -> Result<Order> {
        self.transition(
            driver,
            order_id,
            OrderStatus::InProgress,
            OrderStatus::Completed,
            "complete",
        )
    }

    /// All orders assigned to `driver`, newest first.
    pub fn list_driver_orders(&self, driver: &Identity) -> Result<Vec<Order>> {
        if driver.role != Role::Driver {
            return Err(LifecycleError::Forbidden("wrong role".to_string()));
        }

        self.store
            .list_by_driver(&driver.id)
            .map_err(store_unavailable)
    }

    /// Guarded status transition.
    ///
    /// The status check here is advisory (it produces the precise error);
    /// the store's conditional update is the authoritative guard, so a
    /// concurrent transition that wins the race surfaces as `InvalidState`
    /// rather than a double success.
    fn transition(
        &self,
        driver: &Identity,
        order_id: &str,
        expected: OrderStatus,
        next: OrderStatus,
        action: &'static str,
    ) -> Result<Order> {
        if driver.role != Role::Driver {
            return Err(LifecycleError::Forbidden("wrong role".to_string()));
        }

        let order = self
            .store
            .get(order_id)
            .map_err(store_unavailable)?
            .ok_or(LifecycleError::NotFound)?;

        if !order.is_assigned_to(&driver.id) {
            return Err(LifecycleError::Forbidden("not assigned".to_string()));
        }

        if order.status != expected {
            return Err(LifecycleError::InvalidState { expected, action });
        }

        let updated = self
            .store
            .conditional_update_status(order_id, expected, next)
            .map_err(|e| match e {
                StoreError::PreconditionFailed { .. } => {
                    LifecycleError::InvalidState { expected, action }
                }
                other => store_unavailable(other),
            })?;

        info!(
            order_id = %updated.id,
            driver_id = %driver.id,
            status = %updated.status,
            "Order transitioned"
        );

        Ok(updated)
    }
}

fn store_unavailable(e: StoreError) -> LifecycleError {
    LifecycleError::StoreUnavailable(e.to_string())
}
