//! Narrow repository interfaces the core depends on.
//!
//! The lifecycle engine and the location relay never see a database
//! connection; they hold these traits behind `Arc` so tests can substitute
//! doubles and the store engine can change without touching core logic.

use courier_core::{LocationSample, Order, OrderStatus};

use crate::error::Result;

/// Transactional CRUD and conditional-update over order rows.
pub trait OrderStore: Send + Sync {
    /// Persist a new order and return it.
    fn insert(&self, order: &Order) -> Result<Order>;

    /// Fetch an order by id.
    fn get(&self, id: &str) -> Result<Option<Order>>;

    /// Atomically move an order from `expected` to `next`.
    ///
    /// The compare and the write execute as one conditional update; if the
    /// row is not in `expected` (including concurrent-transition races) the
    /// call fails with [`StoreError::PreconditionFailed`] and the row is
    /// left untouched.
    ///
    /// [`StoreError::PreconditionFailed`]: crate::error::StoreError::PreconditionFailed
    fn conditional_update_status(
        &self,
        id: &str,
        expected: OrderStatus,
        next: OrderStatus,
    ) -> Result<Order>;

    /// All orders assigned to a driver, newest first.
    fn list_by_driver(&self, driver_id: &str) -> Result<Vec<Order>>;

    /// The driver with the earliest registration timestamp, if any.
    fn find_earliest_registered_driver(&self) -> Result<Option<String>>;

    /// Mirror a driver account into the registry consulted by the
    /// assignment policy. Idempotent; owned by the auth collaborator.
    fn register_driver(&self, driver_id: &str, registered_at: u64) -> Result<()>;
}

/// Append-only location trail.
pub trait LocationStore: Send + Sync {
    /// Append one position sample. Samples are never mutated or deleted.
    fn append(&self, sample: &LocationSample) -> Result<()>;

    /// All samples for an order in receipt order.
    fn list_by_order(&self, order_id: &str) -> Result<Vec<LocationSample>>;
}
