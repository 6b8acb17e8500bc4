//! Order Lifecycle Engine for Courier.
//!
//! This crate enforces the order state machine:
//! - Creation rules (customer role, finite coordinates)
//! - The assignment policy (earliest-registered driver)
//! - Guarded status transitions committed through the store's atomic
//!   conditional update
//! - Authorization-scoped reads (access denial indistinguishable from
//!   absence)
//!
//! # Architecture
//!
//! Commands flow through the following pipeline:
//! 1. Command received on the HTTP channel with a verified [`Identity`]
//! 2. Role and relation checks performed by [`LifecycleEngine`]
//! 3. State checked against the current order row
//! 4. Transition committed via `OrderStore::conditional_update_status`
//!
//! [`Identity`]: courier_core::Identity

pub mod engine;
pub mod error;

pub use engine::{CreateOrderRequest, LifecycleEngine};
pub use error::LifecycleError;
