//! Core functionality for the Courier delivery coordination system.
//!
//! This crate provides the fundamental types and utilities used across the
//! Courier ecosystem: the order domain model, the status transition table,
//! verified principal types, and logging initialization.

pub mod identity;
pub mod logging;
pub mod types;

pub use identity::{Identity, Role};
pub use types::{is_finite_coordinate, LocationSample, Order, OrderStatus};
