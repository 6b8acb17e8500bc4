//! Lifecycle error taxonomy.
//!
//! `NotFound` deliberately covers both absence and access denial on reads:
//! a requester unrelated to an order learns nothing about its existence.

use courier_core::OrderStatus;
use thiserror::Error;

/// Errors surfaced by lifecycle operations.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// Malformed or non-finite input; recoverable client-side, never retried
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Missing or expired credential
    #[error("not authenticated")]
    Unauthenticated,

    /// Authenticated but wrong principal or role for the target resource
    #[error("forbidden ({0})")]
    Forbidden(String),

    /// Resource absent, or access denied on a read
    #[error("order not found")]
    NotFound,

    /// Transition attempted from a status other than the expected one
    #[error("order must be {expected} to {action}")]
    InvalidState {
        /// Status the order must be in for this action
        expected: OrderStatus,
        /// The attempted action ("start" or "complete")
        action: &'static str,
    },

    /// Persistence layer failure; not retried internally
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
}

pub type Result<T> = std::result::Result<T, LifecycleError>;
