//! Store error types.

use courier_core::OrderStatus;
use thiserror::Error;

/// Errors that can occur in repository operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying database engine failure (includes busy-timeout expiry)
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Conditional status update found the row in a different status
    #[error("precondition failed for order {id}: status is no longer {expected}")]
    PreconditionFailed {
        /// Order identifier
        id: String,
        /// Status the caller expected to transition from
        expected: OrderStatus,
    },

    /// Filesystem failure while preparing the database
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;
