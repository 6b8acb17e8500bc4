//! Persistence layer for Courier.
//!
//! The core talks to the relational store through the narrow repository
//! traits in [`repository`]; [`sqlite`] provides the SQLite-backed
//! implementation used by the `courierd` service. The store is the sole
//! arbiter of consistency for order rows: status transitions go through an
//! atomic conditional update, never a read-then-write pair.

pub mod error;
pub mod repository;
pub mod sqlite;

pub use error::{Result, StoreError};
pub use repository::{LocationStore, OrderStore};
pub use sqlite::SqliteStore;
