//! Integration tests for the Courier core
//!
//! This test suite validates:
//! - The full order lifecycle against a real SQLite store
//! - Location relay fan-out through per-order subscriber groups
//! - The WebSocket event channel end to end (join, publish, receive)
//! - Disconnect cleanup of subscriber-group state

pub mod test_utils;

#[cfg(test)]
mod order_flow_tests;

#[cfg(test)]
mod websocket_tests;
