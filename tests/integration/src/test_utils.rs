//! Test utilities for cross-crate integration tests

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::net::TcpListener;

use courier_lifecycle::LifecycleEngine;
use courier_relay::{LocationRelay, SessionManager, WsServer};
use courier_store::SqliteStore;

/// Get current timestamp in milliseconds
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis() as u64
}

/// A fully wired core over an in-memory store.
pub struct TestStack {
    pub store: Arc<SqliteStore>,
    pub engine: LifecycleEngine,
    pub sessions: Arc<SessionManager>,
    pub relay: Arc<LocationRelay>,
}

impl TestStack {
    pub fn new() -> Self {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        let engine = LifecycleEngine::new(store.clone());
        let sessions = Arc::new(SessionManager::new());
        let relay = Arc::new(LocationRelay::new(sessions.clone(), store.clone()));

        Self {
            store,
            engine,
            sessions,
            relay,
        }
    }
}

impl Default for TestStack {
    fn default() -> Self {
        Self::new()
    }
}

/// Start a WebSocket server for the stack on an ephemeral port.
///
/// Returns the URL clients should connect to.
pub async fn start_ws_server(stack: &TestStack) -> String {
    let addr: SocketAddr = "127.0.0.1:0".parse().unwrap();
    let listener = TcpListener::bind(addr).await.unwrap();
    let local_addr = listener.local_addr().unwrap();

    let server = Arc::new(WsServer::new(
        local_addr,
        stack.sessions.clone(),
        stack.relay.clone(),
    ));
    tokio::spawn(async move {
        let _ = server.serve(listener).await;
    });

    format!("ws://{}", local_addr)
}
