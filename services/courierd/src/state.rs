use std::sync::Arc;

use courier_lifecycle::LifecycleEngine;
use courier_relay::{LocationRelay, SessionManager};
use courier_store::{SqliteStore, StoreError};

use crate::config::Config;

pub struct AppState {
    pub config: Config,
    pub store: Arc<SqliteStore>,
    pub engine: LifecycleEngine,
    pub sessions: Arc<SessionManager>,
    pub relay: Arc<LocationRelay>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, StoreError> {
        let store = Arc::new(SqliteStore::open(&config.db_path)?);
        let engine = LifecycleEngine::new(store.clone());

        // One session registry per process, handed to the WebSocket server
        let sessions = Arc::new(SessionManager::new());
        let relay = Arc::new(LocationRelay::new(sessions.clone(), store.clone()));

        Ok(AppState {
            config,
            store,
            engine,
            sessions,
            relay,
        })
    }
}
