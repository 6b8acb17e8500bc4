//! Live connection and subscriber-group bookkeeping.
//!
//! A session is one connected client: an outbound queue plus the set of
//! order groups it has joined. State is in-memory only; a disconnect erases
//! the session everywhere and touches nothing persisted. There is no
//! single-order leave, only full disconnect.

use std::collections::{HashMap, HashSet};
use std::fmt;
use tokio::sync::{mpsc, RwLock};
use tracing::debug;
use uuid::Uuid;

use crate::protocol::ServerMessage;

/// Bound on each session's outbound queue; a full queue drops samples for
/// that subscriber instead of blocking the broadcaster.
pub const DEFAULT_SESSION_QUEUE_CAPACITY: usize = 64;

/// Identifier for one live connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

struct SessionEntry {
    sender: mpsc::Sender<ServerMessage>,
    joined: HashSet<String>,
}

#[derive(Default)]
struct Registry {
    sessions: HashMap<SessionId, SessionEntry>,
    groups: HashMap<String, HashSet<SessionId>>,
}

/// Tracks live sessions and per-order subscriber groups.
///
/// Constructed once per process and passed by handle to whatever accepts
/// connections; there is no ambient global. Joining performs no
/// authorization: any connected session may subscribe to any order id
/// (documented contract, see DESIGN.md).
pub struct SessionManager {
    registry: RwLock<Registry>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self {
            registry: RwLock::new(Registry::default()),
        }
    }

    /// Track a new connection and its outbound queue.
    pub async fn register(&self, session: SessionId, sender: mpsc::Sender<ServerMessage>) {
        let mut registry = self.registry.write().await;
        registry.sessions.insert(
            session,
            SessionEntry {
                sender,
                joined: HashSet::new(),
            },
        );
    }

    /// Add a session to an order's subscriber group.
    ///
    /// Empty order ids are rejected; repeated joins are no-ops. Returns
    /// whether the session is subscribed after the call.
    pub async fn join(&self, session: SessionId, order_id: &str) -> bool {
        if order_id.trim().is_empty() {
            return false;
        }

        let mut registry = self.registry.write().await;
        let Registry { sessions, groups } = &mut *registry;
        let Some(entry) = sessions.get_mut(&session) else {
            return false;
        };

        entry.joined.insert(order_id.to_string());
        groups
            .entry(order_id.to_string())
            .or_default()
            .insert(session);

        debug!(session = %session, order_id = %order_id, "Session joined order group");
        true
    }

    /// Remove a session from every group it belongs to.
    pub async fn disconnect(&self, session: SessionId) {
        let mut registry = self.registry.write().await;
        let Some(entry) = registry.sessions.remove(&session) else {
            return;
        };

        for order_id in entry.joined {
            if let Some(group) = registry.groups.get_mut(&order_id) {
                group.remove(&session);
                if group.is_empty() {
                    registry.groups.remove(&order_id);
                }
            }
        }

        debug!(session = %session, "Session disconnected");
    }

    /// Fan a message out to every session subscribed to `order_id`.
    ///
    /// Delivery is fire-and-forget: a session whose queue is full or gone
    /// misses this message without affecting the others. Returns the number
    /// of queues the message was placed on.
    pub async fn broadcast(&self, order_id: &str, message: ServerMessage) -> usize {
        let registry = self.registry.read().await;
        let Some(group) = registry.groups.get(order_id) else {
            return 0;
        };

        let mut delivered = 0;
        for session in group {
            if let Some(entry) = registry.sessions.get(session) {
                match entry.sender.try_send(message.clone()) {
                    Ok(()) => delivered += 1,
                    Err(_) => {
                        debug!(session = %session, order_id = %order_id, "Dropping sample for slow or closed session");
                    }
                }
            }
        }

        delivered
    }

    /// Number of sessions subscribed to an order.
    pub async fn subscriber_count(&self, order_id: &str) -> usize {
        let registry = self.registry.read().await;
        registry.groups.get(order_id).map_or(0, HashSet::len)
    }

    /// Number of tracked sessions.
    pub async fn session_count(&self) -> usize {
        self.registry.read().await.sessions.len()
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}
