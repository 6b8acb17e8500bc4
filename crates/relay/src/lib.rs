//! Real-time location relay for Courier.
//!
//! This crate carries driver position samples from a driver's connection to
//! every customer connection subscribed to the same order:
//! - [`protocol`]: the JSON messages spoken on the event channel
//! - [`session`]: live connection bookkeeping and per-order subscriber
//!   groups
//! - [`relay`]: validate, persist, fan out; fail-closed on store errors
//! - [`websocket`]: the WebSocket server hosting the event channel
//!
//! Subscriber-group state is in-memory and process-local; running more than
//! one relay instance requires an external pub/sub layer.

pub mod protocol;
pub mod relay;
pub mod session;
pub mod websocket;

pub use protocol::{ClientMessage, ServerMessage};
pub use relay::LocationRelay;
pub use session::{SessionId, SessionManager, DEFAULT_SESSION_QUEUE_CAPACITY};
pub use websocket::WsServer;
