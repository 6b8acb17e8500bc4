//! WebSocket server for the event channel.
//!
//! Hosts the persistent bidirectional connections: drivers publish
//! `location_update` frames, customers `join` order groups and receive the
//! relayed samples. One task per connection; inbound frames and the
//! session's outbound queue are pumped through a single `select!` loop.

use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{error, info, warn};

use crate::protocol::{ClientMessage, ServerMessage};
use crate::relay::LocationRelay;
use crate::session::{SessionId, SessionManager, DEFAULT_SESSION_QUEUE_CAPACITY};

/// WebSocket server state
pub struct WsServer {
    /// Live-session registry, owned by the process and shared by handle
    sessions: Arc<SessionManager>,

    /// Sample intake and fan-out
    relay: Arc<LocationRelay>,

    /// Server address
    addr: SocketAddr,
}

impl WsServer {
    /// Create a new WebSocket server.
    pub fn new(addr: SocketAddr, sessions: Arc<SessionManager>, relay: Arc<LocationRelay>) -> Self {
        Self {
            sessions,
            relay,
            addr,
        }
    }

    /// Bind the configured address and serve connections forever.
    pub async fn run(self: Arc<Self>) -> Result<(), Box<dyn std::error::Error>> {
        let listener = TcpListener::bind(self.addr).await?;
        info!("WebSocket server listening on {}", self.addr);
        self.serve(listener).await
    }

    /// Serve connections from an already-bound listener.
    pub async fn serve(
        self: Arc<Self>,
        listener: TcpListener,
    ) -> Result<(), Box<dyn std::error::Error>> {
        loop {
            match listener.accept().await {
                Ok((stream, peer_addr)) => {
                    let server = Arc::clone(&self);

                    tokio::spawn(async move {
                        if let Err(e) = server.handle_connection(stream, peer_addr).await {
                            error!("WebSocket connection error: {}", e);
                        }
                    });
                }
                Err(e) => {
                    error!("Failed to accept connection: {}", e);
                }
            }
        }
    }

    /// Handle individual WebSocket connection
    async fn handle_connection(
        &self,
        stream: TcpStream,
        peer_addr: SocketAddr,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let ws_stream = accept_async(stream).await?;
        let (mut ws_sender, mut ws_receiver) = ws_stream.split();

        let session_id = SessionId::new();
        let (outbound_tx, mut outbound_rx) = mpsc::channel(DEFAULT_SESSION_QUEUE_CAPACITY);
        self.sessions.register(session_id, outbound_tx).await;

        info!(session = %session_id, peer = %peer_addr, "New WebSocket connection");

        // Send acknowledgment
        let ack = ServerMessage::Ack {
            message: "Connected to Courier location feed".to_string(),
        };
        if let Ok(ack_json) = serde_json::to_string(&ack) {
            if let Err(e) = ws_sender.send(Message::Text(ack_json)).await {
                warn!(session = %session_id, "Error sending ack: {}", e);
                self.sessions.disconnect(session_id).await;
                return Ok(());
            }
        }

        // Handle bidirectional communication
        loop {
            tokio::select! {
                // Receive messages from client
                msg = ws_receiver.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            self.handle_client_frame(session_id, &text).await;
                        }
                        Some(Ok(Message::Close(_))) | None => {
                            info!(session = %session_id, "Client disconnected");
                            break;
                        }
                        Some(Err(e)) => {
                            warn!(session = %session_id, "Error receiving frame: {}", e);
                            break;
                        }
                        Some(Ok(_)) => {}
                    }
                }

                // Relay broadcast samples to the client
                Some(server_msg) = outbound_rx.recv() => {
                    match serde_json::to_string(&server_msg) {
                        Ok(json) => {
                            if let Err(e) = ws_sender.send(Message::Text(json)).await {
                                warn!(session = %session_id, "Error sending to client: {}", e);
                                break;
                            }
                        }
                        Err(e) => {
                            warn!(session = %session_id, "Failed to encode server message: {}", e);
                        }
                    }
                }
            }
        }

        self.sessions.disconnect(session_id).await;

        Ok(())
    }

    /// Dispatch one inbound frame. Malformed frames are dropped silently.
    async fn handle_client_frame(&self, session_id: SessionId, text: &str) {
        match ClientMessage::parse(text) {
            Some(ClientMessage::Join { order_id }) => {
                self.sessions.join(session_id, &order_id).await;
            }
            Some(ClientMessage::LocationUpdate {
                order_id,
                lat,
                lng,
            }) => {
                self.relay.record_and_broadcast(&order_id, lat, lng).await;
            }
            None => {}
        }
    }
}
