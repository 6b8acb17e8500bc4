use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tracing::{error, info};

use courier_relay::WsServer;

mod auth;
mod config;
mod handlers;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    courier_core::logging::init();

    let config = Config::from_env();
    let state = Arc::new(AppState::new(config.clone())?);

    // Event channel: persistent bidirectional connections for joins and
    // location updates
    let ws_addr: SocketAddr = format!("0.0.0.0:{}", config.ws_port).parse()?;
    let ws_server = Arc::new(WsServer::new(
        ws_addr,
        state.sessions.clone(),
        state.relay.clone(),
    ));
    tokio::spawn(async move {
        if let Err(e) = ws_server.run().await {
            error!("WebSocket server failed: {}", e);
        }
    });

    // Command channel: request/response lifecycle operations
    let app = Router::new()
        .route("/health", get(handlers::health))
        .route("/orders", post(handlers::create_order))
        .route("/orders/:id", get(handlers::get_order))
        .route("/orders/:id/start", post(handlers::start_order))
        .route("/orders/:id/complete", post(handlers::complete_order))
        .route("/driver/orders", get(handlers::list_driver_orders))
        .route("/internal/drivers", post(handlers::register_driver))
        .with_state(state)
        .layer(ServiceBuilder::new().into_inner());

    let bind_addr = format!("0.0.0.0:{}", config.http_port);
    let listener = TcpListener::bind(&bind_addr).await?;
    info!("Courier command channel listening on {}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
