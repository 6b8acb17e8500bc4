use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::error;

use courier_core::Order;
use courier_lifecycle::{CreateOrderRequest, LifecycleError};
use courier_store::OrderStore;

use crate::auth::AuthIdentity;
use crate::state::AppState;

/// Command-channel error response: a status code and an `{"error": …}` body.
pub struct ApiError(StatusCode, String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.0, Json(json!({ "error": self.1 }))).into_response()
    }
}

impl From<LifecycleError> for ApiError {
    fn from(e: LifecycleError) -> Self {
        match &e {
            LifecycleError::InvalidInput(_) | LifecycleError::InvalidState { .. } => {
                ApiError(StatusCode::BAD_REQUEST, e.to_string())
            }
            LifecycleError::Unauthenticated => {
                ApiError(StatusCode::UNAUTHORIZED, e.to_string())
            }
            LifecycleError::Forbidden(_) => ApiError(StatusCode::FORBIDDEN, e.to_string()),
            LifecycleError::NotFound => ApiError(StatusCode::NOT_FOUND, "Order not found".to_string()),
            LifecycleError::StoreUnavailable(detail) => {
                error!("Store unavailable: {}", detail);
                ApiError(StatusCode::INTERNAL_SERVER_ERROR, "Server error".to_string())
            }
        }
    }
}

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "courierd",
        "timestamp": Utc::now().to_rfc3339()
    }))
}

pub async fn create_order(
    State(state): State<Arc<AppState>>,
    AuthIdentity(identity): AuthIdentity,
    Json(request): Json<CreateOrderRequest>,
) -> Result<Json<Order>, ApiError> {
    let order = state.engine.create_order(&identity, &request)?;
    Ok(Json(order))
}

pub async fn get_order(
    State(state): State<Arc<AppState>>,
    AuthIdentity(identity): AuthIdentity,
    Path(order_id): Path<String>,
) -> Result<Json<Order>, ApiError> {
    let order = state.engine.get_order(&identity, &order_id)?;
    Ok(Json(order))
}

pub async fn start_order(
    State(state): State<Arc<AppState>>,
    AuthIdentity(identity): AuthIdentity,
    Path(order_id): Path<String>,
) -> Result<Json<Order>, ApiError> {
    let order = state.engine.start_order(&identity, &order_id)?;
    Ok(Json(order))
}

pub async fn complete_order(
    State(state): State<Arc<AppState>>,
    AuthIdentity(identity): AuthIdentity,
    Path(order_id): Path<String>,
) -> Result<Json<Order>, ApiError> {
    let order = state.engine.complete_order(&identity, &order_id)?;
    Ok(Json(order))
}

pub async fn list_driver_orders(
    State(state): State<Arc<AppState>>,
    AuthIdentity(identity): AuthIdentity,
) -> Result<Json<Value>, ApiError> {
    let orders = state.engine.list_driver_orders(&identity)?;
    Ok(Json(json!({ "orders": orders })))
}

/// Driver-registry sync payload from the auth collaborator.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterDriverRequest {
    pub driver_id: String,
    /// Registration time (Unix milliseconds); defaults to receipt time
    pub registered_at: Option<u64>,
}

pub async fn register_driver(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegisterDriverRequest>,
) -> Result<Json<Value>, ApiError> {
    if request.driver_id.trim().is_empty() {
        return Err(ApiError(
            StatusCode::BAD_REQUEST,
            "driverId must be non-empty".to_string(),
        ));
    }

    let registered_at = request
        .registered_at
        .unwrap_or_else(|| Utc::now().timestamp_millis() as u64);

    state
        .store
        .register_driver(&request.driver_id, registered_at)
        .map_err(|e| {
            error!("Store unavailable: {}", e);
            ApiError(StatusCode::INTERNAL_SERVER_ERROR, "Server error".to_string())
        })?;

    Ok(Json(json!({ "status": "registered" })))
}
