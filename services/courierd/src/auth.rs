//! Identity extraction at the transport boundary.
//!
//! Credentials are verified upstream by the auth collaborator (gateway);
//! requests arrive carrying the already-verified principal in
//! `x-identity-id` / `x-identity-role` headers. This service never parses
//! or validates credentials itself.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::Json,
};
use serde_json::{json, Value};

use courier_core::{Identity, Role};

pub const IDENTITY_ID_HEADER: &str = "x-identity-id";
pub const IDENTITY_ROLE_HEADER: &str = "x-identity-role";

/// The verified principal attached to a request.
pub struct AuthIdentity(pub Identity);

#[async_trait]
impl<S> FromRequestParts<S> for AuthIdentity
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<Value>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get(IDENTITY_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.trim().is_empty());

        let role = parts
            .headers
            .get(IDENTITY_ROLE_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<Role>().ok());

        match (id, role) {
            (Some(id), Some(role)) => Ok(AuthIdentity(Identity::new(id, role))),
            _ => Err((
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Missing or invalid identity" })),
            )),
        }
    }
}
