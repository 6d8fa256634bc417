//! Access gate for protected routes.
//!
//! Extracts the bearer token, verifies it, and either attaches the resolved
//! identity to the request or short-circuits with 401 before the handler
//! runs. Holds no state of its own beyond the shared codec.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Request};
use axum::middleware::Next;
use axum::response::Response;

use crate::auth::error::AuthError;
use crate::auth::token::TokenCodec;

const BEARER_PREFIX: &str = "Bearer ";

/// Identity attached to authenticated requests.
#[derive(Clone, Debug)]
pub struct UserContext {
    pub user_id: String,
}

pub async fn require_auth(
    State(codec): State<Arc<TokenCodec>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AuthError::MissingToken)?;

    let token = header.strip_prefix(BEARER_PREFIX).ok_or(AuthError::Malformed)?;
    let user_id = codec.verify(token)?;

    request.extensions_mut().insert(UserContext { user_id });
    Ok(next.run(request).await)
}
