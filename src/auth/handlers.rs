//! Registration and login endpoints.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::auth::middleware::UserContext;
use crate::http::server::AppState;

const MAX_USERNAME_LEN: usize = 64;
const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user_id: Uuid,
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user_id: Uuid,
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user_id: String,
}

/// POST /api/auth/register
pub async fn register(State(state): State<AppState>, Json(req): Json<RegisterRequest>) -> Response {
    let username = req.username.trim();
    if let Err(message) = validate_credentials(username, &req.password) {
        return invalid_input(message);
    }

    match state.auth.register(username, &req.password).await {
        Ok(record) => (
            StatusCode::CREATED,
            Json(RegisterResponse {
                user_id: record.id,
                username: record.username,
            }),
        )
            .into_response(),
        Err(error) => error.into_response(),
    }
}

/// POST /api/auth/login
pub async fn login(State(state): State<AppState>, Json(req): Json<LoginRequest>) -> Response {
    match state.auth.login(req.username.trim(), &req.password).await {
        Ok(session) => (
            StatusCode::OK,
            Json(LoginResponse {
                token: session.token,
                user_id: session.user_id,
                username: session.username,
            }),
        )
            .into_response(),
        Err(error) => error.into_response(),
    }
}

/// GET /api/auth/me — only reachable through the access gate.
pub async fn me(Extension(user): Extension<UserContext>) -> Json<MeResponse> {
    Json(MeResponse {
        user_id: user.user_id,
    })
}

fn validate_credentials(username: &str, password: &str) -> Result<(), &'static str> {
    if username.is_empty() {
        return Err("username must not be empty");
    }
    if username.len() > MAX_USERNAME_LEN {
        return Err("username too long");
    }
    if password.len() < MIN_PASSWORD_LEN {
        return Err("password must be at least 8 characters");
    }
    Ok(())
}

fn invalid_input(message: &'static str) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
}
