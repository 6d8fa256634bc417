//! Page, health and fallback handlers.

use std::time::{SystemTime, UNIX_EPOCH};

use axum::extract::State;
use axum::http::{header, HeaderValue, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;

use crate::content::{ContentError, StaticContent};
use crate::http::server::AppState;

const STATIC_CACHE_CONTROL: &str = "public, max-age=86400";

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub timestamp: u64,
}

/// GET /health
pub async fn health() -> Json<HealthStatus> {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    Json(HealthStatus {
        status: "OK",
        timestamp,
    })
}

/// GET /
pub async fn index_page(State(state): State<AppState>) -> Response {
    serve_page(&state, "index.html").await
}

/// GET /login
pub async fn login_page(State(state): State<AppState>) -> Response {
    serve_page(&state, "login.html").await
}

/// GET /register
pub async fn register_page(State(state): State<AppState>) -> Response {
    serve_page(&state, "register.html").await
}

/// GET /dashboard — behind the access gate.
pub async fn dashboard_page(State(state): State<AppState>) -> Response {
    serve_page(&state, "dashboard.html").await
}

/// Catch-all: JSON 404 for unknown API routes, static assets otherwise,
/// with `index.html` as the single-page-app fallback.
pub async fn fallback(State(state): State<AppState>, uri: Uri) -> Response {
    let path = uri.path();
    if path == "/api" || path.starts_with("/api/") {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "API route not found" })),
        )
            .into_response();
    }

    match state.content.resolve(path).await {
        Ok(content) => static_response(content),
        Err(ContentError::NotFound) if state.spa_fallback => {
            serve_page(&state, "index.html").await
        }
        Err(ContentError::NotFound) => not_found(),
        Err(ContentError::Io(e)) => internal_error(path, e),
    }
}

async fn serve_page(state: &AppState, file: &str) -> Response {
    match state.content.resolve(file).await {
        Ok(content) => static_response(content),
        Err(ContentError::NotFound) => not_found(),
        Err(ContentError::Io(e)) => internal_error(file, e),
    }
}

fn static_response(content: StaticContent) -> Response {
    (
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(content.content_type)),
            (header::CACHE_CONTROL, HeaderValue::from_static(STATIC_CACHE_CONTROL)),
        ],
        content.bytes,
    )
        .into_response()
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "not found").into_response()
}

fn internal_error(path: &str, error: std::io::Error) -> Response {
    tracing::error!(path = %path, error = %error, "static content read failed");
    (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
}
