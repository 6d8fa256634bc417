//! Authentication error taxonomy and response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::observability::metrics;

/// Every expected failure of token handling and credential orchestration.
///
/// `StoreUnavailable` is an infrastructure fault rather than a security
/// decision; it is logged with detail at the point of failure and surfaced
/// to the caller with a minimal message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("missing authorization token")]
    MissingToken,
    #[error("invalid authorization token")]
    Malformed,
    #[error("invalid authorization token")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("username already exists")]
    DuplicateUser,
    #[error("service temporarily unavailable")]
    StoreUnavailable,
}

impl AuthError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::MissingToken
            | AuthError::Malformed
            | AuthError::InvalidSignature
            | AuthError::Expired
            | AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::DuplicateUser => StatusCode::CONFLICT,
            AuthError::StoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Stable label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "missing_token",
            AuthError::Malformed => "malformed",
            AuthError::InvalidSignature => "invalid_signature",
            AuthError::Expired => "expired",
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::DuplicateUser => "duplicate_user",
            AuthError::StoreUnavailable => "store_unavailable",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::UNAUTHORIZED {
            metrics::record_auth_failure(self.kind());
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
