//! Request size limits.

use tower_http::limit::RequestBodyLimitLayer;

use crate::config::schema::SecurityConfig;

/// Layer rejecting request bodies over the configured size with 413.
pub fn body_limit_layer(config: &SecurityConfig) -> RequestBodyLimitLayer {
    RequestBodyLimitLayer::new(config.max_body_size)
}
