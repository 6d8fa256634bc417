//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde/env parsing handles syntactic)
//! - Validate value ranges (window > 0, cap > 0, TTL > 0)
//! - Check addresses parse before anything binds to them
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: GatewayConfig -> Result<(), Vec<ValidationError>>
//! - Runs before the config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::GatewayConfig;

/// Minimum accepted signing-secret length in bytes.
pub const MIN_SECRET_LEN: usize = 32;

/// A single semantic configuration error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmptyTokenSecret,
    ShortTokenSecret { len: usize },
    ZeroTokenTtl,
    ZeroStoreTimeout,
    ZeroRateLimitWindow,
    ZeroRateLimitCap,
    ZeroIdleMultiplier,
    ZeroBodyLimit,
    InvalidBindAddress(String),
    InvalidMetricsAddress(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::EmptyTokenSecret => write!(f, "token signing secret is empty"),
            ValidationError::ShortTokenSecret { len } => {
                write!(f, "token signing secret is {} bytes, need at least {}", len, MIN_SECRET_LEN)
            }
            ValidationError::ZeroTokenTtl => write!(f, "token TTL must be greater than zero"),
            ValidationError::ZeroStoreTimeout => write!(f, "store timeout must be greater than zero"),
            ValidationError::ZeroRateLimitWindow => write!(f, "rate limit window must be greater than zero"),
            ValidationError::ZeroRateLimitCap => write!(f, "rate limit request cap must be greater than zero"),
            ValidationError::ZeroIdleMultiplier => write!(f, "rate limit idle multiplier must be greater than zero"),
            ValidationError::ZeroBodyLimit => write!(f, "max body size must be greater than zero"),
            ValidationError::InvalidBindAddress(addr) => write!(f, "bind address {:?} is not a socket address", addr),
            ValidationError::InvalidMetricsAddress(addr) => write!(f, "metrics address {:?} is not a socket address", addr),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validate a loaded configuration, collecting every violation.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.auth.token_secret.is_empty() {
        errors.push(ValidationError::EmptyTokenSecret);
    } else if config.auth.token_secret.len() < MIN_SECRET_LEN {
        errors.push(ValidationError::ShortTokenSecret {
            len: config.auth.token_secret.len(),
        });
    }
    if config.auth.token_ttl_secs == 0 {
        errors.push(ValidationError::ZeroTokenTtl);
    }
    if config.auth.store_timeout_secs == 0 {
        errors.push(ValidationError::ZeroStoreTimeout);
    }
    if config.rate_limit.window_ms == 0 {
        errors.push(ValidationError::ZeroRateLimitWindow);
    }
    if config.rate_limit.max_requests == 0 {
        errors.push(ValidationError::ZeroRateLimitCap);
    }
    if config.rate_limit.idle_multiplier == 0 {
        errors.push(ValidationError::ZeroIdleMultiplier);
    }
    if config.security.max_body_size == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }
    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(config.listener.bind_address.clone()));
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
