//! Configuration loading from the environment.
//!
//! All recognized variables are read exactly once at process start; there is
//! no file watching or hot reload. The signing secret is the only variable
//! without a default.

use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// A required variable is absent or empty.
    Missing(&'static str),
    /// A variable is present but cannot be parsed.
    Invalid { var: &'static str, reason: String },
    /// Semantic validation failed.
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Missing(var) => write!(f, "required environment variable {} is not set", var),
            ConfigError::Invalid { var, reason } => write!(f, "invalid value for {}: {}", var, reason),
            ConfigError::Validation(errors) => {
                write!(f, "validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load and validate the gateway configuration from the environment.
pub fn load_from_env() -> Result<GatewayConfig, ConfigError> {
    let mut config = GatewayConfig::default();

    config.auth.token_secret = require_var("GATEWAY_TOKEN_SECRET")?;

    if let Some(port) = parsed_var::<u16>("GATEWAY_PORT")? {
        config.listener.bind_address = format!("0.0.0.0:{port}");
    }
    // An explicit bind address wins over the port shorthand.
    if let Some(address) = string_var("GATEWAY_BIND_ADDRESS") {
        config.listener.bind_address = address;
    }
    if let Some(ttl) = parsed_var::<u64>("GATEWAY_TOKEN_TTL_SECS")? {
        config.auth.token_ttl_secs = ttl;
    }
    if let Some(window) = parsed_var::<u64>("GATEWAY_RATE_LIMIT_WINDOW_MS")? {
        config.rate_limit.window_ms = window;
    }
    if let Some(max) = parsed_var::<u32>("GATEWAY_RATE_LIMIT_MAX_REQUESTS")? {
        config.rate_limit.max_requests = max;
    }
    if let Some(url) = string_var("GATEWAY_DATABASE_URL") {
        config.database.url = Some(url);
    }
    if let Some(dir) = string_var("GATEWAY_PUBLIC_DIR") {
        config.content.public_dir = PathBuf::from(dir);
    }
    if let Some(level) = string_var("GATEWAY_LOG_LEVEL") {
        config.observability.log_level = level;
    }
    if let Some(address) = string_var("GATEWAY_METRICS_ADDRESS") {
        config.observability.metrics_address = address;
    }

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

fn require_var(var: &'static str) -> Result<String, ConfigError> {
    string_var(var).ok_or(ConfigError::Missing(var))
}

fn string_var(var: &'static str) -> Option<String> {
    std::env::var(var).ok().filter(|value| !value.is_empty())
}

fn parsed_var<T>(var: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match string_var(var) {
        None => Ok(None),
        Some(raw) => raw.parse::<T>().map(Some).map_err(|e| ConfigError::Invalid {
            var,
            reason: e.to_string(),
        }),
    }
}
