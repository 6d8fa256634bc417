//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! process environment
//!     → loader.rs (read recognized variables, parse)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → shared with subsystem constructors at startup
//! ```
//!
//! # Design Decisions
//! - Config is read once at process start; there is no hot reload
//! - All fields except the signing secret have defaults
//! - Validation separates syntactic (parsing) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_from_env, ConfigError};
pub use schema::GatewayConfig;
pub use schema::RateLimitConfig;
