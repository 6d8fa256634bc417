//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → rate_limit.rs (per-client admission check)
//!     → limits.rs (request body size)
//!     → routing, then auth::middleware for protected routes
//! Outgoing response:
//!     → headers.rs (hardening headers)
//! ```
//!
//! # Design Decisions
//! - Fail closed: a rejected admission check short-circuits the pipeline
//! - Admission runs before parsing, so oversized or malformed bodies
//!   still consume quota

pub mod headers;
pub mod limits;
pub mod rate_limit;

pub use rate_limit::{admission_middleware, Decision, RateLimiter};
