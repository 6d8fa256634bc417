//! Authentication subsystem.
//!
//! # Data Flow
//! ```text
//! POST /api/auth/register ─▶ handlers.rs ─▶ service.rs ─▶ store (hash + insert)
//! POST /api/auth/login    ─▶ handlers.rs ─▶ service.rs ─▶ store + token.rs (issue)
//! protected route         ─▶ middleware.rs (gate) ─▶ token.rs (verify) ─▶ handler
//! ```
//!
//! # Design Decisions
//! - Tokens are stateless; nothing issued is ever stored or revocable
//!   before expiry, which is the price of zero-coordination verification
//! - The service owns all store I/O; the gate only touches the codec

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod service;
pub mod token;

pub use error::AuthError;
pub use middleware::{require_auth, UserContext};
pub use service::{AuthService, AuthSession};
pub use token::TokenCodec;
