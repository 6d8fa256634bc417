//! Credential store collaborator.
//!
//! # Data Flow
//! ```text
//! AuthService
//!     → CredentialStore trait (find_by_username / insert)
//!         → memory.rs  (DashMap; tests and secretless dev runs)
//!         → postgres.rs (sqlx; production)
//! ```
//!
//! # Design Decisions
//! - The gateway core only sees the trait; backends are chosen at startup
//! - Duplicate detection is the store's job, so it is race-free at the
//!   uniqueness boundary (entry lock in memory, unique index in Postgres)
//! - Records are immutable once created; password rotation is out of scope

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

/// A persisted user credential.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CredentialRecord {
    /// Opaque, stable user identity.
    pub id: Uuid,
    pub username: String,
    /// Argon2 PHC string; never the plaintext.
    pub password_hash: String,
    /// Creation time, seconds since the Unix epoch.
    pub created_at: i64,
}

/// Input for creating a credential record.
#[derive(Debug, Clone)]
pub struct NewCredential {
    pub username: String,
    pub password_hash: String,
}

/// Failures surfaced by a credential store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("username already exists")]
    Duplicate,
    #[error("credential store backend error: {0}")]
    Backend(String),
}

/// Contract between the gateway core and the persistence layer.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Look up a credential record by username.
    async fn find_by_username(&self, username: &str) -> Result<Option<CredentialRecord>, StoreError>;

    /// Persist a new credential. Fails with [`StoreError::Duplicate`] if the
    /// username is already taken.
    async fn insert(&self, credential: NewCredential) -> Result<CredentialRecord, StoreError>;
}

pub(crate) fn unix_now_secs() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
