//! Postgres credential store.

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use crate::store::{unix_now_secs, CredentialRecord, CredentialStore, NewCredential, StoreError};

// Postgres class 23 integrity-constraint violation for unique indexes.
const UNIQUE_VIOLATION: &str = "23505";

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS users (
    id UUID PRIMARY KEY,
    username TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    created_at BIGINT NOT NULL
)";

/// Credential store backed by Postgres.
///
/// Uniqueness is enforced by the index on `username`; a violation on insert
/// maps to [`StoreError::Duplicate`], which keeps duplicate detection
/// race-free across concurrent registrations and across processes.
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Connect to the database with a bounded pool.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(Self { pool })
    }

    /// Wrap an existing pool (used by tests that manage their own database).
    pub fn with_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the users table if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for PostgresStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<CredentialRecord>, StoreError> {
        sqlx::query_as::<_, CredentialRecord>(
            "SELECT id, username, password_hash, created_at FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))
    }

    async fn insert(&self, credential: NewCredential) -> Result<CredentialRecord, StoreError> {
        let record = CredentialRecord {
            id: Uuid::new_v4(),
            username: credential.username,
            password_hash: credential.password_hash,
            created_at: unix_now_secs(),
        };
        sqlx::query("INSERT INTO users (id, username, password_hash, created_at) VALUES ($1, $2, $3, $4)")
            .bind(record.id)
            .bind(&record.username)
            .bind(&record.password_hash)
            .bind(record.created_at)
            .execute(&self.pool)
            .await
            .map_err(map_insert_error)?;
        Ok(record)
    }
}

fn map_insert_error(error: sqlx::Error) -> StoreError {
    match &error {
        sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
            StoreError::Duplicate
        }
        _ => StoreError::Backend(error.to_string()),
    }
}
