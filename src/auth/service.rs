//! Registration and login orchestration.

use std::sync::Arc;
use std::time::Duration;

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use uuid::Uuid;

use crate::auth::error::AuthError;
use crate::auth::token::TokenCodec;
use crate::resilience::timeouts::deadline;
use crate::store::{CredentialRecord, CredentialStore, NewCredential, StoreError};

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub token: String,
    pub user_id: Uuid,
    pub username: String,
}

/// Orchestrates the credential store and token codec.
///
/// The store is the only I/O dependency; every call to it is bounded by
/// `store_timeout` and a missed deadline surfaces as `StoreUnavailable`.
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    codec: Arc<TokenCodec>,
    store_timeout: Duration,
    // Verified against on unknown-user logins so the miss path costs about
    // as much as a real password check.
    decoy_hash: String,
}

impl AuthService {
    pub fn new(store: Arc<dyn CredentialStore>, codec: Arc<TokenCodec>, store_timeout: Duration) -> Self {
        let salt = SaltString::generate(&mut OsRng);
        let decoy_hash = Argon2::default()
            .hash_password(Uuid::new_v4().to_string().as_bytes(), &salt)
            .map(|h| h.to_string())
            .expect("argon2 hashing with default params");
        Self {
            store,
            codec,
            store_timeout,
            decoy_hash,
        }
    }

    /// Create an account. The plaintext password is hashed immediately and
    /// never stored, returned or logged.
    pub async fn register(&self, username: &str, password: &str) -> Result<CredentialRecord, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                tracing::error!(error = %e, "password hashing failed");
                AuthError::StoreUnavailable
            })?
            .to_string();

        let credential = NewCredential {
            username: username.to_string(),
            password_hash,
        };
        let record = self
            .store_call(self.store.insert(credential))
            .await?
            .map_err(map_store_error)?;

        tracing::info!(user_id = %record.id, "user registered");
        Ok(record)
    }

    /// Authenticate and issue a bearer token.
    ///
    /// Unknown usernames and wrong passwords are indistinguishable to the
    /// caller: same error, and the miss path still performs one Argon2
    /// verification.
    pub async fn login(&self, username: &str, password: &str) -> Result<AuthSession, AuthError> {
        let found = self
            .store_call(self.store.find_by_username(username))
            .await?
            .map_err(map_store_error)?;

        let record = match found {
            Some(record) => record,
            None => {
                let _ = verify_password(&self.decoy_hash, password);
                return Err(AuthError::InvalidCredentials);
            }
        };

        if !verify_password(&record.password_hash, password) {
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.codec.issue(&record.id.to_string())?;
        tracing::debug!(user_id = %record.id, "login succeeded");
        Ok(AuthSession {
            token,
            user_id: record.id,
            username: record.username,
        })
    }

    async fn store_call<T>(
        &self,
        operation: impl std::future::Future<Output = Result<T, StoreError>>,
    ) -> Result<Result<T, StoreError>, AuthError> {
        deadline(self.store_timeout, operation).await.map_err(|_| {
            tracing::error!(timeout_secs = self.store_timeout.as_secs(), "credential store call timed out");
            AuthError::StoreUnavailable
        })
    }
}

fn verify_password(hash: &str, password: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

fn map_store_error(error: StoreError) -> AuthError {
    match error {
        StoreError::Duplicate => AuthError::DuplicateUser,
        StoreError::Backend(detail) => {
            tracing::error!(error = %detail, "credential store call failed");
            AuthError::StoreUnavailable
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use async_trait::async_trait;

    const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

    fn service() -> AuthService {
        service_with_store(Arc::new(MemoryStore::new()))
    }

    fn service_with_store(store: Arc<dyn CredentialStore>) -> AuthService {
        let codec = Arc::new(TokenCodec::new(SECRET, Duration::from_secs(60)));
        AuthService::new(store, codec, Duration::from_millis(500))
    }

    #[tokio::test]
    async fn test_register_then_login_round_trip() {
        let service = service();
        let record = service.register("alice", "correct horse").await.unwrap();
        let session = service.login("alice", "correct horse").await.unwrap();
        assert_eq!(session.user_id, record.id);
        assert_eq!(session.username, "alice");

        let codec = TokenCodec::new(SECRET, Duration::from_secs(60));
        assert_eq!(codec.verify(&session.token).unwrap(), record.id.to_string());
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_user_are_indistinguishable() {
        let service = service();
        service.register("alice", "correct horse").await.unwrap();

        let wrong_password = service.login("alice", "battery staple").await.unwrap_err();
        let unknown_user = service.login("nobody", "anything").await.unwrap_err();
        assert_eq!(wrong_password, AuthError::InvalidCredentials);
        assert_eq!(wrong_password, unknown_user);
    }

    #[tokio::test]
    async fn test_duplicate_registration_is_rejected() {
        let service = service();
        service.register("bob", "password-1").await.unwrap();
        let err = service.register("bob", "password-2").await.unwrap_err();
        assert_eq!(err, AuthError::DuplicateUser);

        // The original credentials still work.
        assert!(service.login("bob", "password-1").await.is_ok());
        assert_eq!(
            service.login("bob", "password-2").await.unwrap_err(),
            AuthError::InvalidCredentials
        );
    }

    #[tokio::test]
    async fn test_plaintext_is_never_persisted() {
        let store = Arc::new(MemoryStore::new());
        let service = service_with_store(store.clone());
        service.register("carol", "super secret pw").await.unwrap();

        let record = store.find_by_username("carol").await.unwrap().unwrap();
        assert!(!record.password_hash.contains("super secret pw"));
        assert!(record.password_hash.starts_with("$argon2"));
    }

    struct StalledStore;

    #[async_trait]
    impl CredentialStore for StalledStore {
        async fn find_by_username(&self, _: &str) -> Result<Option<CredentialRecord>, StoreError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(None)
        }

        async fn insert(&self, _: NewCredential) -> Result<CredentialRecord, StoreError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Err(StoreError::Backend("unreachable".to_string()))
        }
    }

    #[tokio::test]
    async fn test_stalled_store_surfaces_store_unavailable() {
        let service = service_with_store(Arc::new(StalledStore));
        let err = service.login("alice", "pw").await.unwrap_err();
        assert_eq!(err, AuthError::StoreUnavailable);

        let err = service.register("alice", "password").await.unwrap_err();
        assert_eq!(err, AuthError::StoreUnavailable);
    }
}
