//! In-memory credential store.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use uuid::Uuid;

use crate::store::{unix_now_secs, CredentialRecord, CredentialStore, NewCredential, StoreError};

/// Credential store backed by a concurrent map, keyed by username.
///
/// Used by tests and by dev runs without a configured database. Insertion
/// goes through the entry API, so two concurrent registrations of the same
/// username cannot both succeed.
#[derive(Default)]
pub struct MemoryStore {
    records: DashMap<String, CredentialRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<CredentialRecord>, StoreError> {
        Ok(self.records.get(username).map(|r| r.value().clone()))
    }

    async fn insert(&self, credential: NewCredential) -> Result<CredentialRecord, StoreError> {
        let record = CredentialRecord {
            id: Uuid::new_v4(),
            username: credential.username.clone(),
            password_hash: credential.password_hash,
            created_at: unix_now_secs(),
        };
        match self.records.entry(credential.username) {
            Entry::Occupied(_) => Err(StoreError::Duplicate),
            Entry::Vacant(slot) => {
                slot.insert(record.clone());
                Ok(record)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credential(username: &str) -> NewCredential {
        NewCredential {
            username: username.to_string(),
            password_hash: "$argon2id$fake".to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let store = MemoryStore::new();
        let record = store.insert(credential("alice")).await.unwrap();
        let found = store.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(found.id, record.id);
        assert_eq!(found.username, "alice");
    }

    #[tokio::test]
    async fn test_duplicate_insert_leaves_original_intact() {
        let store = MemoryStore::new();
        let first = store.insert(credential("bob")).await.unwrap();
        let err = store.insert(credential("bob")).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate));

        let found = store.find_by_username("bob").await.unwrap().unwrap();
        assert_eq!(found.id, first.id);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_user_is_none() {
        let store = MemoryStore::new();
        assert!(store.find_by_username("ghost").await.unwrap().is_none());
    }
}
