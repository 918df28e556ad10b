//! `StateStorage` — the serialize/deserialize boundary for client-local state.

use async_trait::async_trait;

use crate::error::StorageError;

/// Key/value storage of JSON blobs.
///
/// Best-effort local persistence: callers treat failures as degraded
/// operation, never as fatal.
#[async_trait]
pub trait StateStorage: Send + Sync {
    async fn load(&self, key: &str) -> Result<Option<serde_json::Value>, StorageError>;

    /// Insert or replace the value under `key`.
    async fn save(&self, key: &str, value: &serde_json::Value) -> Result<(), StorageError>;

    /// Returns whether a value existed.
    async fn remove(&self, key: &str) -> Result<bool, StorageError>;
}
