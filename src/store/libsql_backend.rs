//! libSQL backend for `StateStorage`. Supports local file and in-memory
//! databases.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use libsql::{Connection, Database as LibSqlDatabase, params};
use tracing::info;

use crate::error::StorageError;
use crate::store::migrations;
use crate::store::traits::StateStorage;

/// libSQL storage holding one reused connection.
pub struct LibSqlStorage {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
}

impl LibSqlStorage {
    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StorageError::Open(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| StorageError::Open(format!("Failed to open libSQL database: {e}")))?;

        let storage = Self::from_database(db).await?;
        info!(path = %path.display(), "Storage opened");
        Ok(storage)
    }

    /// In-memory database, for tests.
    pub async fn new_memory() -> Result<Self, StorageError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| StorageError::Open(format!("Failed to create in-memory database: {e}")))?;
        Self::from_database(db).await
    }

    async fn from_database(db: LibSqlDatabase) -> Result<Self, StorageError> {
        let conn = db
            .connect()
            .map_err(|e| StorageError::Open(format!("Failed to create connection: {e}")))?;
        migrations::run_migrations(&conn).await?;
        Ok(Self {
            db: Arc::new(db),
            conn,
        })
    }
}

#[async_trait]
impl StateStorage for LibSqlStorage {
    async fn load(&self, key: &str) -> Result<Option<serde_json::Value>, StorageError> {
        let mut rows = self
            .conn
            .query("SELECT value FROM settings WHERE key = ?1", params![key])
            .await
            .map_err(|e| StorageError::Query(format!("load: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => {
                let raw: String = row
                    .get(0)
                    .map_err(|e| StorageError::Query(format!("load: {e}")))?;
                let value = serde_json::from_str(&raw)
                    .map_err(|e| StorageError::Serialization(e.to_string()))?;
                Ok(Some(value))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(StorageError::Query(format!("load: {e}"))),
        }
    }

    async fn save(&self, key: &str, value: &serde_json::Value) -> Result<(), StorageError> {
        let now = Utc::now().to_rfc3339();
        let raw =
            serde_json::to_string(value).map_err(|e| StorageError::Serialization(e.to_string()))?;

        self.conn
            .execute(
                "INSERT INTO settings (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT (key) DO UPDATE SET value = ?2, updated_at = ?3",
                params![key, raw, now],
            )
            .await
            .map_err(|e| StorageError::Query(format!("save: {e}")))?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool, StorageError> {
        let count = self
            .conn
            .execute("DELETE FROM settings WHERE key = ?1", params![key])
            .await
            .map_err(|e| StorageError::Query(format!("remove: {e}")))?;
        Ok(count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_storage() -> LibSqlStorage {
        LibSqlStorage::new_memory().await.unwrap()
    }

    #[tokio::test]
    async fn save_load_remove() {
        let storage = test_storage().await;

        storage
            .save("persist:root", &serde_json::json!({"version": 1}))
            .await
            .unwrap();
        let fetched = storage.load("persist:root").await.unwrap().unwrap();
        assert_eq!(fetched["version"], 1);

        storage
            .save("persist:root", &serde_json::json!({"version": 2}))
            .await
            .unwrap();
        let fetched = storage.load("persist:root").await.unwrap().unwrap();
        assert_eq!(fetched["version"], 2);

        assert!(storage.remove("persist:root").await.unwrap());
        assert!(storage.load("persist:root").await.unwrap().is_none());
        assert!(!storage.remove("persist:root").await.unwrap());
    }

    #[tokio::test]
    async fn missing_key_is_none() {
        let storage = test_storage().await;
        assert!(storage.load("nothing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn file_backed_storage_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("wizard.db");

        {
            let storage = LibSqlStorage::new_local(&path).await.unwrap();
            storage
                .save("persist:root", &serde_json::json!({"personalInfo": {"name": "Sara"}}))
                .await
                .unwrap();
        }

        let reopened = LibSqlStorage::new_local(&path).await.unwrap();
        let value = reopened.load("persist:root").await.unwrap().unwrap();
        assert_eq!(value["personalInfo"]["name"], "Sara");
    }
}
