//! Object storage backend abstraction (local filesystem/memory).

use std::path::PathBuf;
use std::sync::Arc;

use bytes::Bytes;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::path::Path as ObjectPath;
use object_store::ObjectStore;
use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};

/// Configuration for the payload storage backend.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StorageConfig {
    /// In-memory storage (for testing and ephemeral deployments)
    #[default]
    Memory,

    /// Local filesystem storage
    Local {
        /// Path to the storage directory
        path: PathBuf,
    },
}

/// Wrapper around the payload storage backends.
#[derive(Debug, Clone)]
pub(crate) struct Storage {
    inner: Arc<dyn ObjectStore>,
}

impl Storage {
    /// Create a new storage backend from configuration.
    pub async fn new(config: StorageConfig) -> Result<Self> {
        let inner: Arc<dyn ObjectStore> = match &config {
            StorageConfig::Memory => Arc::new(InMemory::new()),

            StorageConfig::Local { path } => {
                // Ensure directory exists
                tokio::fs::create_dir_all(path).await?;
                Arc::new(
                    LocalFileSystem::new_with_prefix(path)
                        .map_err(StoreError::ObjectStore)?,
                )
            }
        };

        Ok(Self { inner })
    }

    /// Build the object path for a blob payload.
    fn data_path(id: &uuid::Uuid) -> ObjectPath {
        ObjectPath::from(format!("images/{}", id))
    }

    /// Put a blob payload into storage.
    pub async fn put_data(&self, id: &uuid::Uuid, data: Bytes) -> Result<()> {
        let path = Self::data_path(id);
        self.inner.put(&path, data.into()).await?;
        Ok(())
    }

    /// Get a blob payload from storage.
    pub async fn get_data(&self, id: &uuid::Uuid) -> Result<Option<Bytes>> {
        let path = Self::data_path(id);
        match self.inner.get(&path).await {
            Ok(result) => {
                let bytes = result.bytes().await?;
                Ok(Some(bytes))
            }
            Err(object_store::Error::NotFound { .. }) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete a blob payload from storage.
    pub async fn delete_data(&self, id: &uuid::Uuid) -> Result<()> {
        let path = Self::data_path(id);
        // Ignore NotFound errors - the payload may already be deleted
        match self.inner.delete(&path).await {
            Ok(()) => Ok(()),
            Err(object_store::Error::NotFound { .. }) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
impl Storage {
    /// Create an in-memory storage backend (test-only).
    pub fn memory() -> Self {
        Self {
            inner: Arc::new(InMemory::new()),
        }
    }

    /// Check if a blob payload exists in storage.
    pub async fn has_data(&self, id: &uuid::Uuid) -> Result<bool> {
        let path = Self::data_path(id);
        match self.inner.head(&path).await {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_memory_storage() {
        let storage = Storage::memory();

        let id = Uuid::new_v4();
        let data = Bytes::from("hello world");

        storage.put_data(&id, data.clone()).await.unwrap();
        let retrieved = storage.get_data(&id).await.unwrap().unwrap();
        assert_eq!(retrieved, data);

        assert!(storage.has_data(&id).await.unwrap());

        storage.delete_data(&id).await.unwrap();
        assert!(!storage.has_data(&id).await.unwrap());
        assert!(storage.get_data(&id).await.unwrap().is_none());

        // Deleting again is not an error
        storage.delete_data(&id).await.unwrap();
    }

    #[tokio::test]
    async fn test_local_storage() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = StorageConfig::Local {
            path: temp_dir.path().to_path_buf(),
        };

        let storage = Storage::new(config).await.unwrap();

        let id = Uuid::new_v4();
        let data = Bytes::from("test data");

        storage.put_data(&id, data.clone()).await.unwrap();
        let retrieved = storage.get_data(&id).await.unwrap().unwrap();
        assert_eq!(retrieved, data);

        // Verify file exists on disk
        let file_path = temp_dir.path().join("images").join(id.to_string());
        assert!(file_path.exists());
    }
}
