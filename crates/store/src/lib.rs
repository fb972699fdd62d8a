//! SQLite + Object Storage Backend
//!
//! This crate provides the two store adapters behind the annex service:
//! a blob store for named binary payloads (SQLite rows + pluggable object
//! storage) and an annotation store for structured records referencing
//! blobs by id.
//!
//! # Example
//!
//! ```rust,no_run
//! use annex_store::Store;
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), annex_store::StoreError> {
//! // Persistent store rooted at a data directory
//! let store = Store::new_local(Path::new("/var/lib/annex")).await?;
//!
//! let id = store.blobs().put(b"bytes".to_vec(), "cat.png").await?;
//! let blob = store.blobs().get(id).await?;
//! # Ok(())
//! # }
//! ```

mod annotations;
mod blobs;
mod database;
mod error;
mod storage;

pub use annotations::{Annotation, AnnotationStore};
pub use blobs::{Blob, BlobStore};
pub use error::{Result, StoreError};
pub use storage::StorageConfig;

use std::path::Path;

use database::Database;
use storage::Storage;

/// Handle bundling the blob and annotation stores over one metadata
/// database.
#[derive(Debug, Clone)]
pub struct Store {
    blobs: BlobStore,
    annotations: AnnotationStore,
}

impl Store {
    /// Open a store backed by the local filesystem: SQLite database at
    /// `data_dir/metadata.db`, payloads under `data_dir/objects/`.
    pub async fn new_local(data_dir: &Path) -> Result<Self> {
        let db = Database::new(&data_dir.join("metadata.db")).await?;
        let storage = Storage::new(StorageConfig::Local {
            path: data_dir.join("objects"),
        })
        .await?;
        Ok(Self::from_parts(db, storage))
    }

    /// Open a fully ephemeral store (in-memory database + in-memory object
    /// storage). Data is lost on drop. Useful for testing.
    pub async fn new_ephemeral() -> Result<Self> {
        let db = Database::in_memory().await?;
        let storage = Storage::new(StorageConfig::Memory).await?;
        Ok(Self::from_parts(db, storage))
    }

    fn from_parts(db: Database, storage: Storage) -> Self {
        Self {
            blobs: BlobStore::new(db.clone(), storage),
            annotations: AnnotationStore::new(db),
        }
    }

    pub fn blobs(&self) -> &BlobStore {
        &self.blobs
    }

    pub fn annotations(&self) -> &AnnotationStore {
        &self.annotations
    }
}
