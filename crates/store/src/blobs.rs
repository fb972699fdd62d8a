//! Blob store adapter: SQLite metadata + object-storage payloads.

use bytes::Bytes;
use tracing::{debug, info};
use uuid::Uuid;

use crate::database::Database;
use crate::error::Result;
use crate::storage::Storage;

/// A stored image blob. The raw payload is fetched separately via
/// [`BlobStore::read`].
pub use crate::database::BlobRow as Blob;

/// Store for named binary objects, addressable by a generated id.
#[derive(Debug, Clone)]
pub struct BlobStore {
    db: Database,
    storage: Storage,
}

impl BlobStore {
    pub(crate) fn new(db: Database, storage: Storage) -> Self {
        Self { db, storage }
    }

    /// Store a payload under a user-supplied name and return the assigned id.
    ///
    /// Names are not unique; every upload gets a fresh id. The MIME type is
    /// detected from the name's extension.
    pub async fn put(&self, data: Vec<u8>, name: &str) -> Result<Uuid> {
        let id = Uuid::new_v4();
        let size = data.len();
        let mime_type = mime_guess::from_path(name)
            .first_or_octet_stream()
            .to_string();

        debug!(blob_id = %id, name = %name, size = size, "storing blob");

        self.storage.put_data(&id, Bytes::from(data)).await?;
        self.db.insert_blob(id, name, &mime_type, size as i64).await?;

        info!(blob_id = %id, name = %name, size = size, "blob stored successfully");
        Ok(id)
    }

    /// Get blob metadata by id.
    pub async fn get(&self, id: Uuid) -> Result<Option<Blob>> {
        self.db.get_blob(id).await
    }

    /// Get the newest blob with the given name.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<Blob>> {
        self.db.find_blob_by_name(name).await
    }

    /// Get a blob matching both id and name exactly.
    pub async fn find_by_id_and_name(&self, id: Uuid, name: &str) -> Result<Option<Blob>> {
        self.db.get_blob_by_id_and_name(id, name).await
    }

    /// Fetch a blob's raw payload.
    pub async fn read(&self, id: Uuid) -> Result<Option<Bytes>> {
        self.storage.get_data(&id).await
    }

    /// List every blob in insertion order.
    pub async fn list(&self) -> Result<Vec<Blob>> {
        self.db.list_blobs().await
    }

    /// Delete a blob's metadata row and payload. Returns false when the id
    /// does not resolve to a stored blob.
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        if self.db.get_blob(id).await?.is_none() {
            return Ok(false);
        }

        self.storage.delete_data(&id).await?;
        self.db.delete_blob(id).await?;

        info!(blob_id = %id, "blob deleted");
        Ok(true)
    }
}
