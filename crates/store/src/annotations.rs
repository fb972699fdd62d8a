//! Annotation store adapter: structured records referencing blobs.

use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::database::{AnnotationRow, Database};
use crate::error::Result;

/// An annotation record attached to a blob. `data` is an arbitrary JSON
/// mapping; no schema is enforced.
#[derive(Debug, Clone, Serialize)]
pub struct Annotation {
    pub id: Uuid,
    pub blob_id: Uuid,
    pub data: Value,
    pub created_at: i64,
}

impl Annotation {
    fn from_row(row: AnnotationRow) -> Result<Self> {
        let data = serde_json::from_str(&row.data)?;
        Ok(Self {
            id: row.id,
            blob_id: row.blob_id,
            data,
            created_at: row.created_at,
        })
    }
}

/// Store for annotation records, each referencing a blob id.
#[derive(Debug, Clone)]
pub struct AnnotationStore {
    db: Database,
}

impl AnnotationStore {
    pub(crate) fn new(db: Database) -> Self {
        Self { db }
    }

    /// Insert a new annotation and return the assigned id. The referenced
    /// blob is not required to exist.
    pub async fn insert(&self, blob_id: Uuid, data: Value) -> Result<Uuid> {
        let id = Uuid::new_v4();
        let text = serde_json::to_string(&data)?;
        self.db.insert_annotation(id, blob_id, &text).await?;
        debug!(annotation_id = %id, blob_id = %blob_id, "annotation inserted");
        Ok(id)
    }

    /// Get an annotation by id.
    pub async fn get(&self, id: Uuid) -> Result<Option<Annotation>> {
        match self.db.get_annotation(id).await? {
            Some(row) => Ok(Some(Annotation::from_row(row)?)),
            None => Ok(None),
        }
    }

    /// List annotations for one blob, newest first.
    pub async fn find_by_blob(&self, blob_id: Uuid) -> Result<Vec<Annotation>> {
        self.db
            .annotations_for_blob(blob_id)
            .await?
            .into_iter()
            .map(Annotation::from_row)
            .collect()
    }

    /// List every annotation in insertion order.
    pub async fn list(&self) -> Result<Vec<Annotation>> {
        self.db
            .list_annotations()
            .await?
            .into_iter()
            .map(Annotation::from_row)
            .collect()
    }

    /// Replace an annotation's data wholesale. Returns false when the id
    /// does not resolve.
    pub async fn update(&self, id: Uuid, data: Value) -> Result<bool> {
        let text = serde_json::to_string(&data)?;
        self.db.update_annotation_data(id, &text).await
    }

    /// Delete an annotation. Returns false when the id does not resolve.
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        self.db.delete_annotation(id).await
    }

    /// Delete every annotation referencing a blob (cascade helper).
    /// Returns the count removed.
    pub async fn delete_by_blob(&self, blob_id: Uuid) -> Result<u64> {
        self.db.delete_annotations_for_blob(blob_id).await
    }
}
