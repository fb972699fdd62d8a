//! SQLite database for blob and annotation metadata.

use std::path::Path;

use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions},
    Row,
};
use uuid::Uuid;

use crate::error::Result;

/// Blob metadata stored in SQLite. The payload itself lives in object
/// storage under the blob's id.
#[derive(Debug, Clone)]
pub struct BlobRow {
    pub id: Uuid,
    pub name: String,
    pub mime_type: String,
    pub size: i64,
    pub created_at: i64,
}

/// Annotation record as stored. `data` is the serialized JSON mapping.
#[derive(Debug, Clone)]
pub struct AnnotationRow {
    pub id: Uuid,
    pub blob_id: Uuid,
    pub data: String,
    pub created_at: i64,
}

fn blob_from_row(r: &sqlx::sqlite::SqliteRow) -> BlobRow {
    BlobRow {
        id: r.get("id"),
        name: r.get("name"),
        mime_type: r.get("mime_type"),
        size: r.get("size"),
        created_at: r.get("created_at"),
    }
}

fn annotation_from_row(r: &sqlx::sqlite::SqliteRow) -> AnnotationRow {
    AnnotationRow {
        id: r.get("id"),
        blob_id: r.get("blob_id"),
        data: r.get("data"),
        created_at: r.get("created_at"),
    }
}

/// SQLite database connection pool.
#[derive(Debug, Clone)]
pub(crate) struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Create a new database connection from a file path.
    pub async fn new(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.run_migrations().await?;
        Ok(db)
    }

    /// Create an in-memory database.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(":memory:")
            .journal_mode(SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.run_migrations().await?;
        Ok(db)
    }

    /// Run database migrations.
    async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Insert a new blob record.
    pub async fn insert_blob(&self, id: Uuid, name: &str, mime_type: &str, size: i64) -> Result<()> {
        let now = chrono::Utc::now().timestamp();
        sqlx::query(
            r#"
            INSERT INTO blobs (id, name, mime_type, size, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(mime_type)
        .bind(size)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Get blob metadata by id.
    pub async fn get_blob(&self, id: Uuid) -> Result<Option<BlobRow>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, mime_type, size, created_at
            FROM blobs
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(blob_from_row))
    }

    /// Get the newest blob with the given name.
    pub async fn find_blob_by_name(&self, name: &str) -> Result<Option<BlobRow>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, mime_type, size, created_at
            FROM blobs
            WHERE name = ?
            ORDER BY rowid DESC
            LIMIT 1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(blob_from_row))
    }

    /// Get a blob matching both id and name exactly.
    pub async fn get_blob_by_id_and_name(&self, id: Uuid, name: &str) -> Result<Option<BlobRow>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, mime_type, size, created_at
            FROM blobs
            WHERE id = ? AND name = ?
            "#,
        )
        .bind(id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(blob_from_row))
    }

    /// List all blobs in insertion order.
    pub async fn list_blobs(&self) -> Result<Vec<BlobRow>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, mime_type, size, created_at
            FROM blobs
            ORDER BY rowid ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(blob_from_row).collect())
    }

    /// Delete a blob record.
    pub async fn delete_blob(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM blobs WHERE id = ?
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Insert a new annotation record.
    pub async fn insert_annotation(&self, id: Uuid, blob_id: Uuid, data: &str) -> Result<()> {
        let now = chrono::Utc::now().timestamp();
        sqlx::query(
            r#"
            INSERT INTO annotations (id, blob_id, data, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(id)
        .bind(blob_id)
        .bind(data)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Get an annotation by id.
    pub async fn get_annotation(&self, id: Uuid) -> Result<Option<AnnotationRow>> {
        let row = sqlx::query(
            r#"
            SELECT id, blob_id, data, created_at
            FROM annotations
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(annotation_from_row))
    }

    /// List annotations for one blob, newest first.
    pub async fn annotations_for_blob(&self, blob_id: Uuid) -> Result<Vec<AnnotationRow>> {
        let rows = sqlx::query(
            r#"
            SELECT id, blob_id, data, created_at
            FROM annotations
            WHERE blob_id = ?
            ORDER BY rowid DESC
            "#,
        )
        .bind(blob_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(annotation_from_row).collect())
    }

    /// List all annotations in insertion order.
    pub async fn list_annotations(&self) -> Result<Vec<AnnotationRow>> {
        let rows = sqlx::query(
            r#"
            SELECT id, blob_id, data, created_at
            FROM annotations
            ORDER BY rowid ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(annotation_from_row).collect())
    }

    /// Replace an annotation's data wholesale.
    pub async fn update_annotation_data(&self, id: Uuid, data: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE annotations SET data = ? WHERE id = ?
            "#,
        )
        .bind(data)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete an annotation record.
    pub async fn delete_annotation(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM annotations WHERE id = ?
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete every annotation referencing a blob. Returns the count removed.
    pub async fn delete_annotations_for_blob(&self, blob_id: Uuid) -> Result<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM annotations WHERE blob_id = ?
            "#,
        )
        .bind(blob_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
impl Database {
    /// Count blobs.
    pub async fn count_blobs(&self) -> Result<i64> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) as count FROM blobs
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(row.get("count"))
    }

    /// Count annotations.
    pub async fn count_annotations(&self) -> Result<i64> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) as count FROM annotations
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(row.get("count"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_database() {
        let db = Database::in_memory().await.unwrap();
        let id = Uuid::new_v4();

        db.insert_blob(id, "cat.png", "image/png", 1024).await.unwrap();

        let meta = db.get_blob(id).await.unwrap().unwrap();
        assert_eq!(meta.name, "cat.png");
        assert_eq!(meta.mime_type, "image/png");
        assert_eq!(meta.size, 1024);

        let blobs = db.list_blobs().await.unwrap();
        assert_eq!(blobs.len(), 1);
        assert_eq!(blobs[0].id, id);

        assert!(db.delete_blob(id).await.unwrap());
        assert!(db.get_blob(id).await.unwrap().is_none());
        assert!(!db.delete_blob(id).await.unwrap());
    }

    #[tokio::test]
    async fn test_find_blob_by_name_returns_newest() {
        let db = Database::in_memory().await.unwrap();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();

        db.insert_blob(first, "dup.png", "image/png", 1).await.unwrap();
        db.insert_blob(second, "dup.png", "image/png", 2).await.unwrap();

        let found = db.find_blob_by_name("dup.png").await.unwrap().unwrap();
        assert_eq!(found.id, second);

        assert!(db.find_blob_by_name("missing.png").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_blob_by_id_and_name_requires_both() {
        let db = Database::in_memory().await.unwrap();
        let id = Uuid::new_v4();
        db.insert_blob(id, "dog.jpg", "image/jpeg", 10).await.unwrap();

        assert!(db
            .get_blob_by_id_and_name(id, "dog.jpg")
            .await
            .unwrap()
            .is_some());
        assert!(db
            .get_blob_by_id_and_name(id, "other.jpg")
            .await
            .unwrap()
            .is_none());
        assert!(db
            .get_blob_by_id_and_name(Uuid::new_v4(), "dog.jpg")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_annotation_queries() {
        let db = Database::in_memory().await.unwrap();
        let blob_id = Uuid::new_v4();
        let a1 = Uuid::new_v4();
        let a2 = Uuid::new_v4();

        db.insert_annotation(a1, blob_id, r#"{"label":"ear"}"#)
            .await
            .unwrap();
        db.insert_annotation(a2, blob_id, r#"{"label":"tail"}"#)
            .await
            .unwrap();

        // Newest first for the per-blob view
        let for_blob = db.annotations_for_blob(blob_id).await.unwrap();
        assert_eq!(for_blob.len(), 2);
        assert_eq!(for_blob[0].id, a2);
        assert_eq!(for_blob[1].id, a1);

        // Insertion order for the full listing
        let all = db.list_annotations().await.unwrap();
        assert_eq!(all[0].id, a1);
        assert_eq!(all[1].id, a2);

        assert!(db
            .update_annotation_data(a1, r#"{"label":"nose"}"#)
            .await
            .unwrap());
        let updated = db.get_annotation(a1).await.unwrap().unwrap();
        assert_eq!(updated.data, r#"{"label":"nose"}"#);

        assert!(db.delete_annotation(a1).await.unwrap());
        assert!(!db.delete_annotation(a1).await.unwrap());
        assert_eq!(db.count_annotations().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_delete_annotations_for_blob() {
        let db = Database::in_memory().await.unwrap();
        let blob_id = Uuid::new_v4();
        let other = Uuid::new_v4();

        db.insert_annotation(Uuid::new_v4(), blob_id, "{}").await.unwrap();
        db.insert_annotation(Uuid::new_v4(), blob_id, "{}").await.unwrap();
        db.insert_annotation(Uuid::new_v4(), other, "{}").await.unwrap();

        let removed = db.delete_annotations_for_blob(blob_id).await.unwrap();
        assert_eq!(removed, 2);
        assert_eq!(db.count_annotations().await.unwrap(), 1);
        assert!(db.annotations_for_blob(blob_id).await.unwrap().is_empty());
    }
}
