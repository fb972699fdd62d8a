//! Export orchestrator: reconcile the blob and annotation stores into a
//! single downloadable ZIP archive.
//!
//! Each export request gets its own staging root (a [`tempfile::TempDir`])
//! holding an `images/` tree with every blob payload and an `annotations/`
//! tree with one derived text file per annotated blob. The two trees are
//! merged into one flat archive namespace and the staging root is removed
//! before the bytes leave this module, on success and on failure alike.

use std::collections::HashMap;
use std::io::{Cursor, Write};
use std::path::Path;

use uuid::Uuid;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use annex_store::{AnnotationStore, BlobStore, StoreError};

/// Download name for the archive attachment.
pub const ARCHIVE_NAME: &str = "export.zip";

/// Media type of the archive.
pub const ARCHIVE_MIME: &str = "application/zip";

const IMAGES_SUBDIR: &str = "images";
const ANNOTATIONS_SUBDIR: &str = "annotations";
const ANNOTATION_EXT: &str = "txt";

/// Export the entire store contents as ZIP bytes.
///
/// Operates over whatever the two stores hold at call time; an empty store
/// yields a valid, empty archive. The staging tree lives under the system
/// temporary directory for the duration of the call.
pub async fn export_archive(
    blobs: &BlobStore,
    annotations: &AnnotationStore,
) -> Result<Vec<u8>, ExportError> {
    export_archive_in(&std::env::temp_dir(), blobs, annotations).await
}

/// Like [`export_archive`], with the staging root allocated inside
/// `parent`. Whatever happens, nothing is left behind under `parent` when
/// this returns.
pub async fn export_archive_in(
    parent: &Path,
    blobs: &BlobStore,
    annotations: &AnnotationStore,
) -> Result<Vec<u8>, ExportError> {
    // A fresh unique root per request: guaranteed-empty staging, and
    // concurrent exports cannot touch each other's files.
    let staging = tempfile::tempdir_in(parent)?;

    let result = build_archive(staging.path(), blobs, annotations).await;

    // Unconditional teardown. A cleanup failure is logged, never surfaced,
    // so it cannot mask a processing error.
    if let Err(e) = staging.close() {
        tracing::warn!(error = %e, "failed to remove export staging directory");
    }

    result
}

/// Materialize both stores under `root` and package the result.
async fn build_archive(
    root: &Path,
    blobs: &BlobStore,
    annotations: &AnnotationStore,
) -> Result<Vec<u8>, ExportError> {
    let images_dir = root.join(IMAGES_SUBDIR);
    let annotations_dir = root.join(ANNOTATIONS_SUBDIR);
    std::fs::create_dir_all(&images_dir)?;
    std::fs::create_dir_all(&annotations_dir)?;

    // Pass 1: write every blob payload, recording blob_id -> archive name.
    // Duplicate names get an occurrence counter inserted before the
    // extension so the derived annotation names below stay correlated.
    let mut archive_names: HashMap<Uuid, String> = HashMap::new();
    let mut occurrences: HashMap<String, u32> = HashMap::new();

    for blob in blobs.list().await? {
        let Some(data) = blobs.read(blob.id).await? else {
            tracing::warn!(blob_id = %blob.id, name = %blob.name, "blob row without payload, skipping");
            continue;
        };

        let file_name = disambiguate(&blob.name, &mut occurrences);
        std::fs::write(images_dir.join(&file_name), &data)?;
        archive_names.insert(blob.id, file_name);
    }

    tracing::debug!(blobs = archive_names.len(), "export staged blob payloads");

    // Pass 2: one text file per annotated blob. The stores are read in two
    // unsynchronized passes, so an annotation may reference a blob that
    // never made it into the map (dangling, or deleted since pass 1) -
    // those are skipped rather than failing the export. Later annotations
    // of the same blob overwrite earlier ones: last write wins.
    for annotation in annotations.list().await? {
        let Some(file_name) = archive_names.get(&annotation.blob_id) else {
            tracing::debug!(
                annotation_id = %annotation.id,
                blob_id = %annotation.blob_id,
                "annotation references no stored blob, skipping"
            );
            continue;
        };

        let text_name = format!("{}.{}", stem(file_name), ANNOTATION_EXT);
        let text = serde_json::to_string(&annotation.data)?;
        std::fs::write(annotations_dir.join(text_name), text)?;
    }

    // Pass 3: walk both trees into one flat archive namespace.
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    add_dir(&mut writer, &images_dir, "", options)?;
    add_dir(&mut writer, &annotations_dir, "", options)?;

    Ok(writer.finish()?.into_inner())
}

/// Resolve the archive file name for a blob, counting occurrences per
/// distinct stored name: `img.png`, `img (1).png`, `img (2).png`, ...
fn disambiguate(name: &str, occurrences: &mut HashMap<String, u32>) -> String {
    let count = occurrences.entry(name.to_string()).or_insert(0);
    let file_name = if *count == 0 {
        name.to_string()
    } else {
        match name.split_once('.') {
            Some((stem, ext)) => format!("{} ({}).{}", stem, count, ext),
            None => format!("{} ({})", name, count),
        }
    };
    *count += 1;
    file_name
}

/// The portion of a file name before its first `.`.
fn stem(file_name: &str) -> &str {
    file_name.split('.').next().unwrap_or(file_name)
}

/// Recursively add every file under `dir` to the archive, named relative
/// to the walk root.
fn add_dir(
    writer: &mut ZipWriter<Cursor<Vec<u8>>>,
    dir: &Path,
    prefix: &str,
    options: SimpleFileOptions,
) -> Result<(), ExportError> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let relative = if prefix.is_empty() {
            name
        } else {
            format!("{}/{}", prefix, name)
        };

        if entry.file_type()?.is_dir() {
            add_dir(writer, &entry.path(), &relative, options)?;
        } else {
            writer.start_file(relative, options)?;
            writer.write_all(&std::fs::read(entry.path())?)?;
        }
    }
    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disambiguate_counts_per_name() {
        let mut seen = HashMap::new();
        assert_eq!(disambiguate("img.png", &mut seen), "img.png");
        assert_eq!(disambiguate("img.png", &mut seen), "img (1).png");
        assert_eq!(disambiguate("img.png", &mut seen), "img (2).png");
        assert_eq!(disambiguate("other.png", &mut seen), "other.png");
    }

    #[test]
    fn test_disambiguate_without_extension() {
        let mut seen = HashMap::new();
        assert_eq!(disambiguate("raw", &mut seen), "raw");
        assert_eq!(disambiguate("raw", &mut seen), "raw (1)");
    }

    #[test]
    fn test_stem_takes_portion_before_first_dot() {
        assert_eq!(stem("img.png"), "img");
        assert_eq!(stem("archive.tar.gz"), "archive");
        assert_eq!(stem("noext"), "noext");
        assert_eq!(stem("img (1).png"), "img (1)");
    }
}
