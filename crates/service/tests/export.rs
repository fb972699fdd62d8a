//! Integration tests for the export orchestrator

mod common;

use std::io::{Cursor, Read};

use serde_json::json;

use annex_service::export;

fn entry_names(bytes: &[u8]) -> Vec<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes.to_vec())).unwrap();
    (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect()
}

fn entry_bytes(bytes: &[u8], name: &str) -> Vec<u8> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes.to_vec())).unwrap();
    let mut file = archive.by_name(name).unwrap();
    let mut out = Vec::new();
    file.read_to_end(&mut out).unwrap();
    out
}

fn entry_text(bytes: &[u8], name: &str) -> String {
    String::from_utf8(entry_bytes(bytes, name)).unwrap()
}

#[tokio::test]
async fn test_empty_store_yields_valid_empty_archive() {
    let state = common::setup_state().await;

    let archive = export::export_archive(state.blobs(), state.annotations())
        .await
        .unwrap();

    assert!(entry_names(&archive).is_empty());
}

#[tokio::test]
async fn test_blobs_without_annotations_export_one_entry_each() {
    let state = common::setup_state().await;

    for i in 0..4 {
        state
            .blobs()
            .put(vec![i as u8; 16], &format!("img{}.png", i))
            .await
            .unwrap();
    }

    let archive = export::export_archive(state.blobs(), state.annotations())
        .await
        .unwrap();

    let mut names = entry_names(&archive);
    names.sort();
    assert_eq!(names, vec!["img0.png", "img1.png", "img2.png", "img3.png"]);
}

#[tokio::test]
async fn test_blob_payloads_are_byte_identical_in_archive() {
    let state = common::setup_state().await;

    let payload = b"\x89PNG\r\n\x1a\n raw bytes \x00\x01\x02".to_vec();
    state.blobs().put(payload.clone(), "raw.png").await.unwrap();

    let archive = export::export_archive(state.blobs(), state.annotations())
        .await
        .unwrap();

    assert_eq!(entry_bytes(&archive, "raw.png"), payload);
}

#[tokio::test]
async fn test_last_annotation_wins_on_derived_filename() {
    let state = common::setup_state().await;

    let blob_id = state.blobs().put(b"img".to_vec(), "cat.png").await.unwrap();
    state
        .annotations()
        .insert(blob_id, json!({"ear": [[1, 2]]}))
        .await
        .unwrap();
    let last = json!({"tail": [[3, 4], [5, 6]]});
    state.annotations().insert(blob_id, last.clone()).await.unwrap();

    let archive = export::export_archive(state.blobs(), state.annotations())
        .await
        .unwrap();

    let mut names = entry_names(&archive);
    names.sort();
    assert_eq!(names, vec!["cat.png", "cat.txt"]);

    let text = entry_text(&archive, "cat.txt");
    assert_eq!(text, serde_json::to_string(&last).unwrap());
}

#[tokio::test]
async fn test_dangling_annotation_is_silently_skipped() {
    let state = common::setup_state().await;

    state.blobs().put(b"img".to_vec(), "kept.png").await.unwrap();
    // references no stored blob
    state
        .annotations()
        .insert(uuid::Uuid::new_v4(), json!({"orphan": true}))
        .await
        .unwrap();

    let archive = export::export_archive(state.blobs(), state.annotations())
        .await
        .unwrap();

    assert_eq!(entry_names(&archive), vec!["kept.png"]);
}

#[tokio::test]
async fn test_duplicate_names_are_disambiguated() {
    let state = common::setup_state().await;

    let first = state.blobs().put(b"one".to_vec(), "img.png").await.unwrap();
    let second = state.blobs().put(b"two".to_vec(), "img.png").await.unwrap();
    state
        .annotations()
        .insert(first, json!({"n": 1}))
        .await
        .unwrap();
    state
        .annotations()
        .insert(second, json!({"n": 2}))
        .await
        .unwrap();

    let archive = export::export_archive(state.blobs(), state.annotations())
        .await
        .unwrap();

    let mut names = entry_names(&archive);
    names.sort();
    assert_eq!(
        names,
        vec!["img (1).png", "img (1).txt", "img.png", "img.txt"]
    );

    // each annotation lands next to its own blob
    assert_eq!(entry_text(&archive, "img.txt"), r#"{"n":1}"#);
    assert_eq!(entry_text(&archive, "img (1).txt"), r#"{"n":2}"#);
    assert_eq!(entry_bytes(&archive, "img.png"), b"one");
    assert_eq!(entry_bytes(&archive, "img (1).png"), b"two");
}

#[tokio::test]
async fn test_staging_is_removed_after_success() {
    let state = common::setup_state().await;
    let parent = tempfile::tempdir().unwrap();

    state.blobs().put(b"img".to_vec(), "a.png").await.unwrap();

    export::export_archive_in(parent.path(), state.blobs(), state.annotations())
        .await
        .unwrap();

    let leftovers: Vec<_> = std::fs::read_dir(parent.path()).unwrap().collect();
    assert!(leftovers.is_empty());
}

#[tokio::test]
async fn test_staging_is_removed_after_failure() {
    let state = common::setup_state().await;
    let parent = tempfile::tempdir().unwrap();

    // A path separator in the name makes the staging write fail: the
    // nested parent directory does not exist.
    state
        .blobs()
        .put(b"img".to_vec(), "nested/dir.png")
        .await
        .unwrap();

    let result =
        export::export_archive_in(parent.path(), state.blobs(), state.annotations()).await;
    assert!(result.is_err());

    let leftovers: Vec<_> = std::fs::read_dir(parent.path()).unwrap().collect();
    assert!(leftovers.is_empty());
}

#[tokio::test]
async fn test_blob_deleted_between_passes_is_tolerated() {
    let state = common::setup_state().await;

    let kept = state.blobs().put(b"img".to_vec(), "kept.png").await.unwrap();
    let gone = state.blobs().put(b"img".to_vec(), "gone.png").await.unwrap();
    state.annotations().insert(kept, json!({})).await.unwrap();
    state.annotations().insert(gone, json!({})).await.unwrap();

    // the annotation referencing it becomes dangling
    state.blobs().delete(gone).await.unwrap();

    let archive = export::export_archive(state.blobs(), state.annotations())
        .await
        .unwrap();

    let mut names = entry_names(&archive);
    names.sort();
    assert_eq!(names, vec!["kept.png", "kept.txt"]);
}
