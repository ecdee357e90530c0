//! Test fixtures for storage testing.
//!
//! Provides standardized video libraries and stores so tests across crates
//! build identical fixtures.

use std::path::PathBuf;

use chrono::{TimeZone, Utc};

use super::{InMemoryVideoStore, VideoDocument};

/// Deterministic payload of `size` bytes where byte `i` equals `i % 256`.
pub fn patterned_payload(size: usize) -> Vec<u8> {
    (0..size).map(|i| (i % 256) as u8).collect()
}

/// Builds a metadata document for tests.
pub fn video_document(id: &str, location_id: &str, storage_path: &str) -> VideoDocument {
    VideoDocument {
        id: id.to_string(),
        video_id: id.to_string(),
        filename: storage_path
            .rsplit('/')
            .next()
            .unwrap_or(storage_path)
            .to_string(),
        storage_path: storage_path.to_string(),
        location_id: location_id.to_string(),
        location_name: location_id.to_string(),
        created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        ..VideoDocument::default()
    }
}

/// In-memory store holding one video `abc123` with a patterned payload of `size` bytes.
pub fn store_with_video(size: usize) -> InMemoryVideoStore {
    let store = InMemoryVideoStore::new();
    store.insert_video(
        video_document("abc123", "bali", "bali/abc123.mp4"),
        patterned_payload(size),
    );
    store
}

/// Creates a temporary directory populated with patterned video files.
///
/// Each entry is a path relative to the root and a file size in bytes.
///
/// # Panics
///
/// Panics if the temporary directory or files cannot be created.
/// This is acceptable in test fixtures where failures indicate environment issues.
pub fn create_video_library(files: &[(&str, usize)]) -> (tempfile::TempDir, PathBuf) {
    let temp_dir = tempfile::tempdir().unwrap();
    let root = temp_dir.path().join("videos");
    std::fs::create_dir_all(&root).unwrap();

    for (relative, size) in files {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, patterned_payload(*size)).unwrap();
    }

    (temp_dir, root)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patterned_payload_wraps() {
        let payload = patterned_payload(300);
        assert_eq!(payload[255], 255);
        assert_eq!(payload[256], 0);
    }

    #[test]
    fn test_video_library_layout() {
        let (_dir, root) = create_video_library(&[("bali/a.mp4", 4)]);
        assert!(root.join("bali/a.mp4").is_file());
    }
}
