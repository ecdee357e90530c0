//! Local directory video store for development mode
//!
//! Scans a directory of video files once at startup and serves their bytes
//! from disk on demand. Sub-directories act as locations, mirroring the
//! `<location>/<file>` layout of the production bucket.

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::{
    InMemoryVideoStore, StoreError, StoreResult, VideoCatalog, VideoDocument, VideoQuery,
    VideoRecord, VideoStore,
};

/// Location id assigned to files placed directly in the root directory.
const ROOT_LOCATION: &str = "local";

/// Video store over a directory tree.
#[derive(Debug)]
pub struct LocalVideoStore {
    root: PathBuf,
    index: InMemoryVideoStore,
}

impl LocalVideoStore {
    /// Scans `root` recursively and indexes every video file found.
    ///
    /// # Errors
    /// - `std::io::Error` - Root directory cannot be read
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, std::io::Error> {
        let root = root.into();
        let mut files = Vec::new();
        collect_video_files(&root, &mut files).await?;
        files.sort();

        let index = InMemoryVideoStore::new();
        let mut taken_ids = HashSet::new();
        for path in files {
            match document_for_file(&root, &path, &mut taken_ids).await {
                Ok(document) => {
                    debug!("Indexed {} as {}", path.display(), document.id);
                    index.insert_document(document);
                }
                Err(e) => warn!("Skipping {}: {}", path.display(), e),
            }
        }

        info!(
            "Local video store ready: {} videos under {}",
            index.len(),
            root.display()
        );
        Ok(Self { root, index })
    }

    /// Resolves a storage key to a path inside the root, refusing escapes.
    fn resolve(&self, storage_key: &str) -> Option<PathBuf> {
        let relative = Path::new(storage_key);
        let safe = relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
        safe.then(|| self.root.join(relative))
    }
}

#[async_trait]
impl VideoStore for LocalVideoStore {
    async fn find_video_by_id(&self, video_id: &str) -> StoreResult<VideoRecord> {
        self.index.find_video_by_id(video_id).await
    }

    async fn download_payload(&self, storage_key: &str) -> StoreResult<Bytes> {
        let not_found = || StoreError::PayloadNotFound {
            storage_key: storage_key.to_string(),
        };
        let path = self.resolve(storage_key).ok_or_else(not_found)?;

        match tokio::fs::read(&path).await {
            Ok(data) if data.is_empty() => Err(not_found()),
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(not_found()),
            Err(e) => Err(StoreError::transport(format!(
                "failed to read {}: {e}",
                path.display()
            ))),
        }
    }

    fn backend_name(&self) -> &'static str {
        "local"
    }
}

#[async_trait]
impl VideoCatalog for LocalVideoStore {
    async fn list_videos(&self, query: &VideoQuery) -> StoreResult<Vec<VideoDocument>> {
        self.index.list_videos(query).await
    }

    async fn count_videos(&self) -> StoreResult<u64> {
        self.index.count_videos().await
    }
}

fn is_video_file(path: &Path) -> bool {
    mime_guess::from_path(path)
        .first()
        .is_some_and(|mime| mime.type_() == mime_guess::mime::VIDEO)
}

/// Recursively collects video files below `dir`.
fn collect_video_files<'a>(
    dir: &'a Path,
    files: &'a mut Vec<PathBuf>,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<(), std::io::Error>> + Send + 'a>>
{
    Box::pin(async move {
        let mut entries = tokio::fs::read_dir(dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let file_type = entry.file_type().await?;

            if file_type.is_dir() {
                let hidden = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with('.'));
                if hidden {
                    continue;
                }
                if let Err(e) = collect_video_files(&path, files).await {
                    warn!("Failed to scan {}: {}", path.display(), e);
                }
            } else if file_type.is_file() && is_video_file(&path) {
                files.push(path);
            }
        }
        Ok(())
    })
}

async fn document_for_file(
    root: &Path,
    path: &Path,
    taken_ids: &mut HashSet<String>,
) -> Result<VideoDocument, std::io::Error> {
    let metadata = tokio::fs::metadata(path).await?;
    let relative = path.strip_prefix(root).unwrap_or(path);

    let storage_path = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/");

    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("video")
        .to_string();
    let mut id = stem.clone();
    let mut suffix = 2;
    while !taken_ids.insert(id.clone()) {
        id = format!("{stem}-{suffix}");
        suffix += 1;
    }

    let location_id = relative
        .parent()
        .and_then(|p| p.components().next())
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .unwrap_or_else(|| ROOT_LOCATION.to_string());

    let modified: DateTime<Utc> = metadata
        .modified()
        .map(DateTime::<Utc>::from)
        .unwrap_or_else(|_| Utc::now());

    Ok(VideoDocument {
        video_id: id.clone(),
        id,
        filename: path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        storage_path,
        location_name: title_case(&location_id),
        location_id,
        created_at: modified,
        updated_at: modified,
        ..VideoDocument::default()
    })
}

fn title_case(slug: &str) -> String {
    slug.split(['-', '_', ' '])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_fixtures::create_video_library;

    #[tokio::test]
    async fn test_scan_indexes_videos_by_location() {
        let (_dir, root) = create_video_library(&[
            ("bali/sunrise.mp4", 1000),
            ("paris/eiffel.mp4", 500),
            ("notes.txt", 10),
        ]);

        let store = LocalVideoStore::open(&root).await.unwrap();
        assert_eq!(store.count_videos().await.unwrap(), 2);

        let bali = store
            .list_videos(&VideoQuery::for_location("bali"))
            .await
            .unwrap();
        assert_eq!(bali.len(), 1);
        assert_eq!(bali[0].id, "sunrise");
        assert_eq!(bali[0].storage_path, "bali/sunrise.mp4");
        assert_eq!(bali[0].location_name, "Bali");
    }

    #[tokio::test]
    async fn test_download_reads_file_bytes() {
        let (_dir, root) = create_video_library(&[("tokyo/shibuya.mp4", 256)]);
        let store = LocalVideoStore::open(&root).await.unwrap();

        let record = store.find_video_by_id("shibuya").await.unwrap();
        let payload = store.download_payload(&record.storage_key).await.unwrap();
        assert_eq!(payload.len(), 256);
        assert_eq!(payload[10], 10);
    }

    #[tokio::test]
    async fn test_duplicate_stems_get_suffixes() {
        let (_dir, root) =
            create_video_library(&[("bali/beach.mp4", 10), ("dubai/beach.mp4", 10)]);
        let store = LocalVideoStore::open(&root).await.unwrap();

        assert!(store.find_video_by_id("beach").await.is_ok());
        assert!(store.find_video_by_id("beach-2").await.is_ok());
    }

    #[tokio::test]
    async fn test_path_escape_is_rejected() {
        let (_dir, root) = create_video_library(&[("bali/beach.mp4", 10)]);
        let store = LocalVideoStore::open(&root).await.unwrap();

        let result = store.download_payload("../outside.mp4").await;
        assert!(matches!(result, Err(StoreError::PayloadNotFound { .. })));
    }

    #[tokio::test]
    async fn test_deleted_file_is_payload_not_found() {
        let (_dir, root) = create_video_library(&[("vegas/strip.mp4", 32)]);
        let store = LocalVideoStore::open(&root).await.unwrap();
        std::fs::remove_file(root.join("vegas/strip.mp4")).unwrap();

        let result = store.download_payload("vegas/strip.mp4").await;
        assert!(matches!(result, Err(StoreError::PayloadNotFound { .. })));
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("new-york"), "New York");
        assert_eq!(title_case("bali"), "Bali");
    }
}
