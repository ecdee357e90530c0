//! In-memory video store
//!
//! Holds metadata documents and payloads in process memory. Backs the tests
//! and the local directory store.

use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;
use tracing::debug;

use super::{
    StoreError, StoreResult, VideoCatalog, VideoDocument, VideoQuery, VideoRecord, VideoStore,
};

/// Video store backed by hash maps.
#[derive(Debug, Default)]
pub struct InMemoryVideoStore {
    documents: RwLock<HashMap<String, VideoDocument>>,
    payloads: RwLock<HashMap<String, Bytes>>,
}

impl InMemoryVideoStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a metadata document, replacing any document with the same id.
    pub fn insert_document(&self, document: VideoDocument) {
        self.documents.write().insert(document.id.clone(), document);
    }

    /// Stores a payload under `storage_key`.
    pub fn insert_payload(&self, storage_key: impl Into<String>, payload: impl Into<Bytes>) {
        self.payloads.write().insert(storage_key.into(), payload.into());
    }

    /// Inserts a document together with the payload it points at.
    pub fn insert_video(&self, document: VideoDocument, payload: impl Into<Bytes>) {
        self.insert_payload(document.storage_path.clone(), payload);
        self.insert_document(document);
    }

    /// Number of metadata documents held.
    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    /// Whether the store holds no documents.
    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }
}

#[async_trait]
impl VideoStore for InMemoryVideoStore {
    async fn find_video_by_id(&self, video_id: &str) -> StoreResult<VideoRecord> {
        self.documents
            .read()
            .get(video_id)
            .map(VideoRecord::from)
            .ok_or_else(|| StoreError::MetadataNotFound {
                video_id: video_id.to_string(),
            })
    }

    async fn download_payload(&self, storage_key: &str) -> StoreResult<Bytes> {
        let payload = self.payloads.read().get(storage_key).cloned();
        match payload {
            Some(bytes) if !bytes.is_empty() => {
                debug!("InMemoryVideoStore: {} bytes for {}", bytes.len(), storage_key);
                Ok(bytes)
            }
            _ => Err(StoreError::PayloadNotFound {
                storage_key: storage_key.to_string(),
            }),
        }
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[async_trait]
impl VideoCatalog for InMemoryVideoStore {
    async fn list_videos(&self, query: &VideoQuery) -> StoreResult<Vec<VideoDocument>> {
        let documents: Vec<VideoDocument> = self.documents.read().values().cloned().collect();
        Ok(query.apply(documents))
    }

    async fn count_videos(&self) -> StoreResult<u64> {
        Ok(self.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(id: &str, storage_path: &str) -> VideoDocument {
        VideoDocument {
            id: id.to_string(),
            storage_path: storage_path.to_string(),
            ..VideoDocument::default()
        }
    }

    #[tokio::test]
    async fn test_find_and_download() {
        let store = InMemoryVideoStore::new();
        store.insert_video(document("abc123", "bali/a.mp4"), vec![1u8, 2, 3]);

        let record = store.find_video_by_id("abc123").await.unwrap();
        assert_eq!(record.storage_key, "bali/a.mp4");

        let payload = store.download_payload(&record.storage_key).await.unwrap();
        assert_eq!(payload.as_ref(), &[1, 2, 3]);
    }

    #[tokio::test]
    async fn test_unknown_id_is_metadata_not_found() {
        let store = InMemoryVideoStore::new();
        let result = store.find_video_by_id("missing").await;
        assert_eq!(
            result,
            Err(StoreError::MetadataNotFound {
                video_id: "missing".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_missing_or_empty_payload_is_payload_not_found() {
        let store = InMemoryVideoStore::new();
        store.insert_document(document("a", "a.mp4"));
        store.insert_video(document("b", "b.mp4"), Vec::<u8>::new());

        assert!(matches!(
            store.download_payload("a.mp4").await,
            Err(StoreError::PayloadNotFound { .. })
        ));
        assert!(matches!(
            store.download_payload("b.mp4").await,
            Err(StoreError::PayloadNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_catalog_counts_documents() {
        let store = InMemoryVideoStore::new();
        assert!(store.is_empty());
        store.insert_document(document("a", "a.mp4"));
        store.insert_document(document("b", "b.mp4"));
        assert_eq!(store.count_videos().await.unwrap(), 2);
        assert_eq!(store.list_videos(&VideoQuery::default()).await.unwrap().len(), 2);
    }
}
