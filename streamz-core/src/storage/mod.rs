//! Storage layer for video metadata and payloads.
//!
//! Defines the collaborator interfaces the delivery component and the catalog
//! consume, plus the backends implementing them: the managed Supabase service,
//! an in-memory store, and a local directory store for development.

pub mod document;
pub mod local;
pub mod memory;
pub mod supabase;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_fixtures;

use async_trait::async_trait;
use bytes::Bytes;
pub use document::{Coordinates, Creator, TokenInfo, VideoDocument};
pub use local::LocalVideoStore;
pub use memory::InMemoryVideoStore;
pub use supabase::SupabaseVideoStore;

/// MIME type of every payload served by this system.
pub const VIDEO_CONTENT_TYPE: &str = "video/mp4";

/// Errors reported by store collaborators.
///
/// The set is closed so callers can map every outcome exhaustively.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The identifier has no corresponding metadata record
    #[error("Video metadata not found: {video_id}")]
    MetadataNotFound {
        /// Identifier that failed to resolve
        video_id: String,
    },

    /// The record exists but its payload cannot be retrieved
    #[error("Video payload not found: {storage_key}")]
    PayloadNotFound {
        /// Storage key that failed to resolve
        storage_key: String,
    },

    /// Unexpected failure talking to the store
    #[error("Store transport failure: {reason}")]
    Transport {
        /// Description of the failure
        reason: String,
    },
}

impl StoreError {
    /// Creates a transport error from any displayable cause.
    pub fn transport(reason: impl std::fmt::Display) -> Self {
        StoreError::Transport {
            reason: reason.to_string(),
        }
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Metadata needed to deliver one video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoRecord {
    /// Public identifier of the video
    pub id: String,
    /// Opaque handle for the payload in object storage
    pub storage_key: String,
    /// Stored size hint; delivery always trusts the fetched payload length instead
    pub size_bytes: Option<u64>,
    /// MIME type of the payload
    pub content_type: String,
}

impl VideoRecord {
    /// Creates a record with the fixed video content type.
    pub fn new(id: impl Into<String>, storage_key: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            storage_key: storage_key.into(),
            size_bytes: None,
            content_type: VIDEO_CONTENT_TYPE.to_string(),
        }
    }
}

impl From<&VideoDocument> for VideoRecord {
    fn from(document: &VideoDocument) -> Self {
        VideoRecord::new(document.id.clone(), document.storage_path.clone())
    }
}

/// Lookup capability consumed by video delivery.
///
/// Implementations are shared across concurrent requests and must not hold
/// per-request state.
#[async_trait]
pub trait VideoStore: Send + Sync {
    /// Resolves a video identifier to its record.
    ///
    /// # Errors
    ///
    /// - `StoreError::MetadataNotFound` - No record for this identifier
    /// - `StoreError::Transport` - Store unreachable or returned garbage
    async fn find_video_by_id(&self, video_id: &str) -> StoreResult<VideoRecord>;

    /// Downloads the complete payload stored under `storage_key`.
    ///
    /// # Errors
    ///
    /// - `StoreError::PayloadNotFound` - Nothing stored under this key, or the object is empty
    /// - `StoreError::Transport` - Store unreachable or the transfer failed
    async fn download_payload(&self, storage_key: &str) -> StoreResult<Bytes>;

    /// Short name of the backend for logs and health reports.
    fn backend_name(&self) -> &'static str;
}

/// Ordering of catalog listings by creation time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Oldest first
    Ascending,
    /// Newest first
    #[default]
    Descending,
}

/// Filter and ordering for catalog listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoQuery {
    /// Restrict to one location
    pub location_id: Option<String>,
    /// Ordering by `created_at`
    pub order: SortOrder,
    /// Maximum number of rows
    pub limit: Option<usize>,
}

impl VideoQuery {
    /// All videos, newest first.
    pub fn newest_first() -> Self {
        Self::default()
    }

    /// Videos of one location, newest first.
    pub fn for_location(location_id: impl Into<String>) -> Self {
        Self {
            location_id: Some(location_id.into()),
            ..Self::default()
        }
    }

    /// Applies this query to documents held in memory.
    pub(crate) fn apply(&self, documents: impl IntoIterator<Item = VideoDocument>) -> Vec<VideoDocument> {
        let mut selected: Vec<VideoDocument> = documents
            .into_iter()
            .filter(|doc| {
                self.location_id
                    .as_deref()
                    .is_none_or(|location| doc.location_id == location)
            })
            .collect();

        selected.sort_by(|a, b| match self.order {
            SortOrder::Ascending => a.created_at.cmp(&b.created_at),
            SortOrder::Descending => b.created_at.cmp(&a.created_at),
        });

        if let Some(limit) = self.limit {
            selected.truncate(limit);
        }
        selected
    }
}

/// Listing capability over video metadata rows.
#[async_trait]
pub trait VideoCatalog: Send + Sync {
    /// Lists metadata rows matching `query`.
    ///
    /// # Errors
    ///
    /// - `StoreError::Transport` - Store unreachable or returned garbage
    async fn list_videos(&self, query: &VideoQuery) -> StoreResult<Vec<VideoDocument>>;

    /// Counts all metadata rows; doubles as a connectivity probe.
    ///
    /// # Errors
    ///
    /// - `StoreError::Transport` - Store unreachable or returned garbage
    async fn count_videos(&self) -> StoreResult<u64>;
}
