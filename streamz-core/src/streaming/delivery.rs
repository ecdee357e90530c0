//! Range-aware video delivery
//!
//! Resolves a video identifier through the injected store, downloads the full
//! payload, and answers with either the whole payload or the requested byte
//! range. The payload length, not any stored size, drives every header so the
//! headers always agree with the bytes sent.

use std::sync::Arc;

use axum::http::header::{
    ACCEPT_RANGES, CACHE_CONTROL, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE,
};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use tracing::{debug, error, info, warn};

use super::error::DeliveryError;
use super::range::{RangeSpec, parse_range_header};
use crate::storage::{VIDEO_CONTENT_TYPE, VideoStore};

/// Cache policy for video payloads; stored objects never change in place.
pub const VIDEO_CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

/// Successful delivery outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoDelivery {
    /// Whole payload, served as `200 OK`
    Full { payload: Bytes },
    /// Requested slice, served as `206 Partial Content`
    Partial {
        payload: Bytes,
        range: RangeSpec,
        total_size: u64,
    },
}

impl VideoDelivery {
    /// HTTP status of this outcome.
    pub fn status(&self) -> StatusCode {
        match self {
            VideoDelivery::Full { .. } => StatusCode::OK,
            VideoDelivery::Partial { .. } => StatusCode::PARTIAL_CONTENT,
        }
    }

    /// Bytes sent in the response body.
    pub fn body(&self) -> &Bytes {
        match self {
            VideoDelivery::Full { payload } | VideoDelivery::Partial { payload, .. } => payload,
        }
    }

    /// Length of the complete stored payload.
    pub fn total_size(&self) -> u64 {
        match self {
            VideoDelivery::Full { payload } => payload.len() as u64,
            VideoDelivery::Partial { total_size, .. } => *total_size,
        }
    }

    /// `Content-Range` value, present only for partial responses.
    pub fn content_range(&self) -> Option<String> {
        match self {
            VideoDelivery::Full { .. } => None,
            VideoDelivery::Partial {
                range, total_size, ..
            } => Some(range.content_range(*total_size)),
        }
    }
}

impl IntoResponse for VideoDelivery {
    fn into_response(self) -> Response {
        let status = self.status();
        let content_range = self.content_range();
        let body = match self {
            VideoDelivery::Full { payload } | VideoDelivery::Partial { payload, .. } => payload,
        };

        let content_length = HeaderValue::from(body.len());

        let mut response = (status, body).into_response();
        let headers = response.headers_mut();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(VIDEO_CONTENT_TYPE));
        headers.insert(CONTENT_LENGTH, content_length);
        headers.insert(ACCEPT_RANGES, HeaderValue::from_static("bytes"));
        headers.insert(CACHE_CONTROL, HeaderValue::from_static(VIDEO_CACHE_CONTROL));
        if let Some(value) = content_range.and_then(|v| HeaderValue::from_str(&v).ok()) {
            headers.insert(CONTENT_RANGE, value);
        }
        response
    }
}

/// Serves video payloads with HTTP range semantics.
///
/// Holds only the injected store; every call is independent, so one instance
/// is shared by all concurrent requests.
#[derive(Clone)]
pub struct RangeVideoDelivery {
    store: Arc<dyn VideoStore>,
}

impl RangeVideoDelivery {
    /// Creates a delivery component over `store`.
    pub fn new(store: Arc<dyn VideoStore>) -> Self {
        Self { store }
    }

    /// Serves `video_id`, honoring an optional `Range` header value.
    ///
    /// Metadata is resolved strictly before the payload is fetched. The whole
    /// payload is always downloaded and then sliced.
    ///
    /// # Errors
    /// - `DeliveryError::MetadataNotFound` - Empty id, unknown id, or record without a storage key
    /// - `DeliveryError::PayloadNotFound` - Payload missing or empty in object storage
    /// - `DeliveryError::UnsatisfiableRange` - Range outside the payload or malformed
    /// - `DeliveryError::Transport` - Store failure
    pub async fn serve(
        &self,
        video_id: &str,
        range_header: Option<&str>,
    ) -> Result<VideoDelivery, DeliveryError> {
        info!("Streaming video: {}", video_id);

        let metadata_missing = || DeliveryError::MetadataNotFound {
            video_id: video_id.to_string(),
        };
        if video_id.trim().is_empty() {
            warn!("Rejecting stream request with empty video id");
            return Err(metadata_missing());
        }

        let record = self
            .store
            .find_video_by_id(video_id)
            .await
            .map_err(|e| self.log_failure(video_id, DeliveryError::from_store(video_id, e)))?;
        if record.storage_key.is_empty() {
            warn!("Video {} has no storage key", video_id);
            return Err(metadata_missing());
        }
        debug!("Resolved video {} to {}", video_id, record.storage_key);

        let payload = self
            .store
            .download_payload(&record.storage_key)
            .await
            .map_err(|e| self.log_failure(video_id, DeliveryError::from_store(video_id, e)))?;
        if payload.is_empty() {
            let error = DeliveryError::PayloadNotFound {
                video_id: video_id.to_string(),
                storage_key: record.storage_key.clone(),
            };
            return Err(self.log_failure(video_id, error));
        }

        let total_size = payload.len() as u64;
        let Some(header) = range_header else {
            debug!("Full payload for {}: {} bytes", video_id, total_size);
            return Ok(VideoDelivery::Full { payload });
        };

        let range = match parse_range_header(header, total_size) {
            Ok(range) => range,
            Err(source) => {
                let error = DeliveryError::UnsatisfiableRange {
                    size: total_size,
                    source,
                };
                return Err(self.log_failure(video_id, error));
            }
        };

        debug!(
            "Range request for {}: {}-{}/{} ({} bytes)",
            video_id,
            range.start,
            range.end,
            total_size,
            range.len()
        );

        // start <= end < payload.len()
        let chunk = payload.slice(range.start as usize..=range.end as usize);
        Ok(VideoDelivery::Partial {
            payload: chunk,
            range,
            total_size,
        })
    }

    fn log_failure(&self, video_id: &str, error: DeliveryError) -> DeliveryError {
        match &error {
            DeliveryError::MetadataNotFound { .. } => {
                warn!(
                    backend = self.store.backend_name(),
                    "Video not found in database: {}", video_id
                );
            }
            DeliveryError::PayloadNotFound { storage_key, .. } => {
                warn!(
                    backend = self.store.backend_name(),
                    "Video file not found in storage: {} (video {})", storage_key, video_id
                );
            }
            DeliveryError::UnsatisfiableRange { size, source } => {
                debug!("Unsatisfiable range for {} ({} bytes): {}", video_id, size, source);
            }
            DeliveryError::Transport { reason } => {
                error!(
                    backend = self.store.backend_name(),
                    "Error streaming video {}: {}", video_id, reason
                );
            }
        }
        error
    }
}
