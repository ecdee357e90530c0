//! Delivery error taxonomy and its HTTP rendering

use axum::Json;
use axum::http::StatusCode;
use axum::http::header::CONTENT_RANGE;
use axum::response::{IntoResponse, Response};

use super::range::RangeError;
use crate::storage::StoreError;

/// Errors produced while serving a video.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    /// No metadata record for the identifier
    #[error("Video not found: {video_id}")]
    MetadataNotFound { video_id: String },

    /// Record exists but its payload is missing from object storage
    #[error("Video file not found for {video_id}: {storage_key}")]
    PayloadNotFound {
        video_id: String,
        storage_key: String,
    },

    /// Requested range cannot be served against the payload
    #[error("Range not satisfiable for {size} bytes: {source}")]
    UnsatisfiableRange {
        size: u64,
        #[source]
        source: RangeError,
    },

    /// Unexpected collaborator failure
    #[error("Failed to stream video: {reason}")]
    Transport { reason: String },
}

impl DeliveryError {
    /// Lifts a store error raised while serving `video_id`.
    pub fn from_store(video_id: &str, error: StoreError) -> Self {
        match error {
            StoreError::MetadataNotFound { .. } => DeliveryError::MetadataNotFound {
                video_id: video_id.to_string(),
            },
            StoreError::PayloadNotFound { storage_key } => DeliveryError::PayloadNotFound {
                video_id: video_id.to_string(),
                storage_key,
            },
            StoreError::Transport { reason } => DeliveryError::Transport { reason },
        }
    }

    /// HTTP status this error renders with.
    pub fn status(&self) -> StatusCode {
        match self {
            DeliveryError::MetadataNotFound { .. } | DeliveryError::PayloadNotFound { .. } => {
                StatusCode::NOT_FOUND
            }
            DeliveryError::UnsatisfiableRange { .. } => StatusCode::RANGE_NOT_SATISFIABLE,
            DeliveryError::Transport { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for DeliveryError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            DeliveryError::MetadataNotFound { .. } => {
                (status, Json(serde_json::json!({ "error": "Video not found" }))).into_response()
            }
            DeliveryError::PayloadNotFound { .. } => (
                status,
                Json(serde_json::json!({ "error": "Video file not found" })),
            )
                .into_response(),
            DeliveryError::UnsatisfiableRange { size, .. } => {
                (status, [(CONTENT_RANGE, format!("bytes */{size}"))]).into_response()
            }
            DeliveryError::Transport { reason } => (
                status,
                Json(serde_json::json!({
                    "error": "Failed to stream video",
                    "message": reason,
                })),
            )
                .into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_keep_their_cause() {
        let metadata = DeliveryError::from_store(
            "abc",
            StoreError::MetadataNotFound {
                video_id: "abc".to_string(),
            },
        );
        assert_eq!(metadata.status(), StatusCode::NOT_FOUND);

        let payload = DeliveryError::from_store(
            "abc",
            StoreError::PayloadNotFound {
                storage_key: "bali/abc.mp4".to_string(),
            },
        );
        assert_eq!(
            payload,
            DeliveryError::PayloadNotFound {
                video_id: "abc".to_string(),
                storage_key: "bali/abc.mp4".to_string()
            }
        );

        let transport = DeliveryError::from_store("abc", StoreError::transport("timeout"));
        assert_eq!(transport.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_unsatisfiable_renders_content_range_without_body() {
        let response = DeliveryError::UnsatisfiableRange {
            size: 1000,
            source: RangeError::Unsatisfiable {
                start: 1000,
                size: 1000,
            },
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::RANGE_NOT_SATISFIABLE);
        assert_eq!(response.headers()[CONTENT_RANGE], "bytes */1000");
        assert!(response.headers().get("content-type").is_none());
    }
}
