//! JSON API handlers for the video listing

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::http::header::CACHE_CONTROL;
use axum::response::{IntoResponse, Json, Response};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use streamz_core::{StoreError, VideoResponse};
use tracing::{error, info};

use crate::server::AppState;

/// Cache policy for listing responses.
pub const LISTING_CACHE_CONTROL: &str = "public, max-age=300";

/// Body of a failed listing request.
#[derive(Debug, Serialize)]
pub struct ListingError {
    pub error: &'static str,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl From<StoreError> for ListingError {
    fn from(error: StoreError) -> Self {
        Self {
            error: "Failed to fetch videos",
            message: error.to_string(),
            timestamp: Utc::now(),
        }
    }
}

impl IntoResponse for ListingError {
    fn into_response(self) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, Json(self)).into_response()
    }
}

fn listing(videos: Vec<VideoResponse>) -> Response {
    info!("Sent {} videos to client", videos.len());
    ([(CACHE_CONTROL, LISTING_CACHE_CONTROL)], Json(videos)).into_response()
}

/// `GET /videos`
pub async fn api_videos(State(state): State<AppState>) -> Result<Response, ListingError> {
    info!("Fetching all videos");
    let videos = state.catalog.all_videos().await.map_err(|e| {
        error!("Error fetching videos: {}", e);
        ListingError::from(e)
    })?;
    Ok(listing(videos))
}

/// `GET /videos/location/{location_id}`
///
/// Each entry's `id` is the row id, the same key `videoUrl` and the stream
/// route resolve. The separate `video_id` column is never exposed, so ids from
/// this listing and from `/videos` are interchangeable.
pub async fn api_videos_by_location(
    State(state): State<AppState>,
    Path(location_id): Path<String>,
) -> Result<Response, ListingError> {
    info!("Fetching videos for location {}", location_id);
    let videos = state
        .catalog
        .videos_by_location(&location_id)
        .await
        .map_err(|e| {
            error!("Error fetching videos for {}: {}", location_id, e);
            ListingError::from(e)
        })?;
    Ok(listing(videos))
}

/// Fallback for unknown paths.
pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" })))
}
