//! Video streaming handler
//!
//! Thin transport adapter over `RangeVideoDelivery`: extracts the path id
//! and the `Range` header, delegates, and renders whichever outcome comes back.

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::http::header::RANGE;
use axum::response::{IntoResponse, Response};

use crate::server::AppState;

/// Returns the `Range` header value, ignoring values that are not visible ASCII.
pub fn extract_range_header(headers: &HeaderMap) -> Option<&str> {
    headers.get(RANGE).and_then(|value| value.to_str().ok())
}

/// `GET /videos/stream/{video_id}`
pub async fn stream_video(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let range = extract_range_header(&headers);
    match state.delivery.serve(&video_id, range).await {
        Ok(delivery) => delivery.into_response(),
        Err(error) => error.into_response(),
    }
}
