//! Health check handler

use axum::extract::State;
use axum::response::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::server::AppState;

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    /// `connected` when the catalog answered a count query
    pub store: &'static str,
    pub backend: &'static str,
    /// Seconds since the server started
    pub uptime: f64,
}

/// `GET /health`
pub async fn health_check(State(state): State<AppState>) -> Json<HealthReport> {
    info!("Health check requested");

    let store = match state.catalog.catalog().count_videos().await {
        Ok(_) => "connected",
        Err(e) => {
            warn!("Health probe failed: {}", e);
            "disconnected"
        }
    };

    Json(HealthReport {
        status: "ok",
        timestamp: Utc::now(),
        store,
        backend: state.backend,
        uptime: state.server_started_at.elapsed().as_secs_f64(),
    })
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::server::test_support::*;

    #[tokio::test]
    async fn test_health_reports_connected_store() {
        let response = get(state_with_video(10), "/health").await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["store"], "connected");
        assert_eq!(body["backend"], "memory");
        assert!(body["uptime"].as_f64().unwrap() >= 0.0);
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_health_under_api_prefix() {
        let response = get(state_with_video(10), "/api/health").await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}
