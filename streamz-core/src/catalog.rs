//! Public video listing
//!
//! Projects metadata rows into the camelCase shape the frontend consumes and
//! points each entry at this server's stream endpoint.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::storage::{
    Coordinates, Creator, StoreResult, TokenInfo, VideoCatalog, VideoDocument, VideoQuery,
};

/// Location block of a listed video.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationInfo {
    pub id: String,
    pub name: String,
    pub country: String,
    pub coordinates: Coordinates,
}

/// One entry of the public video listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoResponse {
    pub id: String,
    pub video_url: String,
    pub location: LocationInfo,
    pub creator: Creator,
    pub thumbnail_url: Option<String>,
    pub duration: f64,
    pub views: u64,
    pub likes: u64,
    pub virality_score: f64,
    pub token: TokenInfo,
    pub betting_pool: f64,
    pub paid_to_post: f64,
    pub categories: Vec<String>,
    pub stream_tags: Vec<String>,
    pub xp_earned: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VideoResponse {
    /// Builds the public entry for `document`, streaming from `public_url`.
    pub fn from_document(document: VideoDocument, public_url: &str) -> Self {
        let video_url = stream_url(public_url, &document.id);
        Self {
            id: document.id,
            video_url,
            location: LocationInfo {
                id: document.location_id,
                name: document.location_name,
                country: document.country,
                coordinates: document.coordinates,
            },
            creator: document.creator,
            thumbnail_url: document.thumbnail_url,
            duration: document.duration,
            views: document.views,
            likes: document.likes,
            virality_score: document.virality_score,
            token: document.token,
            betting_pool: document.betting_pool,
            paid_to_post: document.paid_to_post,
            categories: document.categories,
            stream_tags: document.stream_tags,
            xp_earned: document.xp_earned,
            created_at: document.created_at,
            updated_at: document.updated_at,
        }
    }
}

/// Stream endpoint for `video_id` under `public_url`.
pub fn stream_url(public_url: &str, video_id: &str) -> String {
    format!(
        "{}/api/videos/stream/{}",
        public_url.trim_end_matches('/'),
        video_id
    )
}

/// Lists videos for the public API.
#[derive(Clone)]
pub struct VideoCatalogService {
    catalog: Arc<dyn VideoCatalog>,
    public_url: String,
}

impl VideoCatalogService {
    pub fn new(catalog: Arc<dyn VideoCatalog>, public_url: impl Into<String>) -> Self {
        Self {
            catalog,
            public_url: public_url.into(),
        }
    }

    pub fn catalog(&self) -> &Arc<dyn VideoCatalog> {
        &self.catalog
    }

    /// Every video, newest first.
    ///
    /// # Errors
    /// - `StoreError::Transport` - Catalog unreachable
    pub async fn all_videos(&self) -> StoreResult<Vec<VideoResponse>> {
        let started = std::time::Instant::now();
        let documents = self.catalog.list_videos(&VideoQuery::newest_first()).await?;
        info!(
            "Found {} videos in {}ms",
            documents.len(),
            started.elapsed().as_millis()
        );
        Ok(self.project(documents))
    }

    /// Videos recorded at `location_id`, newest first.
    ///
    /// # Errors
    /// - `StoreError::Transport` - Catalog unreachable
    pub async fn videos_by_location(&self, location_id: &str) -> StoreResult<Vec<VideoResponse>> {
        let documents = self
            .catalog
            .list_videos(&VideoQuery::for_location(location_id))
            .await?;
        debug!("Found {} videos at {}", documents.len(), location_id);
        Ok(self.project(documents))
    }

    fn project(&self, documents: Vec<VideoDocument>) -> Vec<VideoResponse> {
        documents
            .into_iter()
            .map(|document| VideoResponse::from_document(document, &self.public_url))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::storage::InMemoryVideoStore;
    use crate::storage::test_fixtures::video_document;

    fn catalog_with(documents: Vec<VideoDocument>) -> VideoCatalogService {
        let store = InMemoryVideoStore::new();
        for document in documents {
            store.insert_document(document);
        }
        VideoCatalogService::new(Arc::new(store), "http://localhost:3001")
    }

    fn dated(id: &str, location: &str, day: u32) -> VideoDocument {
        let mut document = video_document(id, location, &format!("{location}/{id}.mp4"));
        document.created_at = Utc.with_ymd_and_hms(2024, 6, day, 0, 0, 0).unwrap();
        document
    }

    #[tokio::test]
    async fn test_all_videos_newest_first() {
        let service = catalog_with(vec![
            dated("old", "bali", 1),
            dated("new", "paris", 20),
            dated("mid", "bali", 10),
        ]);

        let ids: Vec<String> = service
            .all_videos()
            .await
            .unwrap()
            .into_iter()
            .map(|v| v.id)
            .collect();
        assert_eq!(ids, vec!["new", "mid", "old"]);
    }

    #[tokio::test]
    async fn test_videos_by_location_filters() {
        let service = catalog_with(vec![
            dated("a", "bali", 1),
            dated("b", "paris", 2),
            dated("c", "bali", 3),
        ]);

        let videos = service.videos_by_location("bali").await.unwrap();
        assert_eq!(videos.len(), 2);
        assert!(videos.iter().all(|v| v.location.id == "bali"));
        assert!(service.videos_by_location("tokyo").await.unwrap().is_empty());
    }

    #[test]
    fn test_projection_is_camel_case_with_stream_url() {
        let mut document = video_document("abc123", "bali", "bali/abc123.mp4");
        document.location_name = "Bali".to_string();
        document.virality_score = 0.5;
        document.stream_tags = vec!["surf".to_string()];

        let response = VideoResponse::from_document(document, "https://api.example/");
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(
            json["videoUrl"],
            "https://api.example/api/videos/stream/abc123"
        );
        assert_eq!(json["location"]["name"], "Bali");
        assert_eq!(json["viralityScore"], 0.5);
        assert_eq!(json["streamTags"][0], "surf");
        assert!(json.get("storage_path").is_none());
        assert!(json["thumbnailUrl"].is_null());
    }
}
