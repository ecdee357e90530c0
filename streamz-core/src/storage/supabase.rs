//! Supabase-backed video store
//!
//! Talks to the managed service over its REST surface: PostgREST for the
//! `videos` table and the storage API for payload objects. One instance is
//! created at startup and shared by every request.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use super::{
    SortOrder, StoreError, StoreResult, VideoCatalog, VideoDocument, VideoQuery, VideoRecord,
    VideoStore,
};
use crate::config::{ConfigError, StoreConfig, SupabaseCredentials};

/// Video store backed by a Supabase project.
#[derive(Clone)]
pub struct SupabaseVideoStore {
    client: reqwest::Client,
    base_url: Url,
    service_role_key: String,
    table: String,
    bucket: String,
}

/// Minimal projection used for delivery lookups.
#[derive(Debug, Deserialize)]
struct StoredVideoRow {
    id: String,
    #[serde(default)]
    storage_path: Option<String>,
}

impl SupabaseVideoStore {
    /// Builds a store from configuration.
    ///
    /// # Errors
    /// - `ConfigError::MissingVariable` - URL or service role key not configured
    /// - `ConfigError::ClientInit` - HTTP client could not be constructed
    pub fn from_config(config: &StoreConfig) -> Result<Self, ConfigError> {
        let credentials = config.credentials()?;
        Self::new(
            credentials,
            &config.videos_table,
            &config.videos_bucket,
            config.request_timeout,
        )
    }

    /// Builds a store from explicit credentials.
    ///
    /// # Errors
    /// - `ConfigError::ClientInit` - HTTP client could not be constructed
    pub fn new(
        credentials: SupabaseCredentials,
        table: &str,
        bucket: &str,
        timeout: Duration,
    ) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("streamz/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ConfigError::ClientInit {
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            base_url: credentials.url,
            service_role_key: credentials.service_role_key,
            table: table.to_string(),
            bucket: bucket.to_string(),
        })
    }

    fn endpoint<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> StoreResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::transport(format!("invalid store URL {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn table_url(&self) -> StoreResult<Url> {
        self.endpoint(["rest", "v1", self.table.as_str()])
    }

    fn object_url(&self, storage_key: &str) -> StoreResult<Url> {
        let key_segments = storage_key.split('/').filter(|s| !s.is_empty());
        self.endpoint(
            ["storage", "v1", "object", self.bucket.as_str()]
                .into_iter()
                .chain(key_segments),
        )
    }

    fn request(&self, method: reqwest::Method, url: Url) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .header("apikey", &self.service_role_key)
            .bearer_auth(&self.service_role_key)
    }
}

fn listing_url(mut url: Url, query: &VideoQuery) -> Url {
    {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("select", "*");
        if let Some(location_id) = &query.location_id {
            pairs.append_pair("location_id", &format!("eq.{location_id}"));
        }
        let order = match query.order {
            SortOrder::Ascending => "created_at.asc",
            SortOrder::Descending => "created_at.desc",
        };
        pairs.append_pair("order", order);
        if let Some(limit) = query.limit {
            pairs.append_pair("limit", &limit.to_string());
        }
    }
    url
}

/// Extracts the total from a PostgREST `Content-Range` header (`0-9/42`, `*/0`).
fn parse_count(content_range: &str) -> Option<u64> {
    content_range
        .rsplit_once('/')
        .and_then(|(_, total)| total.trim().parse().ok())
}

async fn error_body(response: reqwest::Response) -> String {
    let status = response.status();
    match response.text().await {
        Ok(body) if !body.is_empty() => format!("{status}: {body}"),
        _ => status.to_string(),
    }
}

#[async_trait]
impl VideoStore for SupabaseVideoStore {
    async fn find_video_by_id(&self, video_id: &str) -> StoreResult<VideoRecord> {
        let mut url = self.table_url()?;
        url.query_pairs_mut()
            .append_pair("select", "id,storage_path")
            .append_pair("id", &format!("eq.{video_id}"))
            .append_pair("limit", "1");

        let response = self
            .request(reqwest::Method::GET, url)
            .send()
            .await
            .map_err(StoreError::transport)?;

        let not_found = || StoreError::MetadataNotFound {
            video_id: video_id.to_string(),
        };
        match response.status() {
            status if status.is_success() => {}
            // PostgREST rejects ids that do not parse as the column type
            StatusCode::BAD_REQUEST => {
                let body = error_body(response).await;
                debug!("Metadata lookup rejected for {}: {}", video_id, body);
                return Err(not_found());
            }
            _ => return Err(StoreError::transport(error_body(response).await)),
        }

        let rows: Vec<StoredVideoRow> = response.json().await.map_err(StoreError::transport)?;
        let row = rows.into_iter().next().ok_or_else(not_found)?;
        Ok(VideoRecord::new(row.id, row.storage_path.unwrap_or_default()))
    }

    async fn download_payload(&self, storage_key: &str) -> StoreResult<Bytes> {
        let url = self.object_url(storage_key)?;
        let response = self
            .request(reqwest::Method::GET, url)
            .send()
            .await
            .map_err(StoreError::transport)?;

        let not_found = || StoreError::PayloadNotFound {
            storage_key: storage_key.to_string(),
        };
        match response.status() {
            status if status.is_success() => {}
            // The storage API reports missing objects as 400 with a not_found body
            StatusCode::NOT_FOUND | StatusCode::BAD_REQUEST => {
                let body = error_body(response).await;
                debug!("Object {} missing: {}", storage_key, body);
                return Err(not_found());
            }
            _ => return Err(StoreError::transport(error_body(response).await)),
        }

        let payload = response.bytes().await.map_err(StoreError::transport)?;
        if payload.is_empty() {
            warn!("Object {} is empty", storage_key);
            return Err(not_found());
        }
        Ok(payload)
    }

    fn backend_name(&self) -> &'static str {
        "supabase"
    }
}

#[async_trait]
impl VideoCatalog for SupabaseVideoStore {
    async fn list_videos(&self, query: &VideoQuery) -> StoreResult<Vec<VideoDocument>> {
        let url = listing_url(self.table_url()?, query);
        let response = self
            .request(reqwest::Method::GET, url)
            .send()
            .await
            .map_err(StoreError::transport)?;

        if !response.status().is_success() {
            return Err(StoreError::transport(error_body(response).await));
        }
        response.json().await.map_err(StoreError::transport)
    }

    async fn count_videos(&self) -> StoreResult<u64> {
        let mut url = self.table_url()?;
        url.query_pairs_mut().append_pair("select", "id");

        let response = self
            .request(reqwest::Method::HEAD, url)
            .header("Prefer", "count=exact")
            .send()
            .await
            .map_err(StoreError::transport)?;

        if !response.status().is_success() {
            return Err(StoreError::transport(error_body(response).await));
        }

        response
            .headers()
            .get(reqwest::header::CONTENT_RANGE)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_count)
            .ok_or_else(|| StoreError::transport("count response without Content-Range total"))
    }
}
