//! HTTP server bootstrap for TravelStreamz
//!
//! Builds the video store for the selected runtime mode, probes it once, and
//! serves the router until SIGINT.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::http::header::{ACCEPT_RANGES, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE, RANGE};
use axum::http::Method;
use axum::routing::get;
use streamz_core::config::ConfigError;
use streamz_core::storage::{LocalVideoStore, SupabaseVideoStore};
use streamz_core::{
    RangeVideoDelivery, RuntimeMode, StoreError, StreamzConfig, VideoCatalog,
    VideoCatalogService, VideoStore,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::handlers::{api_videos, api_videos_by_location, health_check, not_found, stream_video};

/// Default directory scanned in development mode.
pub const DEFAULT_VIDEOS_DIR: &str = "videos";

/// Errors that stop the server from starting or running.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Video store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shared state handed to every handler.
///
/// Everything inside is read-only after startup, so cloning per request is cheap
/// and needs no locking.
#[derive(Clone)]
pub struct AppState {
    pub delivery: RangeVideoDelivery,
    pub catalog: VideoCatalogService,
    pub backend: &'static str,
    pub server_started_at: Instant,
}

impl AppState {
    /// Wires one backend into both the delivery and listing paths.
    pub fn from_store<S>(store: Arc<S>, public_url: impl Into<String>) -> Self
    where
        S: VideoStore + VideoCatalog + 'static,
    {
        let backend = store.backend_name();
        let video_store: Arc<dyn VideoStore> = store.clone();
        let catalog: Arc<dyn VideoCatalog> = store;
        Self {
            delivery: RangeVideoDelivery::new(video_store),
            catalog: VideoCatalogService::new(catalog, public_url),
            backend,
            server_started_at: Instant::now(),
        }
    }
}

/// Builds the application state for `mode`.
///
/// # Errors
/// - `ServerError::Configuration` - Production credentials missing or invalid
/// - `ServerError::Io` - Development video directory cannot be scanned
pub async fn build_state(
    config: &StreamzConfig,
    mode: RuntimeMode,
    videos_dir: Option<PathBuf>,
) -> Result<AppState, ServerError> {
    let public_url = config.server.public_url();
    let state = match mode {
        RuntimeMode::Production => {
            let store = SupabaseVideoStore::from_config(&config.store)?;
            info!(
                "Using Supabase store (table '{}', bucket '{}')",
                config.store.videos_table, config.store.videos_bucket
            );
            AppState::from_store(Arc::new(store), public_url)
        }
        RuntimeMode::Development => {
            let dir = videos_dir.unwrap_or_else(|| PathBuf::from(DEFAULT_VIDEOS_DIR));
            let store = LocalVideoStore::open(&dir).await?;
            info!("Using local video library at {}", dir.display());
            AppState::from_store(Arc::new(store), public_url)
        }
    };
    Ok(state)
}

fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/videos", get(api_videos))
        .route("/videos/location/{location_id}", get(api_videos_by_location))
        .route("/videos/stream/{video_id}", get(stream_video))
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS, Method::POST])
        .allow_headers([CONTENT_TYPE, RANGE])
        .expose_headers([CONTENT_RANGE, ACCEPT_RANGES, CONTENT_LENGTH])
}

/// Builds the complete router: standalone paths at the root, the same paths
/// under `/api`, a JSON 404 fallback, CORS and request tracing.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(routes())
        .nest("/api", routes())
        .fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer()),
        )
        .with_state(state)
}

/// Probes the catalog once; the server refuses to start if the store is unreachable.
///
/// # Errors
/// - `ServerError::StoreUnavailable` - Count query failed
pub async fn probe_store(state: &AppState) -> Result<u64, ServerError> {
    info!("Initializing {} store connection...", state.backend);
    match state.catalog.catalog().count_videos().await {
        Ok(count) => {
            info!("Connected to {} store, {} videos available", state.backend, count);
            Ok(count)
        }
        Err(e) => {
            error!("Store connection failed: {}", e);
            error!("Check the store URL and service role key, and that the videos table exists");
            Err(e.into())
        }
    }
}

/// Runs the HTTP server until SIGINT.
///
/// # Errors
/// - `ServerError::Configuration` - Store cannot be configured for `mode`
/// - `ServerError::StoreUnavailable` - Startup probe failed
/// - `ServerError::Io` - Bind or serve failure
pub async fn run_server(
    config: StreamzConfig,
    mode: RuntimeMode,
    videos_dir: Option<PathBuf>,
) -> Result<(), ServerError> {
    let state = build_state(&config, mode, videos_dir).await?;
    probe_store(&state).await?;

    let app = build_router(state);
    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .inspect_err(|e| error!("Failed to bind to {}: {}", addr, e))?;

    info!("TravelStreamz API running on http://{} ({} mode)", addr, mode);
    info!("Public stream base: {}", config.server.public_url());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutting down..."),
        Err(e) => error!("Failed to listen for shutdown signal: {}", e),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, Response};
    use streamz_core::storage::InMemoryVideoStore;
    use streamz_core::storage::test_fixtures::store_with_video;
    use tower::ServiceExt;

    use super::{AppState, build_router};

    pub fn state_with_video(size: usize) -> AppState {
        AppState::from_store(Arc::new(store_with_video(size)), "http://localhost:3001")
    }

    pub fn state_with_store(store: InMemoryVideoStore) -> AppState {
        AppState::from_store(Arc::new(store), "http://localhost:3001")
    }

    pub async fn send(state: AppState, request: Request<Body>) -> Response<Body> {
        build_router(state).oneshot(request).await.unwrap()
    }

    pub async fn get(state: AppState, uri: &str) -> Response<Body> {
        send(state, Request::get(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn body_bytes(response: Response<Body>) -> bytes::Bytes {
        to_bytes(response.into_body(), usize::MAX).await.unwrap()
    }

    pub async fn body_json(response: Response<Body>) -> serde_json::Value {
        serde_json::from_slice(&body_bytes(response).await).unwrap()
    }
}
