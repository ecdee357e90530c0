//! Integration tests for the listing and health endpoints

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use reqwest::StatusCode;
use reqwest::header::CACHE_CONTROL;
use streamz_core::storage::InMemoryVideoStore;
use streamz_core::storage::test_fixtures::video_document;
use streamz_web::AppState;

use crate::support::spawn_server;

fn catalog_store() -> InMemoryVideoStore {
    let store = InMemoryVideoStore::new();
    for (id, location, day) in [("v1", "bali", 1), ("v2", "paris", 2), ("v3", "bali", 3)] {
        let mut document = video_document(id, location, &format!("{location}/{id}.mp4"));
        document.created_at = Utc.with_ymd_and_hms(2024, 7, day, 9, 0, 0).unwrap();
        store.insert_video(document, vec![1u8, 2, 3]);
    }
    store
}

async fn server() -> String {
    let state = AppState::from_store(Arc::new(catalog_store()), "https://api.travelstreamz.example");
    spawn_server(state).await
}

#[tokio::test]
async fn test_listing_newest_first_with_stream_links() {
    let base = server().await;
    let response = reqwest::get(format!("{base}/api/videos")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[CACHE_CONTROL], "public, max-age=300");

    let videos: Vec<serde_json::Value> = response.json().await.unwrap();
    let ids: Vec<&str> = videos.iter().map(|v| v["id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec!["v3", "v2", "v1"]);
    assert_eq!(
        videos[0]["videoUrl"],
        "https://api.travelstreamz.example/api/videos/stream/v3"
    );
}

#[tokio::test]
async fn test_listing_links_are_streamable() {
    let base = server().await;
    let videos: Vec<serde_json::Value> = reqwest::get(format!("{base}/videos/location/bali"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(videos.len(), 2);

    let id = videos[0]["id"].as_str().unwrap();
    let response = reqwest::get(format!("{base}/api/videos/stream/{id}"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.bytes().await.unwrap().as_ref(), &[1u8, 2, 3]);
}

#[tokio::test]
async fn test_health_and_fallback() {
    let base = server().await;

    let health: serde_json::Value = reqwest::get(format!("{base}/api/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["status"], "ok");
    assert_eq!(health["store"], "connected");

    let response = reqwest::get(format!("{base}/api/unknown")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Not found");
}
