//! Integration tests for HTTP range delivery over a real socket
//!
//! Uses the 1000-byte `abc123` fixture so every expected header can be
//! written out literally.

use std::sync::Arc;

use futures::future;
use reqwest::StatusCode;
use reqwest::header::{ACCEPT_RANGES, CACHE_CONTROL, CONTENT_LENGTH, CONTENT_RANGE, RANGE};
use streamz_core::storage::test_fixtures::{patterned_payload, store_with_video};
use streamz_web::AppState;

use crate::support::spawn_server;

async fn server_with_video(size: usize) -> String {
    let state = AppState::from_store(Arc::new(store_with_video(size)), "http://localhost:3001");
    spawn_server(state).await
}

async fn fetch(base: &str, range: Option<&str>) -> reqwest::Response {
    let client = reqwest::Client::new();
    let mut request = client.get(format!("{base}/api/videos/stream/abc123"));
    if let Some(range) = range {
        request = request.header(RANGE, range);
    }
    request.send().await.unwrap()
}

#[tokio::test]
async fn test_full_download_matches_payload() {
    let base = server_with_video(1000).await;
    let response = fetch(&base, None).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[CONTENT_LENGTH], "1000");
    assert_eq!(response.headers()[ACCEPT_RANGES], "bytes");
    assert_eq!(
        response.headers()[CACHE_CONTROL],
        "public, max-age=31536000, immutable"
    );
    assert!(response.headers().get(CONTENT_RANGE).is_none());
    assert_eq!(
        response.bytes().await.unwrap().as_ref(),
        patterned_payload(1000).as_slice()
    );
}

#[tokio::test]
async fn test_example_ranges() {
    let base = server_with_video(1000).await;
    let payload = patterned_payload(1000);

    let response = fetch(&base, Some("bytes=500-699")).await;
    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(response.headers()[CONTENT_RANGE], "bytes 500-699/1000");
    assert_eq!(response.headers()[CONTENT_LENGTH], "200");
    assert_eq!(response.bytes().await.unwrap().as_ref(), &payload[500..700]);

    let response = fetch(&base, Some("bytes=900-1500")).await;
    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(response.headers()[CONTENT_RANGE], "bytes 900-999/1000");
    assert_eq!(response.headers()[CONTENT_LENGTH], "100");

    let response = fetch(&base, Some("bytes=1000-1010")).await;
    assert_eq!(response.status(), StatusCode::RANGE_NOT_SATISFIABLE);
    assert_eq!(response.headers()[CONTENT_RANGE], "bytes */1000");
}

#[tokio::test]
async fn test_first_and_last_byte() {
    let base = server_with_video(1000).await;

    let response = fetch(&base, Some("bytes=0-0")).await;
    assert_eq!(response.headers()[CONTENT_RANGE], "bytes 0-0/1000");
    assert_eq!(response.bytes().await.unwrap().as_ref(), &[0u8]);

    let response = fetch(&base, Some("bytes=999-999")).await;
    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(response.bytes().await.unwrap().as_ref(), &[(999 % 256) as u8]);
}

#[tokio::test]
async fn test_halves_reconstruct_full_payload() {
    let base = server_with_video(1001).await;

    let full = fetch(&base, None).await.bytes().await.unwrap();
    let head = fetch(&base, Some("bytes=0-499")).await.bytes().await.unwrap();
    let tail = fetch(&base, Some("bytes=500-1000")).await.bytes().await.unwrap();

    let mut joined = head.to_vec();
    joined.extend_from_slice(&tail);
    assert_eq!(joined, full.to_vec());
}

#[tokio::test]
async fn test_concurrent_range_requests_are_identical() {
    let base = server_with_video(4096).await;

    let responses = future::join_all((0..8).map(|_| async {
        fetch(&base, Some("bytes=1024-2047"))
            .await
            .bytes()
            .await
            .unwrap()
    }))
    .await;

    let expected = &patterned_payload(4096)[1024..2048];
    for body in responses {
        assert_eq!(body.as_ref(), expected);
    }
}

#[tokio::test]
async fn test_unknown_video_is_json_404() {
    let base = server_with_video(10).await;
    let response = reqwest::get(format!("{base}/videos/stream/does-not-exist"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body, serde_json::json!({ "error": "Video not found" }));
}
