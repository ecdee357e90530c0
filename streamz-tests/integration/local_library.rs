//! Integration tests for development mode over a local video directory

use reqwest::StatusCode;
use reqwest::header::{CONTENT_RANGE, RANGE};
use streamz_core::storage::test_fixtures::{create_video_library, patterned_payload};
use streamz_core::{RuntimeMode, StreamzConfig};
use streamz_web::server::{build_state, probe_store};

use crate::support::spawn_server;

#[tokio::test]
async fn test_development_mode_serves_local_files() {
    let (_dir, root) = create_video_library(&[
        ("bali/sunrise.mp4", 2048),
        ("paris/eiffel.mp4", 512),
        ("notes.txt", 16),
    ]);

    let state = build_state(&StreamzConfig::default(), RuntimeMode::Development, Some(root))
        .await
        .unwrap();
    assert_eq!(state.backend, "local");
    assert_eq!(probe_store(&state).await.unwrap(), 2);

    let base = spawn_server(state).await;

    let videos: Vec<serde_json::Value> = reqwest::get(format!("{base}/api/videos/location/bali"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(videos.len(), 1);
    assert_eq!(videos[0]["id"], "sunrise");

    let response = reqwest::Client::new()
        .get(format!("{base}/api/videos/stream/sunrise"))
        .header(RANGE, "bytes=1024-")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(response.headers()[CONTENT_RANGE], "bytes 1024-2047/2048");
    assert_eq!(
        response.bytes().await.unwrap().as_ref(),
        &patterned_payload(2048)[1024..]
    );
}
