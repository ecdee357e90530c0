//! Shared server harness for integration tests

use std::net::SocketAddr;

use streamz_web::{AppState, build_router};
use tokio::net::TcpListener;

/// Serves `state` on an ephemeral local port and returns its base URL.
///
/// The server task lives until the test runtime shuts down.
pub async fn spawn_server(state: AppState) -> String {
    let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, build_router(state)).await.unwrap();
    });

    format!("http://{addr}")
}
