//! TravelStreamz Web - JSON API and video streaming server

#![warn(clippy::missing_errors_doc)]
#![deny(clippy::missing_panics_doc)]
#![warn(clippy::too_many_lines)]
//!
//! Serves range-aware video streams and the public video listing over HTTP.
//! Every route is reachable both at the root and under `/api`.

pub mod handlers;
pub mod server;

// Re-export main types
pub use server::{AppState, ServerError, build_router, run_server};
