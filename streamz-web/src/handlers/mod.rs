//! HTTP request handlers organized by functionality

pub mod api;
pub mod health;
pub mod streaming;

// Re-export handler functions
pub use api::{ListingError, api_videos, api_videos_by_location, not_found};
pub use health::{HealthReport, health_check};
pub use streaming::{extract_range_header, stream_video};
