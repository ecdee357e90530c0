//! TravelStreamz Core - video metadata stores and range-aware delivery
//!
//! This crate provides the building blocks of the TravelStreamz backend:
//! collaborator interfaces over the managed database and object storage,
//! HTTP range parsing, the video delivery component, the public catalog
//! projection, and configuration management.

pub mod catalog;
pub mod config;
pub mod mode;
pub mod storage;
pub mod streaming;
pub mod tracing_setup;

// Re-export main types for convenient access
pub use catalog::{VideoCatalogService, VideoResponse};
pub use config::{ConfigError, LoggingConfig, StreamzConfig};
pub use mode::RuntimeMode;
pub use storage::{StoreError, VideoCatalog, VideoRecord, VideoStore};
pub use streaming::{DeliveryError, RangeVideoDelivery, VideoDelivery};
