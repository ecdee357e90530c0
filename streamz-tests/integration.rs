//! Integration tests for TravelStreamz
//!
//! These tests run the real router on a local socket and talk to it over
//! HTTP, covering delivery, listing, and the development-mode library.

#[path = "integration/support.rs"]
mod support;

#[path = "integration/range_validation.rs"]
mod range_validation;

#[path = "integration/catalog_api.rs"]
mod catalog_api;

#[path = "integration/local_library.rs"]
mod local_library;
