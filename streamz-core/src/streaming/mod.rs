//! Range-aware video delivery.
//!
//! Splits delivery into header parsing ([`range`]), the stateless delivery
//! component ([`delivery`]) and the closed error set it reports ([`error`]).
//! Every outcome knows how to render itself as an HTTP response.

pub mod delivery;
pub mod error;
pub mod range;

// Delivery component and outcomes
pub use delivery::{RangeVideoDelivery, VIDEO_CACHE_CONTROL, VideoDelivery};
// Failure taxonomy
pub use error::DeliveryError;
// HTTP range support
pub use range::{RangeError, RangeSpec, parse_range_header};
