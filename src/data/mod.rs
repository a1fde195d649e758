//! Data fetching and storage
//!
//! Handles:
//! - CBOE delayed-quotes CDN for index option chains (free, ~15 min delay)
//! - Local snapshot caching

pub mod cboe;
pub mod cache;

pub use cboe::*;
pub use cache::*;
