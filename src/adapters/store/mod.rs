//! Document store adapter
//!
//! This module provides the integration with the search-index HTTP API: the
//! store trait the pipeline depends on, its HTTP implementation, the per-host
//! client cache, and the wire models.

pub mod client;
#[cfg(test)]
pub(crate) mod memory;
pub mod models;
pub mod pool;
pub mod traits;

pub use client::HttpStore;
pub use models::{Page, SearchResponse};
pub use pool::ConnectionCache;
pub use traits::DocumentStore;
