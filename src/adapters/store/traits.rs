//! Document store trait definition
//!
//! This module defines the `DocumentStore` trait that abstracts the search-index
//! HTTP API. The export pipeline only talks to this trait, so it can be driven
//! by the HTTP implementation or by an in-memory store in tests.

use super::models::SearchResponse;
use crate::domain::{CollectionName, Result};
use async_trait::async_trait;
use serde_json::Value;

/// Operations the export pipeline needs from the remote document store
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Open a scroll traversal over `collection`
    ///
    /// `POST <collection>/_search?scroll=<ttl>`
    async fn open_scroll(
        &self,
        collection: &CollectionName,
        body: &Value,
        ttl: &str,
    ) -> Result<SearchResponse>;

    /// Fetch the next page of a scroll traversal
    ///
    /// `POST _search/scroll?scroll=<ttl>`
    async fn continue_scroll(&self, scroll_id: &str, ttl: &str) -> Result<SearchResponse>;

    /// Release scroll contexts
    ///
    /// `DELETE _search/scroll`
    async fn clear_scroll(&self, scroll_ids: &[String]) -> Result<()>;

    /// Run a plain (non-scrolling) search
    ///
    /// `POST <collection>/_search`
    async fn search(&self, collection: &CollectionName, body: &Value) -> Result<SearchResponse>;

    /// Make recent writes visible to search
    ///
    /// `POST <collection>/_refresh`
    async fn refresh(&self, collection: &CollectionName) -> Result<()>;

    /// Delete a collection
    ///
    /// `DELETE <collection>`
    async fn delete_collection(&self, collection: &CollectionName) -> Result<()>;

    /// Base URL of the store
    fn base_url(&self) -> &str;
}
