//! HTTP implementation of the document store
//!
//! Every request goes through the shared [`ConnectionCache`]. A request that
//! dies from a connection reset is retried exactly once; anything else is
//! surfaced immediately.

use super::models::{ClearScrollRequest, ScrollRequest, SearchResponse};
use super::pool::ConnectionCache;
use super::traits::DocumentStore;
use crate::config::StoreConfig;
use crate::domain::{CollectionName, Result, SampleError, StoreError};
use crate::log_retry_attempt;
use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Relative path of the scroll endpoint
pub const SCROLL_PATH: &str = "_search/scroll";

/// Attempts per request (the first try plus one retry)
const MAX_ATTEMPTS: u32 = 2;

/// Document store reached over HTTP
///
/// # Example
///
/// ```no_run
/// use es_sample::adapters::store::{DocumentStore, HttpStore};
/// use es_sample::config::StoreConfig;
/// use es_sample::domain::CollectionName;
///
/// # async fn example() -> es_sample::domain::Result<()> {
/// let store = HttpStore::new(&StoreConfig::default())?;
/// store.refresh(&CollectionName::new("products").unwrap()).await?;
/// # Ok(())
/// # }
/// ```
pub struct HttpStore {
    base: Url,
    cache: Arc<ConnectionCache>,
}

impl HttpStore {
    /// Create a store for the configured host with its own connection cache
    pub fn new(config: &StoreConfig) -> Result<Self> {
        let cache = Arc::new(ConnectionCache::new(
            Duration::from_secs(config.timeout_seconds),
            config.tls_verify,
        ));
        Self::with_cache(&config.host, cache)
    }

    /// Create a store that shares an existing connection cache
    pub fn with_cache(host: &str, cache: Arc<ConnectionCache>) -> Result<Self> {
        let normalized = crate::config::schema::normalize_host(host);
        let base = Url::parse(&normalized)
            .map_err(|e| StoreError::InvalidUrl(format!("{host}: {e}")))?;
        Ok(Self { base, cache })
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base
            .join(path)
            .map_err(|e| StoreError::InvalidUrl(format!("{}{path}: {e}", self.base)).into())
    }

    fn scroll_url(&self, path: &str, ttl: &str) -> Result<Url> {
        let mut url = self.url(path)?;
        url.query_pairs_mut().append_pair("scroll", ttl);
        Ok(url)
    }

    /// Send a request and read the whole body, retrying once on a connection reset
    async fn execute(
        &self,
        method: Method,
        url: &Url,
        body: Option<&Value>,
    ) -> Result<(StatusCode, String)> {
        let client = self.cache.get(url)?;
        let mut attempt = 1;

        loop {
            let mut request = client.request(method.clone(), url.clone());
            if let Some(body) = body {
                request = request.json(body);
            }

            tracing::trace!(method = %method, url = %url, attempt, "Sending request");

            let outcome = match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    response.text().await.map(|text| (status, text))
                }
                Err(e) => Err(e),
            };

            match outcome {
                Ok(result) => return Ok(result),
                Err(e) if attempt < MAX_ATTEMPTS && is_transient(&e) => {
                    log_retry_attempt!(attempt, MAX_ATTEMPTS - 1, e);
                    attempt += 1;
                }
                Err(e) => return Err(send_error(url, &e)),
            }
        }
    }

    /// POST a JSON body and return the parsed JSON response
    async fn post_json(&self, url: Url, body: &Value) -> Result<Value> {
        let (status, text) = self.execute(Method::POST, &url, Some(body)).await?;
        check_status(&url, status, &text)?;

        let json: Value =
            serde_json::from_str(&text).map_err(|e| StoreError::MalformedResponse {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        if json.get("error").is_some() {
            return Err(StoreError::Application {
                url: url.to_string(),
                body: json.to_string(),
            }
            .into());
        }

        Ok(json)
    }

    async fn post_search(&self, url: Url, body: &Value) -> Result<SearchResponse> {
        let json = self.post_json(url.clone(), body).await?;
        serde_json::from_value(json).map_err(|e| {
            StoreError::MalformedResponse {
                url: url.to_string(),
                message: e.to_string(),
            }
            .into()
        })
    }

    async fn delete(&self, url: Url, body: Option<&Value>) -> Result<()> {
        let (status, text) = self.execute(Method::DELETE, &url, body).await?;
        check_status(&url, status, &text)
    }
}

#[async_trait]
impl DocumentStore for HttpStore {
    async fn open_scroll(
        &self,
        collection: &CollectionName,
        body: &Value,
        ttl: &str,
    ) -> Result<SearchResponse> {
        let url = self.scroll_url(&format!("{collection}/_search"), ttl)?;
        self.post_search(url, body).await
    }

    async fn continue_scroll(&self, scroll_id: &str, ttl: &str) -> Result<SearchResponse> {
        let url = self.scroll_url(SCROLL_PATH, ttl)?;
        let body = serde_json::to_value(ScrollRequest {
            scroll: ttl,
            scroll_id,
        })?;
        self.post_search(url, &body).await
    }

    async fn clear_scroll(&self, scroll_ids: &[String]) -> Result<()> {
        let url = self.url(SCROLL_PATH)?;
        let body = serde_json::to_value(ClearScrollRequest {
            scroll_id: scroll_ids,
        })?;
        self.delete(url, Some(&body)).await
    }

    async fn search(&self, collection: &CollectionName, body: &Value) -> Result<SearchResponse> {
        let url = self.url(&format!("{collection}/_search"))?;
        self.post_search(url, body).await
    }

    async fn refresh(&self, collection: &CollectionName) -> Result<()> {
        let url = self.url(&format!("{collection}/_refresh"))?;
        self.post_json(url, &json!({})).await.map(|_| ())
    }

    async fn delete_collection(&self, collection: &CollectionName) -> Result<()> {
        let url = self.url(collection.as_str())?;
        self.delete(url, None).await
    }

    fn base_url(&self) -> &str {
        self.base.as_str()
    }
}

fn check_status(url: &Url, status: StatusCode, body: &str) -> Result<()> {
    if status.is_success() {
        return Ok(());
    }
    Err(StoreError::Status {
        status: status.as_u16(),
        reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
        url: url.to_string(),
        body: body.to_string(),
    }
    .into())
}

fn send_error(url: &Url, err: &reqwest::Error) -> SampleError {
    let message = err.to_string();
    let url = url.to_string();
    if err.is_connect() {
        StoreError::ConnectionFailed { url, message }.into()
    } else {
        StoreError::Transport { url, message }.into()
    }
}

/// Whether the error is a dropped connection worth one more try
fn is_transient(err: &reqwest::Error) -> bool {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(e) = source {
        if let Some(io) = e.downcast_ref::<std::io::Error>() {
            if matches!(
                io.kind(),
                std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::BrokenPipe
                    | std::io::ErrorKind::UnexpectedEof
            ) {
                return true;
            }
        }
        // hyper reports a keep-alive connection closed by the peer this way
        if e.to_string().contains("connection closed before message completed") {
            return true;
        }
        source = e.source();
    }
    false
}
