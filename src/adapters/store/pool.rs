//! Per-host HTTP client cache
//!
//! One persistent keep-alive client per origin (scheme, host, port), created on
//! first use and shared by every request to that origin for the life of the
//! process. `reqwest::Client` is internally reference counted and safe to use
//! from many tasks at once, so callers get a cheap clone.

use crate::domain::{Result, StoreError};
use reqwest::{Client, ClientBuilder};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use url::Url;

/// Lazily populated map of origin to HTTP client
pub struct ConnectionCache {
    timeout: Duration,
    tls_verify: bool,
    clients: Mutex<HashMap<String, Client>>,
}

impl ConnectionCache {
    /// Create an empty cache; clients are built with the given settings
    pub fn new(timeout: Duration, tls_verify: bool) -> Self {
        Self {
            timeout,
            tls_verify,
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// Return the client for `url`'s origin, building it on first use
    pub fn get(&self, url: &Url) -> Result<Client> {
        let origin = url.origin().ascii_serialization();
        let mut clients = self.clients.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(client) = clients.get(&origin) {
            return Ok(client.clone());
        }

        let client = self.build_client(url)?;
        tracing::debug!(origin = %origin, "Created HTTP client");
        clients.insert(origin, client.clone());
        Ok(client)
    }

    /// Number of distinct origins seen so far
    pub fn len(&self) -> usize {
        self.clients
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no client has been created yet
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn build_client(&self, url: &Url) -> Result<Client> {
        let mut builder = ClientBuilder::new()
            .timeout(self.timeout)
            .connect_timeout(Duration::from_secs(30))
            .tcp_keepalive(Some(Duration::from_secs(60)))
            .pool_idle_timeout(Some(Duration::from_secs(90)));

        if url.scheme() == "https" {
            builder = builder.https_only(true);
            if !self.tls_verify {
                tracing::warn!(
                    host = url.host_str().unwrap_or_default(),
                    "TLS certificate verification disabled"
                );
                builder = builder.danger_accept_invalid_certs(true);
            }
        }

        builder.build().map_err(|e| {
            StoreError::ConnectionFailed {
                url: url.to_string(),
                message: format!("failed to build HTTP client: {e}"),
            }
            .into()
        })
    }
}
