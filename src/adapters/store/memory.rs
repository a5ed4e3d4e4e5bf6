//! In-memory document store for unit tests
//!
//! Pages through stored hits in insertion order, rotates the scroll token on
//! every page and records every call so tests can assert on request counts.

use super::models::{HitsEnvelope, SearchResponse};
use super::traits::DocumentStore;
use crate::domain::{CollectionName, Hit, Result, SampleError, StoreError};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

/// A recorded store call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Open(String),
    Continue(String),
    Clear(Vec<String>),
    Search(String),
    Refresh(String),
    Delete(String),
}

#[derive(Debug)]
struct Cursor {
    collection: String,
    offset: usize,
    size: usize,
}

#[derive(Debug, Default)]
struct State {
    calls: Vec<Call>,
    cursors: HashMap<String, Cursor>,
    issued: usize,
}

/// Scriptable in-memory store
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: HashMap<String, Vec<Hit>>,
    fail_continue_after: Option<usize>,
    fail_clear: bool,
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_collection(mut self, name: &str, hits: Vec<Hit>) -> Self {
        self.collections.insert(name.to_string(), hits);
        self
    }

    /// Fail continuation requests once `n` of them have succeeded
    pub fn fail_continue_after(mut self, n: usize) -> Self {
        self.fail_continue_after = Some(n);
        self
    }

    pub fn fail_clear(mut self) -> Self {
        self.fail_clear = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub fn count(&self, matcher: impl Fn(&Call) -> bool) -> usize {
        self.lock().calls.iter().filter(|c| matcher(c)).count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn hits(&self, collection: &str) -> Result<&[Hit]> {
        self.collections
            .get(collection)
            .map(Vec::as_slice)
            .ok_or_else(|| {
                StoreError::Status {
                    status: 404,
                    reason: "Not Found".to_string(),
                    url: collection.to_string(),
                    body: "index_not_found_exception".to_string(),
                }
                .into()
            })
    }

    fn page(&self, state: &mut State, mut cursor: Cursor) -> Result<SearchResponse> {
        let hits = self.hits(&cursor.collection)?;
        let end = (cursor.offset + cursor.size).min(hits.len());
        let page = hits[cursor.offset.min(end)..end].to_vec();

        state.issued += 1;
        let token = format!("scroll-{}", state.issued);
        cursor.offset = end;
        state.cursors.insert(token.clone(), cursor);

        Ok(SearchResponse {
            scroll_id: Some(token),
            hits: HitsEnvelope { hits: page },
        })
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn open_scroll(
        &self,
        collection: &CollectionName,
        body: &Value,
        _ttl: &str,
    ) -> Result<SearchResponse> {
        let mut state = self.lock();
        state.calls.push(Call::Open(collection.to_string()));

        let size = body["size"].as_u64().unwrap_or(10) as usize;
        let cursor = Cursor {
            collection: collection.to_string(),
            offset: 0,
            size,
        };
        self.page(&mut state, cursor)
    }

    async fn continue_scroll(&self, scroll_id: &str, _ttl: &str) -> Result<SearchResponse> {
        let mut state = self.lock();
        state.calls.push(Call::Continue(scroll_id.to_string()));

        let done = state
            .calls
            .iter()
            .filter(|c| matches!(c, Call::Continue(_)))
            .count()
            - 1;
        if self.fail_continue_after.is_some_and(|n| done >= n) {
            return Err(StoreError::Transport {
                url: "memory".to_string(),
                message: "connection reset".to_string(),
            }
            .into());
        }

        let cursor = state
            .cursors
            .remove(scroll_id)
            .ok_or_else(|| SampleError::Other(format!("unknown scroll id {scroll_id}")))?;
        self.page(&mut state, cursor)
    }

    async fn clear_scroll(&self, scroll_ids: &[String]) -> Result<()> {
        self.lock().calls.push(Call::Clear(scroll_ids.to_vec()));
        if self.fail_clear {
            return Err(SampleError::Other("clear failed".to_string()));
        }
        Ok(())
    }

    async fn search(&self, collection: &CollectionName, body: &Value) -> Result<SearchResponse> {
        self.lock().calls.push(Call::Search(collection.to_string()));

        let wanted: Vec<&str> = body["query"]["ids"]["values"]
            .as_array()
            .map(|values| values.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();
        let hits = self
            .hits(collection.as_str())?
            .iter()
            .filter(|hit| wanted.contains(&hit.id.as_str()))
            .cloned()
            .collect();

        Ok(SearchResponse {
            scroll_id: None,
            hits: HitsEnvelope { hits },
        })
    }

    async fn refresh(&self, collection: &CollectionName) -> Result<()> {
        self.lock().calls.push(Call::Refresh(collection.to_string()));
        Ok(())
    }

    async fn delete_collection(&self, collection: &CollectionName) -> Result<()> {
        self.lock().calls.push(Call::Delete(collection.to_string()));
        Ok(())
    }

    fn base_url(&self) -> &str {
        "memory://"
    }
}
