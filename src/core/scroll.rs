//! Scroll traversal of the primary collection
//!
//! A traversal opens a scroll, advances it page by page and always releases
//! every token it saw, whether it ended normally, on a budget, on an error or
//! on shutdown. Each page is delivered in ascending `_id` order.
//!
//! The traversal ends when:
//! - a page comes back without a scroll token
//! - a page is empty or shorter than the page size
//! - the fetched-total `limit` is used up
//! - the per-run `count` budget reaches zero (the rest of the page is dropped)

use crate::adapters::store::{DocumentStore, Page};
use crate::config::Bound;
use crate::core::cancel::Cancellation;
use crate::core::filter::ConditionSet;
use crate::core::pipeline::Pipeline;
use crate::core::sink::DocumentWriter;
use crate::domain::{CollectionName, DocumentId, Hit, Result};
use serde_json::Value;
use std::time::Duration;

/// Upper bound on the best-effort scroll release
pub const RELEASE_TIMEOUT: Duration = Duration::from_secs(5);

/// Per-run cap on accepted documents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Budget {
    remaining: Option<u64>,
}

impl Budget {
    pub fn new(count: Bound) -> Self {
        Self {
            remaining: count.value(),
        }
    }

    pub fn unbounded() -> Self {
        Self { remaining: None }
    }

    /// Whether no more documents may be accepted
    pub fn is_exhausted(&self) -> bool {
        self.remaining == Some(0)
    }

    /// Claim one document, returning `false` when nothing is left
    pub fn take(&mut self) -> bool {
        match &mut self.remaining {
            None => true,
            Some(0) => false,
            Some(n) => {
                *n -= 1;
                true
            }
        }
    }

    pub fn remaining(&self) -> Option<u64> {
        self.remaining
    }
}

/// Accumulates accepted identifiers for the secondary pass
///
/// Built with `retain = false` it only tracks the type tag and drops ids.
#[derive(Debug, Clone, Default)]
pub struct IdCollector {
    retain: bool,
    ids: Vec<DocumentId>,
    doc_type: Option<String>,
}

impl IdCollector {
    pub fn new(retain: bool) -> Self {
        Self {
            retain,
            ..Default::default()
        }
    }

    /// A collector that keeps nothing
    pub fn discarding() -> Self {
        Self::new(false)
    }

    /// Record an accepted hit
    pub fn record(&mut self, hit: &Hit) {
        if self.doc_type.is_none() {
            self.doc_type.clone_from(&hit.doc_type);
        }
        if self.retain {
            self.ids.push(hit.id.clone());
        }
    }

    pub fn retains(&self) -> bool {
        self.retain
    }

    /// Identifiers in acceptance order
    pub fn ids(&self) -> &[DocumentId] {
        &self.ids
    }

    /// First type tag seen on an accepted hit
    pub fn doc_type(&self) -> Option<&str> {
        self.doc_type.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Counters of one traversal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TraversalStats {
    /// Search requests issued (open and continuations)
    pub requests: usize,
    /// Hits received
    pub fetched: usize,
    /// Hits that passed the conditions and the budget
    pub accepted: u64,
    /// Whether the count budget ended the traversal
    pub budget_exhausted: bool,
}

/// Drives one scroll traversal
pub struct ScrollDriver<'a> {
    store: &'a dyn DocumentStore,
    collection: &'a CollectionName,
    body: &'a Value,
    ttl: &'a str,
    size: usize,
    limit: Bound,
    conditions: &'a ConditionSet,
    cancel: Cancellation,
    release_timeout: Duration,
}

impl<'a> ScrollDriver<'a> {
    /// Create a driver
    ///
    /// `body` is the primary request payload and `size` its page size.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        store: &'a dyn DocumentStore,
        collection: &'a CollectionName,
        body: &'a Value,
        ttl: &'a str,
        size: usize,
        limit: Bound,
        conditions: &'a ConditionSet,
        cancel: Cancellation,
    ) -> Self {
        Self {
            store,
            collection,
            body,
            ttl,
            size: size.max(1),
            limit,
            conditions,
            cancel,
            release_timeout: RELEASE_TIMEOUT,
        }
    }

    /// Override the scroll release timeout
    pub fn with_release_timeout(mut self, timeout: Duration) -> Self {
        self.release_timeout = timeout;
        self
    }

    /// Run the traversal, feeding accepted hits to `pipeline`
    pub async fn run<W: DocumentWriter + 'static>(
        &self,
        budget: &mut Budget,
        ids: &mut IdCollector,
        pipeline: &mut Pipeline<W>,
    ) -> Result<TraversalStats> {
        let mut stats = TraversalStats::default();
        let mut tokens = Vec::new();

        let outcome = self
            .traverse(budget, ids, pipeline, &mut tokens, &mut stats)
            .await;
        self.release(&tokens).await;

        outcome.map(|_| stats)
    }

    async fn traverse<W: DocumentWriter + 'static>(
        &self,
        budget: &mut Budget,
        ids: &mut IdCollector,
        pipeline: &mut Pipeline<W>,
        tokens: &mut Vec<String>,
        stats: &mut TraversalStats,
    ) -> Result<()> {
        if budget.is_exhausted() {
            stats.budget_exhausted = true;
            return Ok(());
        }

        let mut remaining = self.limit.value();

        tracing::debug!(collection = %self.collection, ttl = self.ttl, "Opening scroll");
        let mut response = self
            .cancel
            .guard(self.store.open_scroll(self.collection, self.body, self.ttl))
            .await?;

        loop {
            stats.requests += 1;
            let page = Page::from(response);

            if let Some(token) = &page.scroll_id {
                if tokens.last() != Some(token) {
                    tokens.push(token.clone());
                }
            }

            let fetched = page.hits.len();
            stats.fetched += fetched;
            tracing::debug!(
                collection = %self.collection,
                page = stats.requests,
                fetched,
                "Received page"
            );

            if !self.consume(page.hits, budget, ids, pipeline, stats).await? {
                stats.budget_exhausted = true;
                tracing::debug!(collection = %self.collection, "Count budget exhausted");
                return Ok(());
            }

            let Some(token) = page.scroll_id else {
                return Ok(());
            };
            if fetched < self.size {
                return Ok(());
            }
            if let Some(left) = remaining.as_mut() {
                if *left <= self.size as u64 {
                    tracing::debug!(collection = %self.collection, "Fetch limit reached");
                    return Ok(());
                }
                *left -= self.size as u64;
            }

            response = self
                .cancel
                .guard(self.store.continue_scroll(&token, self.ttl))
                .await?;
        }
    }

    /// Filter and deliver one page, returning `false` once the budget is spent
    async fn consume<W: DocumentWriter + 'static>(
        &self,
        hits: Vec<Hit>,
        budget: &mut Budget,
        ids: &mut IdCollector,
        pipeline: &mut Pipeline<W>,
        stats: &mut TraversalStats,
    ) -> Result<bool> {
        for hit in hits {
            if !self.conditions.accepts(hit.source.as_ref()) {
                continue;
            }
            if !budget.take() {
                return Ok(false);
            }

            ids.record(&hit);
            stats.accepted += 1;
            pipeline.deliver(hit).await?;

            if budget.is_exhausted() {
                return Ok(false);
            }
        }
        Ok(true)
    }

    async fn release(&self, tokens: &[String]) {
        if tokens.is_empty() {
            return;
        }

        match tokio::time::timeout(self.release_timeout, self.store.clear_scroll(tokens)).await {
            Ok(Ok(())) => {
                tracing::debug!(collection = %self.collection, tokens = tokens.len(), "Released scroll");
            }
            Ok(Err(e)) => {
                tracing::warn!(collection = %self.collection, error = %e, "Failed to release scroll");
            }
            Err(_) => {
                tracing::warn!(
                    collection = %self.collection,
                    timeout_ms = self.release_timeout.as_millis() as u64,
                    "Timed out releasing scroll"
                );
            }
        }
    }
}
