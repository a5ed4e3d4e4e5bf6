//! Secondary collection lookups
//!
//! Re-fetches the identifiers accepted from the primary collection from
//! another collection, one `ids` query per page-size batch. Returned hits are
//! written without conditions or count budget.

use crate::adapters::store::{DocumentStore, Page};
use crate::core::cancel::Cancellation;
use crate::core::pipeline::Pipeline;
use crate::core::query::QueryBuilder;
use crate::core::sink::DocumentWriter;
use crate::domain::{CollectionName, DocumentId, Result};
use std::collections::BTreeMap;

/// Split `ids` into consecutive batches of at most `size` identifiers
pub fn batches(ids: &[DocumentId], size: usize) -> BTreeMap<usize, Vec<&DocumentId>> {
    let size = size.max(1);
    let mut batches: BTreeMap<usize, Vec<&DocumentId>> = BTreeMap::new();
    for (position, id) in ids.iter().enumerate() {
        batches.entry(position / size).or_default().push(id);
    }
    batches
}

/// Counters of one secondary collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveStats {
    pub requests: usize,
    pub fetched: usize,
}

/// Fetches identifiers from additional collections
pub struct SecondaryResolver<'a> {
    store: &'a dyn DocumentStore,
    builder: QueryBuilder<'a>,
    size: usize,
    cancel: Cancellation,
}

impl<'a> SecondaryResolver<'a> {
    pub fn new(
        store: &'a dyn DocumentStore,
        builder: QueryBuilder<'a>,
        size: usize,
        cancel: Cancellation,
    ) -> Self {
        Self {
            store,
            builder,
            size,
            cancel,
        }
    }

    /// Look up `ids` in `collection` and deliver every hit found
    ///
    /// `doc_type` scopes the lookup to the type tag seen on the primary pass.
    pub async fn resolve<W: DocumentWriter + 'static>(
        &self,
        collection: &CollectionName,
        doc_type: Option<&str>,
        ids: &[DocumentId],
        pipeline: &mut Pipeline<W>,
    ) -> Result<ResolveStats> {
        let mut stats = ResolveStats::default();

        for (index, batch) in batches(ids, self.size) {
            let batch: Vec<DocumentId> = batch.into_iter().cloned().collect();
            let body = self.builder.by_ids(doc_type, &batch);

            let response = self
                .cancel
                .guard(self.store.search(collection, &body))
                .await?;
            stats.requests += 1;

            let page = Page::from(response);
            tracing::debug!(
                collection = %collection,
                batch = index,
                requested = batch.len(),
                found = page.hits.len(),
                "Resolved id batch"
            );

            stats.fetched += page.hits.len();
            for hit in page.hits {
                pipeline.deliver(hit).await?;
            }
        }

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::store::memory::{Call, MemoryStore};
    use crate::config::QueryConfig;
    use crate::domain::Hit;
    use serde_json::json;

    fn ids(names: &[&str]) -> Vec<DocumentId> {
        names.iter().map(|n| DocumentId::from(*n)).collect()
    }

    #[test]
    fn test_batches_preserve_order() {
        let ids = ids(&["e", "a", "d", "b", "c"]);
        let batches = batches(&ids, 2);

        let grouped: Vec<Vec<&str>> = batches
            .values()
            .map(|b| b.iter().map(|id| id.as_str()).collect())
            .collect();
        assert_eq!(grouped, vec![vec!["e", "a"], vec!["d", "b"], vec!["c"]]);
    }

    #[test]
    fn test_batches_empty() {
        assert!(batches(&[], 10).is_empty());
    }

    #[test]
    fn test_batches_exact_multiple() {
        let ids = ids(&["a", "b", "c", "d"]);
        assert_eq!(batches(&ids, 2).len(), 2);
        assert_eq!(batches(&ids, 4).len(), 1);
    }

    #[tokio::test]
    async fn test_resolve_writes_hits_sorted_per_batch() {
        let store = MemoryStore::new().with_collection(
            "reviews",
            vec![
                Hit::new("3", json!({"r": 3})),
                Hit::new("1", json!({"r": 1})),
                Hit::new("2", json!({"r": 2})),
                Hit::new("9", json!({"r": 9})),
            ],
        );
        let config = QueryConfig {
            size: 2,
            ..Default::default()
        };
        let resolver = SecondaryResolver::new(
            &store,
            QueryBuilder::new(&config),
            config.size,
            Cancellation::never(),
        );

        let reviews = CollectionName::new("reviews").unwrap();
        let mut pipeline = Pipeline::start(Vec::<Hit>::new(), 0, 1, Cancellation::never());
        let stats = resolver
            .resolve(&reviews, None, &ids(&["3", "1", "2"]), &mut pipeline)
            .await
            .unwrap();

        assert_eq!(stats, ResolveStats { requests: 2, fetched: 3 });
        assert_eq!(store.count(|c| matches!(c, Call::Search(_))), 2);

        let written = pipeline.finish().await.unwrap();
        let order: Vec<&str> = written.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(order, vec!["1", "3", "2"]);
    }

    #[tokio::test]
    async fn test_resolve_ignores_unknown_ids() {
        let store = MemoryStore::new().with_collection("reviews", vec![Hit::new("1", json!({}))]);
        let config = QueryConfig::default();
        let resolver =
            SecondaryResolver::new(&store, QueryBuilder::new(&config), 10, Cancellation::never());

        let reviews = CollectionName::new("reviews").unwrap();
        let mut pipeline = Pipeline::start(Vec::<Hit>::new(), 0, 1, Cancellation::never());
        let stats = resolver
            .resolve(&reviews, Some("doc"), &ids(&["1", "missing"]), &mut pipeline)
            .await
            .unwrap();

        assert_eq!(stats.fetched, 1);
        assert_eq!(pipeline.finish().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_resolve_nothing_issues_no_requests() {
        let store = MemoryStore::new();
        let config = QueryConfig::default();
        let resolver =
            SecondaryResolver::new(&store, QueryBuilder::new(&config), 10, Cancellation::never());

        let reviews = CollectionName::new("reviews").unwrap();
        let mut pipeline = Pipeline::start(Vec::<Hit>::new(), 0, 1, Cancellation::never());
        let stats = resolver
            .resolve(&reviews, None, &[], &mut pipeline)
            .await
            .unwrap();

        assert_eq!(stats, ResolveStats::default());
        assert!(store.calls().is_empty());
    }
}
