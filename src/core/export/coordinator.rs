//! Export coordinator - main orchestrator for the export process
//!
//! Runs the primary pass (scroll traversal of the first collection) and then
//! one secondary pass per additional collection. Every pass refreshes its
//! collection, opens its own sink, writes through a [`Pipeline`], closes the
//! sink and optionally deletes the collection.

use crate::adapters::store::{DocumentStore, HttpStore};
use crate::config::SampleConfig;
use crate::core::cancel::Cancellation;
use crate::core::export::summary::{CollectionSummary, ExportSummary, PassKind};
use crate::core::filter::ConditionSet;
use crate::core::pipeline::Pipeline;
use crate::core::query::QueryBuilder;
use crate::core::resolver::SecondaryResolver;
use crate::core::scroll::{Budget, IdCollector, ScrollDriver};
use crate::core::sink::{Destination, OutputSink};
use crate::domain::{CollectionName, Result, SampleError};
use crate::log_collection_complete;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;

/// Export coordinator
pub struct ExportCoordinator {
    config: SampleConfig,
    collections: Vec<CollectionName>,
    store: Arc<dyn DocumentStore>,
    cancel: Cancellation,
    announce: bool,
}

impl ExportCoordinator {
    /// Create a coordinator talking to the configured host
    ///
    /// The first collection is the primary one; the rest are resolved by id.
    pub fn new(
        config: SampleConfig,
        collections: Vec<CollectionName>,
        shutdown_signal: watch::Receiver<bool>,
    ) -> Result<Self> {
        let store = Arc::new(HttpStore::new(&config.store)?);
        Self::with_store(config, collections, store, shutdown_signal)
    }

    /// Create a coordinator over an existing store
    ///
    /// A `-` entry in the source fields is replaced here by every condition
    /// glob, after all configuration layers have been merged.
    pub fn with_store(
        mut config: SampleConfig,
        collections: Vec<CollectionName>,
        store: Arc<dyn DocumentStore>,
        shutdown_signal: watch::Receiver<bool>,
    ) -> Result<Self> {
        config.validate().map_err(SampleError::Configuration)?;
        config.query.expand_source_fields();
        if collections.is_empty() {
            return Err(SampleError::Configuration(
                "at least one collection is required".to_string(),
            ));
        }

        Ok(Self {
            config,
            collections,
            store,
            cancel: Cancellation::new(shutdown_signal),
            announce: false,
        })
    }

    /// Print each file destination to stdout as it is opened
    pub fn announce_destinations(mut self, announce: bool) -> Self {
        self.announce = announce;
        self
    }

    /// Execute the export
    ///
    /// Any fatal error ends the run; output flushed so far is kept and
    /// collections are only deleted after a successful pass.
    pub async fn execute_export(&self) -> Result<ExportSummary> {
        let start_time = Instant::now();
        let mut summary = ExportSummary::new();

        let (primary, additional) = self
            .collections
            .split_first()
            .ok_or_else(|| SampleError::Configuration("no collection given".to_string()))?;

        let query = &self.config.query;
        let conditions = ConditionSet::from_config(query)?;
        let builder = QueryBuilder::new(query);

        tracing::info!(
            host = self.store.base_url(),
            collection = %primary,
            additional = additional.len(),
            conditions = conditions.len(),
            count = %query.count,
            limit = %query.limit,
            "Starting export"
        );

        let mut budget = Budget::new(query.count);
        let mut ids = IdCollector::new(!additional.is_empty());

        let primary_summary = self
            .export_primary(primary, &builder, &conditions, &mut budget, &mut ids)
            .await?;
        summary.accepted = primary_summary.0;
        summary.budget_exhausted = primary_summary.1;
        summary.add_collection(primary_summary.2);

        if !additional.is_empty() && ids.is_empty() {
            summary.secondary_skipped = true;
        } else if !additional.is_empty() {
            let resolver = SecondaryResolver::new(
                self.store.as_ref(),
                builder,
                query.size,
                self.cancel.clone(),
            );
            for collection in additional {
                let collection_summary = self.export_secondary(collection, &resolver, &ids).await?;
                summary.add_collection(collection_summary);
            }
        }

        summary = summary.with_duration(start_time.elapsed());
        summary.log_summary();

        Ok(summary)
    }

    async fn export_primary(
        &self,
        collection: &CollectionName,
        builder: &QueryBuilder<'_>,
        conditions: &ConditionSet,
        budget: &mut Budget,
        ids: &mut IdCollector,
    ) -> Result<(u64, bool, CollectionSummary)> {
        let started = Instant::now();
        let (mut pipeline, destination) = self.open_pass(collection, PassKind::Primary).await?;

        let body = builder.primary();
        let driver = ScrollDriver::new(
            self.store.as_ref(),
            collection,
            &body,
            &self.config.store.scroll,
            self.config.query.size,
            self.config.query.limit,
            conditions,
            self.cancel.clone(),
        );
        let outcome = driver.run(budget, ids, &mut pipeline).await;
        let (stats, written) = close_pass(pipeline, outcome).await?;

        let mut collection_summary =
            CollectionSummary::new(collection.clone(), PassKind::Primary, destination.to_string());
        collection_summary.requests = stats.requests;
        collection_summary.fetched = stats.fetched;
        collection_summary.written = written;
        collection_summary.deleted = self.delete_if_requested(collection).await?;
        collection_summary.duration = started.elapsed();

        log_collection_complete!(collection, written, collection_summary.duration);
        Ok((stats.accepted, stats.budget_exhausted, collection_summary))
    }

    async fn export_secondary(
        &self,
        collection: &CollectionName,
        resolver: &SecondaryResolver<'_>,
        ids: &IdCollector,
    ) -> Result<CollectionSummary> {
        let started = Instant::now();
        let (mut pipeline, destination) = self.open_pass(collection, PassKind::Secondary).await?;

        let outcome = resolver
            .resolve(collection, ids.doc_type(), ids.ids(), &mut pipeline)
            .await;
        let (stats, written) = close_pass(pipeline, outcome).await?;

        let mut collection_summary =
            CollectionSummary::new(collection.clone(), PassKind::Secondary, destination.to_string());
        collection_summary.requests = stats.requests;
        collection_summary.fetched = stats.fetched;
        collection_summary.written = written;
        collection_summary.deleted = self.delete_if_requested(collection).await?;
        collection_summary.duration = started.elapsed();

        log_collection_complete!(collection, written, collection_summary.duration);
        Ok(collection_summary)
    }

    /// Refresh the collection and open its sink and pipeline
    async fn open_pass(
        &self,
        collection: &CollectionName,
        kind: PassKind,
    ) -> Result<(Pipeline<OutputSink>, Destination)> {
        self.cancel.guard(self.store.refresh(collection)).await?;

        let destination = Destination::resolve(
            self.config.export.output.as_deref(),
            collection,
            kind == PassKind::Secondary,
        );
        if self.announce && destination.is_file() {
            println!("{destination}");
        }

        tracing::info!(
            collection = %collection,
            kind = %kind,
            destination = %destination,
            "Exporting collection"
        );

        let sink = OutputSink::open(destination.clone(), self.config.export.pretty)?;
        let pipeline = Pipeline::start(
            sink,
            self.config.export.parallelism,
            self.config.queue_capacity(),
            self.cancel.clone(),
        );
        Ok((pipeline, destination))
    }

    async fn delete_if_requested(&self, collection: &CollectionName) -> Result<bool> {
        if !self.config.export.delete {
            return Ok(false);
        }

        self.cancel
            .guard(self.store.delete_collection(collection))
            .await?;
        tracing::info!(collection = %collection, "Deleted collection");
        Ok(true)
    }
}

/// Stop the pipeline and close the sink, keeping the most telling error
async fn close_pass<T>(pipeline: Pipeline<OutputSink>, outcome: Result<T>) -> Result<(T, u64)> {
    match (outcome, pipeline.finish().await) {
        (Ok(value), Ok(sink)) => Ok((value, sink.finish()?)),
        (Err(e), Ok(sink)) => {
            if let Err(close) = sink.finish() {
                tracing::warn!(error = %close, "Failed to close output after error");
            }
            Err(e)
        }
        (Err(SampleError::Interrupted), Err(_)) => Err(SampleError::Interrupted),
        (_, Err(worker)) => Err(worker),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::store::memory::{Call, MemoryStore};
    use crate::config::Bound;
    use crate::domain::Hit;
    use serde_json::json;
    use std::path::Path;
    use tempfile::TempDir;

    fn names(list: &[&str]) -> Vec<CollectionName> {
        list.iter().map(|n| CollectionName::new(*n).unwrap()).collect()
    }

    fn config(output: &Path) -> SampleConfig {
        let mut config = SampleConfig::default();
        config.query.size = 2;
        config.query.count = Bound::Unbounded;
        config.export.parallelism = 0;
        config.export.output = Some(output.to_string_lossy().into_owned());
        config
    }

    fn products() -> Vec<Hit> {
        vec![
            Hit::new("p1", json!({"name": "lamp", "tags": {"color": "red"}})),
            Hit::new("p2", json!({"name": "desk"})),
            Hit::new("p3", json!({"name": "chair", "tags": {"size": "xl"}})),
        ]
    }

    fn reviews() -> Vec<Hit> {
        vec![
            Hit::new("p3", json!({"stars": 4})),
            Hit::new("p1", json!({"stars": 5})),
            Hit::new("p9", json!({"stars": 1})),
        ]
    }

    fn lines(path: &Path) -> Vec<String> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(String::from)
            .collect()
    }

    fn coordinator(
        config: SampleConfig,
        collections: &[&str],
        store: Arc<MemoryStore>,
    ) -> ExportCoordinator {
        let (_tx, rx) = watch::channel(false);
        ExportCoordinator::with_store(config, names(collections), store, rx).unwrap()
    }

    #[tokio::test]
    async fn test_primary_only_export() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("out.jsonl");
        let store = Arc::new(MemoryStore::new().with_collection("products", products()));

        let summary = coordinator(config(&output), &["products"], store.clone())
            .execute_export()
            .await
            .unwrap();

        assert_eq!(summary.accepted, 3);
        assert_eq!(summary.collections.len(), 1);
        assert_eq!(summary.collections[0].written, 3);
        assert_eq!(summary.collections[0].requests, 2);
        assert_eq!(lines(&output).len(), 3);

        let calls = store.calls();
        assert_eq!(calls.first(), Some(&Call::Refresh("products".to_string())));
        assert!(matches!(calls.last(), Some(Call::Clear(_))));
    }

    #[tokio::test]
    async fn test_secondary_collections_append_to_shared_output() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("all.jsonl");
        let store = Arc::new(
            MemoryStore::new()
                .with_collection("products", products())
                .with_collection("reviews", reviews()),
        );

        let mut config = config(&output);
        config.query.existing = vec![vec!["tags.*".to_string()]];

        let summary = coordinator(config, &["products", "reviews"], store.clone())
            .execute_export()
            .await
            .unwrap();

        assert_eq!(summary.accepted, 2);
        assert_eq!(summary.collections[1].kind, PassKind::Secondary);
        assert_eq!(summary.collections[1].written, 2);
        assert_eq!(
            lines(&output),
            vec![
                r#"{"name":"lamp","tags":{"color":"red"}}"#,
                r#"{"name":"chair","tags":{"size":"xl"}}"#,
                r#"{"stars":5}"#,
                r#"{"stars":4}"#,
            ]
        );
        assert!(store.calls().contains(&Call::Refresh("reviews".to_string())));
    }

    #[tokio::test]
    async fn test_secondary_skipped_without_accepted_ids() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("out.jsonl");
        let store = Arc::new(
            MemoryStore::new()
                .with_collection("products", products())
                .with_collection("reviews", reviews()),
        );

        let mut config = config(&output);
        config.query.existing = vec![vec!["nothing.matches".to_string()]];

        let summary = coordinator(config, &["products", "reviews"], store.clone())
            .execute_export()
            .await
            .unwrap();

        assert!(summary.secondary_skipped);
        assert_eq!(summary.collections.len(), 1);
        assert!(!store.calls().iter().any(|c| matches!(c, Call::Search(_))));
        assert!(lines(&output).is_empty());
    }

    #[tokio::test]
    async fn test_delete_after_export() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("out.jsonl");
        let store = Arc::new(
            MemoryStore::new()
                .with_collection("products", products())
                .with_collection("reviews", reviews()),
        );

        let mut config = config(&output);
        config.export.delete = true;

        let summary = coordinator(config, &["products", "reviews"], store.clone())
            .execute_export()
            .await
            .unwrap();

        assert!(summary.collections.iter().all(|c| c.deleted));
        let deletes: Vec<Call> = store
            .calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Delete(_)))
            .collect();
        assert_eq!(
            deletes,
            vec![
                Call::Delete("products".to_string()),
                Call::Delete("reviews".to_string())
            ]
        );
    }

    #[tokio::test]
    async fn test_fan_out_export_writes_everything_once() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("out.jsonl.gz");
        let docs: Vec<Hit> = (0..100)
            .map(|i| Hit::new(format!("{i:03}"), json!({ "i": i })))
            .collect();
        let store = Arc::new(MemoryStore::new().with_collection("products", docs));

        let mut config = config(&output);
        config.query.size = 7;
        config.export.parallelism = 4;
        config.export.queue_size = Some(10);

        let summary = coordinator(config, &["products"], store)
            .execute_export()
            .await
            .unwrap();
        assert_eq!(summary.total_written(), 100);

        let mut decoded = String::new();
        std::io::Read::read_to_string(
            &mut flate2::read::GzDecoder::new(std::fs::File::open(&output).unwrap()),
            &mut decoded,
        )
        .unwrap();
        let mut seen: Vec<u64> = decoded
            .lines()
            .map(|l| serde_json::from_str::<serde_json::Value>(l).unwrap()["i"].as_u64().unwrap())
            .collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..100).collect::<Vec<u64>>());
    }

    #[tokio::test]
    async fn test_repeat_runs_are_byte_identical() {
        let dir = TempDir::new().unwrap();
        let first = dir.path().join("first.jsonl");
        let second = dir.path().join("second.jsonl");

        for output in [&first, &second] {
            let store = Arc::new(MemoryStore::new().with_collection("products", products()));
            coordinator(config(output), &["products"], store)
                .execute_export()
                .await
                .unwrap();
        }

        assert_eq!(
            std::fs::read(&first).unwrap(),
            std::fs::read(&second).unwrap()
        );
    }

    #[tokio::test]
    async fn test_interrupted_export() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("out.jsonl");
        let store = Arc::new(MemoryStore::new().with_collection("products", products()));

        let (tx, rx) = watch::channel(false);
        let coordinator =
            ExportCoordinator::with_store(config(&output), names(&["products"]), store.clone(), rx)
                .unwrap();
        tx.send(true).unwrap();

        let err = coordinator.execute_export().await.unwrap_err();
        assert!(matches!(err, SampleError::Interrupted));
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_store_error_keeps_collection() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("out.jsonl");
        let store = Arc::new(
            MemoryStore::new()
                .with_collection("products", products())
                .fail_continue_after(0),
        );

        let mut config = config(&output);
        config.export.delete = true;

        let err = coordinator(config, &["products"], store.clone())
            .execute_export()
            .await
            .unwrap_err();
        assert!(matches!(err, SampleError::Store(_)));
        assert_eq!(lines(&output).len(), 2);
        assert!(!store.calls().iter().any(|c| matches!(c, Call::Delete(_))));
    }

    #[test]
    fn test_rejects_invalid_config() {
        let mut config = SampleConfig::default();
        config.query.size = 0;
        let (_tx, rx) = watch::channel(false);
        let store = Arc::new(MemoryStore::new());

        let result = ExportCoordinator::with_store(config, names(&["products"]), store, rx);
        assert!(matches!(result, Err(SampleError::Configuration(_))));
    }

    #[test]
    fn test_source_fields_expanded_after_all_layers() {
        let mut config = SampleConfig::default();
        config.query.source_fields = Some(vec!["id".to_string(), "-".to_string()]);
        config.query.existing = vec![vec!["tags.*".to_string()]];
        config.query.missing = vec![vec!["draft".to_string()]];
        let store = Arc::new(MemoryStore::new());

        let coordinator = coordinator(config, &["products"], store);
        assert_eq!(
            coordinator.config.query.source_fields,
            Some(vec![
                "id".to_string(),
                "tags.*".to_string(),
                "draft".to_string()
            ])
        );
    }

    #[test]
    fn test_requires_a_collection() {
        let (_tx, rx) = watch::channel(false);
        let store = Arc::new(MemoryStore::new());
        let result = ExportCoordinator::with_store(SampleConfig::default(), Vec::new(), store, rx);
        assert!(matches!(result, Err(SampleError::Configuration(_))));
    }
}
