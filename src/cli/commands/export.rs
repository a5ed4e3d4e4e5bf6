//! Export command implementation
//!
//! This module implements the `export` command: scroll through the first
//! collection, then look up the accepted ids in every further collection.

use super::{exit_code, EXIT_CONFIG, EXIT_INTERRUPTED, EXIT_SUCCESS};
use crate::config::schema::{normalize_host, UNBOUNDED_TOKEN};
use crate::config::{load_config_or_default, Bound, SampleConfig};
use crate::core::export::{ExportCoordinator, ExportSummary};
use crate::domain::CollectionName;
use clap::{ArgAction, Args};
use serde_json::Value;
use tokio::sync::watch;

/// Arguments for the export command
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Collections to export; the first is scrolled, the rest are looked up by id
    #[arg(value_name = "COLLECTION", required = true)]
    pub collections: Vec<CollectionName>,

    /// Number of write workers ('-' writes inline, in order)
    #[arg(short = 'P', long, value_name = "N", value_parser = parse_parallelism)]
    pub parallelism: Option<usize>,

    /// Write queue capacity [default: page size]
    #[arg(short = 'Q', long = "queue-size", value_name = "N")]
    pub queue_size: Option<usize>,

    /// Scroll keep-alive, e.g. 10s or 1m
    #[arg(short = 'S', long, value_name = "TTL")]
    pub scroll: Option<String>,

    /// Maximum number of accepted documents ('-' for no cap)
    #[arg(short = 'c', long, value_name = "N")]
    pub count: Option<Bound>,

    /// Store URL
    #[arg(short = 'h', long, value_name = "URL")]
    pub host: Option<String>,

    /// Stop scrolling after roughly this many fetched documents ('-' for no cap)
    #[arg(short = 'l', long, value_name = "N")]
    pub limit: Option<Bound>,

    /// Output file ('-' for stdout) [default: <COLLECTION>.jsonl]
    #[arg(short = 'o', long, value_name = "PATH")]
    pub output: Option<String>,

    /// Query clause as JSON
    #[arg(short = 'q', long, value_name = "JSON", value_parser = parse_query)]
    pub query: Option<Value>,

    /// Page size
    #[arg(short = 's', long, value_name = "N")]
    pub size: Option<usize>,

    /// Comma-separated globs of which at least one must match a field path (repeatable)
    #[arg(short = 'e', long, value_name = "GLOBS")]
    pub existing: Vec<String>,

    /// Comma-separated globs of which at least one must match no field path (repeatable)
    #[arg(short = 'm', long, value_name = "GLOBS")]
    pub missing: Vec<String>,

    /// Source fields to fetch; a '-' entry adds every -e/-m glob
    #[arg(short = 'f', long = "source-fields", value_name = "FIELDS", value_delimiter = ',')]
    pub source_fields: Option<Vec<String>>,

    /// Stored fields to fetch, exported under "_"
    #[arg(short = 'F', long = "stored-fields", value_name = "FIELDS", value_delimiter = ',')]
    pub stored_fields: Option<Vec<String>>,

    /// Docvalue fields to fetch, exported under "_"
    #[arg(short = 'D', long = "docvalue-fields", value_name = "FIELDS", value_delimiter = ',')]
    pub docvalue_fields: Option<Vec<String>>,

    /// Delete each collection after exporting it
    #[arg(short = 'd', long)]
    pub delete: bool,

    /// Pretty-print documents
    #[arg(short = 'p', long)]
    pub pretty: bool,

    /// Sample in random order
    #[arg(short = 'r', long)]
    pub random: bool,

    /// Print help
    #[arg(long, action = ArgAction::Help)]
    pub help: Option<bool>,
}

fn parse_parallelism(value: &str) -> Result<usize, String> {
    if value == UNBOUNDED_TOKEN {
        return Ok(0);
    }
    value
        .parse()
        .map_err(|_| format!("expected a number or '{UNBOUNDED_TOKEN}', got '{value}'"))
}

fn parse_query(value: &str) -> Result<Value, String> {
    serde_json::from_str(value).map_err(|e| format!("invalid query JSON: {e}"))
}

fn split_globs(lists: &[String]) -> Vec<Vec<String>> {
    lists
        .iter()
        .map(|list| list.split(',').map(|g| g.trim().to_string()).collect())
        .collect()
}

impl ExportArgs {
    /// Apply command-line overrides on top of the loaded configuration
    pub fn apply_overrides(&self, config: &mut SampleConfig) {
        let query = &mut config.query;

        if let Some(host) = &self.host {
            config.store.host = normalize_host(host);
        }
        if let Some(scroll) = &self.scroll {
            config.store.scroll = scroll.clone();
        }
        if let Some(value) = &self.query {
            query.query = value.clone();
        }
        if let Some(size) = self.size {
            query.size = size;
        }
        if let Some(limit) = self.limit {
            query.limit = limit;
        }
        if let Some(count) = self.count {
            query.count = count;
        }
        if self.random {
            query.random = true;
        }
        if !self.existing.is_empty() {
            query.existing = split_globs(&self.existing);
        }
        if !self.missing.is_empty() {
            query.missing = split_globs(&self.missing);
        }
        if let Some(fields) = &self.stored_fields {
            query.stored_fields = Some(fields.clone());
        }
        if let Some(fields) = &self.docvalue_fields {
            query.docvalue_fields = Some(fields.clone());
        }
        if let Some(fields) = &self.source_fields {
            query.source_fields = Some(fields.clone());
        }

        let export = &mut config.export;
        if let Some(output) = &self.output {
            export.output = Some(output.clone());
        }
        if let Some(parallelism) = self.parallelism {
            export.parallelism = parallelism;
        }
        if let Some(queue_size) = self.queue_size {
            export.queue_size = Some(queue_size);
        }
        if self.pretty {
            export.pretty = true;
        }
        if self.delete {
            export.delete = true;
        }
    }

    /// Execute the export command
    pub async fn execute(
        &self,
        config_path: &str,
        config_required: bool,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!(collections = ?self.collections, "Starting export command");

        let mut config = match load_config_or_default(config_path, config_required) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        self.apply_overrides(&mut config);

        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(EXIT_CONFIG);
        }

        let coordinator =
            match ExportCoordinator::new(config, self.collections.clone(), shutdown_signal) {
                Ok(c) => c.announce_destinations(true),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to create export coordinator");
                    eprintln!("Failed to initialize export: {e}");
                    return Ok(exit_code(&e));
                }
            };

        match coordinator.execute_export().await {
            Ok(summary) => {
                print_summary(&summary);
                Ok(EXIT_SUCCESS)
            }
            Err(e) => {
                let code = exit_code(&e);
                if code == EXIT_INTERRUPTED {
                    tracing::info!("Export interrupted by user signal");
                    eprintln!("Export interrupted.");
                } else {
                    tracing::error!(error = %e, "Export failed");
                    eprintln!("Export failed: {e}");
                }
                Ok(code)
            }
        }
    }
}

/// Summary goes to stderr; stdout may be carrying the exported documents
fn print_summary(summary: &ExportSummary) {
    eprintln!();
    eprintln!("📊 Export Summary:");
    for collection in &summary.collections {
        eprintln!(
            "  {} ({}): {} written to {}, {} request(s){}",
            collection.collection,
            collection.kind,
            collection.written,
            collection.destination,
            collection.requests,
            if collection.deleted { ", deleted" } else { "" }
        );
    }
    if summary.secondary_skipped {
        eprintln!("  No documents accepted, additional collections skipped");
    }
    eprintln!("  Accepted: {}", summary.accepted);
    eprintln!("  Requests: {}", summary.total_requests());
    eprintln!("  Started: {}", summary.started_at.format("%Y-%m-%d %H:%M:%S UTC"));
    eprintln!("  Duration: {:.2}s", summary.duration.as_secs_f64());
}
