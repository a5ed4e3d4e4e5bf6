// es-sample - Bulk export and sampling for search indices
// Copyright (c) 2026 es-sample Contributors
// Licensed under the MIT License

//! # es-sample - Bulk export and sampling for search indices
//!
//! es-sample scrolls through a search collection, keeps the documents whose
//! leaf paths satisfy a set of glob conditions, and writes them as JSON lines
//! to stdout or to plain, gzip or zstd files. The ids of the kept documents
//! can then be looked up in further collections, producing a consistent
//! sample across related indices.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Traversing** a collection with scroll requests, a count budget and a fetch limit
//! - **Filtering** documents by `existing` / `missing` path conditions
//! - **Writing** documents inline or through a bounded worker pool
//! - **Resolving** the accepted ids in secondary collections
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (scroll, filter, pipeline, resolver, sink, export)
//! - [`adapters`] - HTTP search store client and connection cache
//! - [`domain`] - Core domain types and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging and observability
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use es_sample::config::load_config;
//! use es_sample::core::export::ExportCoordinator;
//! use es_sample::domain::CollectionName;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("es-sample.toml")?;
//!     let collections = vec![
//!         CollectionName::new("orders")?,
//!         CollectionName::new("order-lines")?,
//!     ];
//!
//!     let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//!     let coordinator = ExportCoordinator::new(config, collections, shutdown_rx)?;
//!
//!     let summary = coordinator.execute_export().await?;
//!     println!("Written {} documents", summary.total_written());
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! All fallible operations return [`domain::Result`], backed by [`domain::SampleError`]:
//!
//! ```rust,no_run
//! use es_sample::domain::SampleError;
//!
//! fn example() -> Result<(), SampleError> {
//!     let config = es_sample::config::load_config("es-sample.toml")?;
//!     config.validate().map_err(SampleError::Configuration)?;
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
