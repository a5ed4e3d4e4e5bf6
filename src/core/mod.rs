//! Core export pipeline for es-sample.
//!
//! # Modules
//!
//! - [`query`] - request payloads for scroll traversal and id lookups
//! - [`filter`] - leaf path flattening and glob conditions
//! - [`scroll`] - scroll traversal with count budget and fetch limit
//! - [`pipeline`] - inline or fan-out delivery to a writer
//! - [`resolver`] - id-batch lookups in additional collections
//! - [`sink`] - stdout, plain and compressed file output
//! - [`export`] - orchestration and summary
//!
//! # Export Workflow
//!
//! 1. **Refresh** the primary collection and open its sink
//! 2. **Scroll** through it page by page, filtering each document
//! 3. **Write** accepted documents inline or through the worker pool
//! 4. **Release** every scroll token
//! 5. **Resolve** accepted ids in each additional collection
//! 6. **Delete** exported collections when requested
//!
//! # Example
//!
//! ```rust,no_run
//! use es_sample::config::load_config;
//! use es_sample::core::export::ExportCoordinator;
//! use es_sample::domain::CollectionName;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("es-sample.toml")?;
//! let collections = vec![CollectionName::new("products")?];
//!
//! let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//! let coordinator = ExportCoordinator::new(config, collections, shutdown_rx)?;
//!
//! let summary = coordinator.execute_export().await?;
//! println!("Written: {}", summary.total_written());
//! # Ok(())
//! # }
//! ```

pub mod cancel;
pub mod export;
pub mod filter;
pub mod pipeline;
pub mod query;
pub mod resolver;
pub mod scroll;
pub mod sink;
