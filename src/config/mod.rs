//! Configuration management for es-sample.
//!
//! Configuration is layered, lowest priority first:
//!
//! 1. Built-in defaults
//! 2. An optional TOML file (`es-sample.toml` unless `--config` is given), with
//!    `${VAR_NAME}` environment substitution
//! 3. `ES_SAMPLE_<SECTION>_<KEY>` environment overrides
//! 4. Command-line flags of the `export` command
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [store]
//! host = "https://search.example.com:9200"
//! scroll = "1m"
//!
//! [query]
//! query = { term = { status = "active" } }
//! size = 500
//! count = "-"
//! existing = [["user.*"]]
//!
//! [export]
//! output = "active.jsonl.gz"
//! parallelism = 4
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use es_sample::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("es-sample.toml")?;
//! println!("Store: {}", config.store.host);
//! # Ok(())
//! # }
//! ```

pub mod loader;
pub mod schema;

// Re-export commonly used types
pub use loader::{load_config, load_config_or_default};
pub use schema::{
    ApplicationConfig, Bound, ExportConfig, LoggingConfig, QueryConfig, SampleConfig,
    StoreConfig,
};
