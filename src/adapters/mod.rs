//! External system integrations for es-sample.
//!
//! - [`store`] - search-index HTTP API (scroll, search, refresh, delete)
//!
//! # Design Pattern
//!
//! Adapters isolate external dependencies behind traits so the export pipeline
//! can be exercised against in-memory implementations in tests.
//!
//! ```rust,no_run
//! use es_sample::adapters::store::{DocumentStore, HttpStore};
//! use es_sample::config::StoreConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = StoreConfig {
//!     host: "https://search.example.com:9200".to_string(),
//!     ..Default::default()
//! };
//! let store = HttpStore::new(&config)?;
//! println!("Talking to {}", store.base_url());
//! # Ok(())
//! # }
//! ```

pub mod store;
