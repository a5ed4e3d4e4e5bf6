//! Logging and observability
//!
//! Structured logging with:
//! - Human-readable console output on stderr
//! - Configurable log levels (`--log-level`, `RUST_LOG`)
//! - Optional JSON file logging with rotation
//!
//! # Example
//!
//! ```no_run
//! use es_sample::logging::init_logging;
//! use es_sample::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(collection = "products", "Export started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log the completion of one collection pass
///
/// # Example
///
/// ```no_run
/// use es_sample::log_collection_complete;
/// use std::time::Duration;
///
/// log_collection_complete!("products", 42, Duration::from_secs(3));
/// ```
#[macro_export]
macro_rules! log_collection_complete {
    ($collection:expr, $written:expr, $duration:expr) => {
        tracing::info!(
            collection = %$collection,
            written = $written,
            duration_ms = $duration.as_millis() as u64,
            "Collection export completed"
        );
    };
}

/// Log a retry attempt
///
/// # Example
///
/// ```no_run
/// use es_sample::log_retry_attempt;
///
/// log_retry_attempt!(1, 1, "connection reset by peer");
/// ```
#[macro_export]
macro_rules! log_retry_attempt {
    ($attempt:expr, $max_attempts:expr, $reason:expr) => {
        tracing::warn!(
            attempt = $attempt,
            max_attempts = $max_attempts,
            reason = %$reason,
            "Retrying request"
        );
    };
}
