//! Error context extension trait
//!
//! Adds `.context()` / `.with_context()` to any `Result` whose error converts
//! into [`SampleError`]. The variant of the wrapped error is kept, so exit-code
//! classification still works after context has been attached.
//!
//! ```rust
//! use es_sample::domain::context::ResultExt;
//! use es_sample::domain::Result;
//!
//! fn read_query(path: &str) -> Result<String> {
//!     std::fs::read_to_string(path).with_context(|| format!("Failed to read {path}"))
//! }
//! ```

use crate::domain::errors::SampleError;
use crate::domain::result::Result;
use std::fmt::Display;

/// Extension trait for adding context to `Result` types
pub trait ResultExt<T> {
    /// Add context to an error (evaluated eagerly)
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display;

    /// Add context to an error, computing it only on failure
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display,
        F: FnOnce() -> C;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<SampleError>,
{
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display,
    {
        self.map_err(|e| attach(e.into(), context))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display,
        F: FnOnce() -> C,
    {
        self.map_err(|e| attach(e.into(), f()))
    }
}

fn attach(error: SampleError, context: impl Display) -> SampleError {
    match error {
        SampleError::Configuration(m) => SampleError::Configuration(format!("{context}: {m}")),
        SampleError::Output(m) => SampleError::Output(format!("{context}: {m}")),
        SampleError::Serialization(m) => SampleError::Serialization(format!("{context}: {m}")),
        SampleError::Io(m) => SampleError::Io(format!("{context}: {m}")),
        SampleError::Other(m) => SampleError::Other(format!("{context}: {m}")),
        // Store errors carry their own request context
        err @ (SampleError::Store(_) | SampleError::Interrupted) => err,
    }
}
