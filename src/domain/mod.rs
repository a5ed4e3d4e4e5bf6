//! Domain models and types for es-sample.
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`CollectionName`], [`DocumentId`])
//! - **The document model** ([`Hit`])
//! - **Error types** ([`SampleError`], [`StoreError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, SampleError>`]:
//!
//! ```rust
//! use es_sample::domain::{CollectionName, Result, SampleError};
//!
//! fn example() -> Result<CollectionName> {
//!     CollectionName::new("products").map_err(SampleError::Configuration)
//! }
//! ```

pub mod context;
pub mod document;
pub mod errors;
pub mod ids;
pub mod result;

// Re-export commonly used types for convenience
pub use document::Hit;
pub use errors::{SampleError, StoreError};
pub use ids::{CollectionName, DocumentId};
pub use result::Result;
