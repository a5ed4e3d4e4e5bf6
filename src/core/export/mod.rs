//! Export orchestration
//!
//! This module provides the top-level export flow:
//! - Primary and secondary collection passes
//! - Summary and reporting

pub mod coordinator;
pub mod summary;

pub use coordinator::ExportCoordinator;
pub use summary::{CollectionSummary, ExportSummary, PassKind};
