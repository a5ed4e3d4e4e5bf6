//! Export summary and reporting
//!
//! This module defines structures for tracking and reporting export results.

use crate::domain::CollectionName;
use chrono::{DateTime, Utc};
use std::fmt;
use std::time::Duration;

/// Which pass a collection was exported in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassKind {
    /// Scroll traversal of the first collection
    Primary,
    /// Id lookups in an additional collection
    Secondary,
}

impl fmt::Display for PassKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PassKind::Primary => write!(f, "primary"),
            PassKind::Secondary => write!(f, "secondary"),
        }
    }
}

/// Result of exporting one collection
#[derive(Debug, Clone)]
pub struct CollectionSummary {
    /// Collection name
    pub collection: CollectionName,

    /// Pass kind
    pub kind: PassKind,

    /// Output destination as shown to the user
    pub destination: String,

    /// Search requests issued for this collection
    pub requests: usize,

    /// Hits received from the store
    pub fetched: usize,

    /// Lines written to the destination
    pub written: u64,

    /// Whether the collection was deleted afterwards
    pub deleted: bool,

    /// Time spent on this collection
    pub duration: Duration,
}

impl CollectionSummary {
    /// Create an empty summary for `collection`
    pub fn new(collection: CollectionName, kind: PassKind, destination: impl Into<String>) -> Self {
        Self {
            collection,
            kind,
            destination: destination.into(),
            requests: 0,
            fetched: 0,
            written: 0,
            deleted: false,
            duration: Duration::ZERO,
        }
    }
}

/// Summary of an export run
#[derive(Debug, Clone)]
pub struct ExportSummary {
    /// When the run started
    pub started_at: DateTime<Utc>,

    /// Documents accepted from the primary collection
    pub accepted: u64,

    /// Whether the count budget ended the primary traversal
    pub budget_exhausted: bool,

    /// Whether the secondary pass was skipped for lack of accepted ids
    pub secondary_skipped: bool,

    /// Per-collection results, in export order
    pub collections: Vec<CollectionSummary>,

    /// Duration of the export
    pub duration: Duration,
}

impl ExportSummary {
    /// Create a new empty export summary
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            accepted: 0,
            budget_exhausted: false,
            secondary_skipped: false,
            collections: Vec::new(),
            duration: Duration::ZERO,
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Record a finished collection
    pub fn add_collection(&mut self, collection: CollectionSummary) {
        self.collections.push(collection);
    }

    /// Total search requests across all collections
    pub fn total_requests(&self) -> usize {
        self.collections.iter().map(|c| c.requests).sum()
    }

    /// Total lines written across all collections
    pub fn total_written(&self) -> u64 {
        self.collections.iter().map(|c| c.written).sum()
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            started_at = %self.started_at.to_rfc3339(),
            collections = self.collections.len(),
            accepted = self.accepted,
            written = self.total_written(),
            requests = self.total_requests(),
            budget_exhausted = self.budget_exhausted,
            duration_ms = self.duration.as_millis() as u64,
            "Export completed"
        );

        if self.secondary_skipped {
            tracing::info!("No documents accepted, additional collections skipped");
        }

        for collection in &self.collections {
            tracing::debug!(
                collection = %collection.collection,
                kind = %collection.kind,
                destination = %collection.destination,
                requests = collection.requests,
                fetched = collection.fetched,
                written = collection.written,
                deleted = collection.deleted,
                "Collection summary"
            );
        }
    }
}

impl Default for ExportSummary {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collection(name: &str, kind: PassKind, requests: usize, written: u64) -> CollectionSummary {
        CollectionSummary {
            requests,
            written,
            ..CollectionSummary::new(CollectionName::new(name).unwrap(), kind, format!("{name}.jsonl"))
        }
    }

    #[test]
    fn test_export_summary_creation() {
        let summary = ExportSummary::new();

        assert_eq!(summary.accepted, 0);
        assert!(!summary.budget_exhausted);
        assert!(summary.collections.is_empty());
        assert_eq!(summary.duration, Duration::ZERO);
        assert_eq!(summary.total_written(), 0);
        assert!(summary.started_at <= Utc::now());
    }

    #[test]
    fn test_export_summary_with_duration() {
        let summary = ExportSummary::new().with_duration(Duration::from_secs(120));
        assert_eq!(summary.duration, Duration::from_secs(120));
    }

    #[test]
    fn test_totals() {
        let mut summary = ExportSummary::new();
        summary.add_collection(collection("products", PassKind::Primary, 3, 5));
        summary.add_collection(collection("reviews", PassKind::Secondary, 1, 2));

        assert_eq!(summary.total_requests(), 4);
        assert_eq!(summary.total_written(), 7);
        assert_eq!(summary.collections[1].kind, PassKind::Secondary);
        assert_eq!(summary.collections[1].destination, "reviews.jsonl");
    }

    #[test]
    fn test_pass_kind_display() {
        assert_eq!(PassKind::Primary.to_string(), "primary");
        assert_eq!(PassKind::Secondary.to_string(), "secondary");
    }
}
