//! Request payload construction
//!
//! Builds the JSON bodies for the primary scroll traversal and for the
//! id-batch lookups of the secondary pass.

use crate::config::QueryConfig;
use crate::domain::DocumentId;
use serde_json::{json, Map, Value};

/// Builds search request bodies from the query configuration
#[derive(Debug, Clone, Copy)]
pub struct QueryBuilder<'a> {
    config: &'a QueryConfig,
}

impl<'a> QueryBuilder<'a> {
    /// Create a builder over `config`
    pub fn new(config: &'a QueryConfig) -> Self {
        Self { config }
    }

    /// Body of the initial scroll request
    ///
    /// Sorted by `_doc` for cheap, stable paging. Random sampling wraps the
    /// filter in a `random_score` function instead, and drops the sort: a
    /// sampled traversal is not meant to be reproducible.
    pub fn primary(&self) -> Value {
        if self.config.random {
            return self.payload(json!({
                "function_score": {
                    "query": self.config.query,
                    "random_score": {}
                }
            }));
        }

        let mut body = self.payload(self.config.query.clone());
        if let Value::Object(map) = &mut body {
            map.insert("sort".to_string(), json!(["_doc"]));
        }
        body
    }

    /// Body of one id-batch lookup, scoped to `doc_type` when known
    pub fn by_ids(&self, doc_type: Option<&str>, ids: &[DocumentId]) -> Value {
        let mut clause = Map::new();
        if let Some(doc_type) = doc_type {
            clause.insert("type".to_string(), json!(doc_type));
        }
        clause.insert("values".to_string(), json!(ids));
        self.payload(json!({ "ids": clause }))
    }

    fn payload(&self, clause: Value) -> Value {
        let config = self.config;
        let mut body = Map::new();

        let source = match &config.source_fields {
            Some(fields) => json!(fields),
            None => json!(config.docvalue_fields.is_none() && config.stored_fields.is_none()),
        };
        body.insert("_source".to_string(), source);

        if let Some(fields) = &config.docvalue_fields {
            body.insert("docvalue_fields".to_string(), json!(fields));
        }
        if let Some(fields) = &config.stored_fields {
            body.insert("stored_fields".to_string(), json!(fields));
        }

        body.insert("query".to_string(), clause);
        body.insert("size".to_string(), json!(config.size));
        Value::Object(body)
    }
}
