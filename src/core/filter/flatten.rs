//! Leaf path flattening
//!
//! Turns a nested document into the set of dot-separated paths of its terminal
//! values:
//! - object keys become path segments
//! - list elements share their parent's path (indices add no segment)
//! - empty objects and lists contribute nothing
//!
//! `{"a": {"b": 1, "c": [2, {"d": 3}]}}` flattens to `a.b`, `a.c`, `a.c.d`.

use serde_json::Value;
use std::collections::BTreeSet;

/// Sorted, de-duplicated leaf paths of a document
pub type PathSet = BTreeSet<String>;

/// Flatten `document` into its leaf paths
pub fn flatten(document: &Value) -> PathSet {
    let mut paths = PathSet::new();
    let mut prefix = Vec::new();
    collect(document, &mut prefix, &mut paths);
    paths
}

fn collect<'a>(value: &'a Value, prefix: &mut Vec<&'a str>, paths: &mut PathSet) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                prefix.push(key);
                collect(child, prefix, paths);
                prefix.pop();
            }
        }
        Value::Array(items) => {
            for item in items {
                collect(item, prefix, paths);
            }
        }
        _ => {
            // A bare scalar document has no path
            if !prefix.is_empty() {
                paths.insert(prefix.join("."));
            }
        }
    }
}
