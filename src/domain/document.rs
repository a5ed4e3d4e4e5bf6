//! Document model
//!
//! A [`Hit`] is one record returned by the document store: identifier, optional
//! type tag, the nested source payload and any requested stored or docvalue
//! fields. Hits are only read and re-serialized, never modified in place.

use super::ids::DocumentId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key under which stored/docvalue fields are attached in exported lines
pub const FIELDS_KEY: &str = "_";

/// A single document returned by a search or scroll request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    /// Document identifier
    #[serde(rename = "_id")]
    pub id: DocumentId,

    /// Mapping type tag (absent on newer stores)
    #[serde(rename = "_type", default, skip_serializing_if = "Option::is_none")]
    pub doc_type: Option<String>,

    /// Nested source payload
    #[serde(rename = "_source", default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Value>,

    /// Stored or docvalue fields, when requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Value>,
}

impl Hit {
    /// Creates a hit with a source payload and no type or fields
    pub fn new(id: impl Into<String>, source: Value) -> Self {
        Self {
            id: DocumentId::new(id),
            doc_type: None,
            source: Some(source),
            fields: None,
        }
    }

    /// Sets the type tag
    pub fn with_type(mut self, doc_type: impl Into<String>) -> Self {
        self.doc_type = Some(doc_type.into());
        self
    }

    /// Sets the stored fields
    pub fn with_fields(mut self, fields: Value) -> Self {
        self.fields = Some(fields);
        self
    }

    /// Builds the value that gets exported for this hit
    ///
    /// The source payload is exported as-is; stored fields are attached under
    /// [`FIELDS_KEY`]. Returns `None` when the hit carries neither.
    pub fn export_value(&self) -> Option<Value> {
        let Some(fields) = &self.fields else {
            return self.source.clone();
        };

        match &self.source {
            Some(Value::Object(map)) => {
                let mut map = map.clone();
                map.insert(FIELDS_KEY.to_string(), fields.clone());
                Some(Value::Object(map))
            }
            None => {
                let mut map = Map::new();
                map.insert(FIELDS_KEY.to_string(), fields.clone());
                Some(Value::Object(map))
            }
            Some(other) => Some(other.clone()),
        }
    }

    /// Renders the exported line (without trailing newline)
    pub fn render(&self, pretty: bool) -> serde_json::Result<Option<String>> {
        let Some(value) = self.export_value() else {
            return Ok(None);
        };

        let line = if pretty {
            serde_json::to_string_pretty(&value)?
        } else {
            serde_json::to_string(&value)?
        };
        Ok(Some(line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_hit() {
        let hit: Hit = serde_json::from_value(json!({
            "_index": "products",
            "_type": "doc",
            "_id": "17",
            "_score": null,
            "_source": {"name": "lamp"}
        }))
        .unwrap();

        assert_eq!(hit.id.as_str(), "17");
        assert_eq!(hit.doc_type.as_deref(), Some("doc"));
        assert_eq!(hit.source, Some(json!({"name": "lamp"})));
        assert!(hit.fields.is_none());
    }

    #[test]
    fn test_export_source_only() {
        let hit = Hit::new("1", json!({"a": 1}));
        assert_eq!(hit.export_value(), Some(json!({"a": 1})));
    }

    #[test]
    fn test_export_merges_fields() {
        let hit = Hit::new("1", json!({"a": 1})).with_fields(json!({"b": [2]}));
        assert_eq!(hit.export_value(), Some(json!({"a": 1, "_": {"b": [2]}})));
    }

    #[test]
    fn test_export_fields_without_source() {
        let mut hit = Hit::new("1", json!(null)).with_fields(json!({"b": [2]}));
        hit.source = None;
        assert_eq!(hit.export_value(), Some(json!({"_": {"b": [2]}})));
    }

    #[test]
    fn test_export_nothing() {
        let mut hit = Hit::new("1", json!({}));
        hit.source = None;
        assert_eq!(hit.export_value(), None);
        assert_eq!(hit.render(false).unwrap(), None);
    }

    #[test]
    fn test_render_compact_and_pretty() {
        let hit = Hit::new("1", json!({"a": {"b": 1}}));
        assert_eq!(hit.render(false).unwrap().unwrap(), r#"{"a":{"b":1}}"#);

        let pretty = hit.render(true).unwrap().unwrap();
        assert!(pretty.contains('\n'));
        assert_eq!(serde_json::from_str::<Value>(&pretty).unwrap(), json!({"a": {"b": 1}}));
    }
}
