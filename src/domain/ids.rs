//! Domain identifier types with validation
//!
//! Newtype wrappers for collection names and document identifiers so the two
//! can't be mixed up when building request paths and id lookups.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Name of a collection (index) in the remote document store
///
/// # Examples
///
/// ```
/// use es_sample::domain::ids::CollectionName;
/// use std::str::FromStr;
///
/// let name = CollectionName::from_str("logs-2024").unwrap();
/// assert_eq!(name.as_str(), "logs-2024");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollectionName(String);

impl CollectionName {
    /// Creates a new CollectionName from a string
    ///
    /// Names are used as URL path segments, so they may not be empty, contain
    /// whitespace, or contain `/`.
    pub fn new(name: impl Into<String>) -> Result<Self, String> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err("Collection name cannot be empty".to_string());
        }
        if name.contains('/') || name.chars().any(char::is_whitespace) {
            return Err(format!(
                "Invalid collection name '{name}': must not contain '/' or whitespace"
            ));
        }
        Ok(Self(name))
    }

    /// Returns the collection name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CollectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CollectionName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for CollectionName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Identifier of a single document (`_id`)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DocumentId(String);

impl DocumentId {
    /// Creates a new DocumentId
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}
