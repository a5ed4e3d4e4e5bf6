//! Document store API models
//!
//! Wire shapes of search and scroll responses, and the request bodies sent for
//! scroll continuation and release.

use crate::domain::Hit;
use serde::{Deserialize, Serialize};

/// Response of `_search` and `_search/scroll`
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    /// Scroll token for the next page (rotates between pages)
    #[serde(rename = "_scroll_id", default)]
    pub scroll_id: Option<String>,

    /// Hit envelope
    pub hits: HitsEnvelope,
}

/// The `hits` object of a search response
#[derive(Debug, Clone, Deserialize)]
pub struct HitsEnvelope {
    /// Documents of this page
    pub hits: Vec<Hit>,
}

/// One page of results, ordered by ascending document id
#[derive(Debug, Clone)]
pub struct Page {
    /// Scroll token returned with the page, if any
    pub scroll_id: Option<String>,

    /// Hits sorted by `_id`
    pub hits: Vec<Hit>,
}

impl From<SearchResponse> for Page {
    fn from(response: SearchResponse) -> Self {
        let mut hits = response.hits.hits;
        hits.sort_by(|a, b| a.id.cmp(&b.id));
        Self {
            scroll_id: response.scroll_id,
            hits,
        }
    }
}

/// Body of a scroll continuation request
#[derive(Debug, Serialize)]
pub struct ScrollRequest<'a> {
    pub scroll: &'a str,
    pub scroll_id: &'a str,
}

/// Body of a scroll release request
#[derive(Debug, Serialize)]
pub struct ClearScrollRequest<'a> {
    pub scroll_id: &'a [String],
}
