//! Search result types produced by provider clients.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::matching::normalize_domain;

/// Which search capability produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchSource {
    /// Keyword text search.
    Web,
    /// Reverse-image (visual) search.
    Lens,
}

/// One normalized search result. Immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub snippet: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    /// Normalized hostname (scheme and a single leading "www." stripped).
    pub domain: String,
    pub source: SearchSource,
}

impl SearchResult {
    /// Create a new result; the domain is normalized from the URL.
    pub fn new(title: impl Into<String>, url: impl Into<String>, source: SearchSource) -> Self {
        let url = url.into();
        let domain = normalize_domain(&url);
        Self {
            title: title.into(),
            url,
            snippet: None,
            thumbnail: None,
            domain,
            source,
        }
    }

    /// Add a snippet.
    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = Some(snippet.into());
        self
    }

    /// Add a thumbnail URL.
    pub fn with_thumbnail(mut self, thumbnail: impl Into<String>) -> Self {
        self.thumbnail = Some(thumbnail.into());
        self
    }
}

/// Provider-supplied structured identification of the searched subject.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeGraph {
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

/// A search result annotated against the seller directory.
///
/// Built per call and never persisted by the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchedResult {
    #[serde(flatten)]
    pub result: SearchResult,
    #[serde(default)]
    pub dealer_id: Option<Uuid>,
    #[serde(default)]
    pub dealer_name: Option<String>,
    /// 1 (most trusted) through 6 (least trusted).
    #[serde(default)]
    pub reliability_tier: Option<u8>,
    pub is_known_dealer: bool,
}

impl MatchedResult {
    /// Wrap a result that matched no directory entry.
    pub fn unknown(result: SearchResult) -> Self {
        Self {
            result,
            dealer_id: None,
            dealer_name: None,
            reliability_tier: None,
            is_known_dealer: false,
        }
    }

    /// Sort key: known dealers first, then by ascending tier.
    pub fn trust_rank(&self) -> (bool, u8) {
        (!self.is_known_dealer, self.reliability_tier.unwrap_or(u8::MAX))
    }
}
