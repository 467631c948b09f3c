//! Dealer discovery request/response types.

use serde::{Deserialize, Serialize};

/// A proposed new directory entry awaiting curator review.
///
/// Suggestions must not duplicate an existing seller domain; the discovery
/// flow recomputes the known-domain set from a fresh snapshot on every call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoverySuggestion {
    pub name: String,
    pub url: String,
    pub region: String,
    /// Seller-type taxonomy key (e.g. "auction_house", "gallery").
    pub seller_type: String,
    /// Why the model believes this is a real seller (quoted evidence).
    pub evidence: String,
}

/// Parameters for one discovery run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryRequest {
    /// Region taxonomy key (e.g. "ch", "fr", "us").
    pub region: String,
    /// Seller-type taxonomy key.
    pub seller_type: String,
    /// ISO language code for the localized query template.
    pub language: String,
    /// Result cap, clamped to the provider per-call maximum.
    pub max_results: usize,
}

impl DiscoveryRequest {
    pub fn new(region: impl Into<String>, seller_type: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            seller_type: seller_type.into(),
            language: "en".to_string(),
            max_results: 10,
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }
}

/// Outcome of one discovery run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryResponse {
    /// The resolved, localized query actually sent (for transparency).
    pub query: String,
    pub suggestions: Vec<DiscoverySuggestion>,
    pub total_search_results: u64,
    pub credits_used: u32,
    #[serde(default)]
    pub error: Option<String>,
}
