//! Search provider traits.
//!
//! Provider clients normalize a third party's payload into a common response
//! shape and never return `Err` from `search`: any failure travels as data in
//! the `error` field so a partial result set always comes back, and credits
//! accounting survives the failure. Quota exhaustion is distinguishable from
//! a generic failure by the word "quota" in the error text.

use std::collections::HashSet;

use async_trait::async_trait;

use crate::types::{KnowledgeGraph, SearchResult};

/// Options for a text search call.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Domain allow-list; OR'd `site:` filters when non-empty.
    pub domains: Vec<String>,
    /// Result cap, clamped to the provider's per-call maximum.
    pub max_results: usize,
    /// 1-based pagination offset, if the provider supports it.
    pub start_index: Option<u32>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            domains: Vec::new(),
            max_results: 10,
            start_index: None,
        }
    }
}

impl SearchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_domains(mut self, domains: Vec<String>) -> Self {
        self.domains = domains;
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }
}

/// Common response shape for a single text search call.
#[derive(Debug, Clone, Default)]
pub struct TextSearchResponse {
    pub results: Vec<SearchResult>,
    pub total_results: u64,
    /// Provider-reported search time in seconds.
    pub search_time: f64,
    /// Quota units spent. Zero when the call was refused (quota), one when
    /// it was spent on a generic failure.
    pub credits_used: u32,
    pub error: Option<String>,
}

impl TextSearchResponse {
    /// An empty failure response.
    pub fn failure(message: impl Into<String>, credits_used: u32) -> Self {
        Self {
            credits_used,
            error: Some(message.into()),
            ..Default::default()
        }
    }

    /// Whether the error, if any, is quota exhaustion.
    pub fn is_quota_error(&self) -> bool {
        self.error
            .as_deref()
            .is_some_and(|e| e.to_lowercase().contains("quota"))
    }
}

/// Merged response for a multi-query text search.
#[derive(Debug, Clone, Default)]
pub struct MultiSearchResponse {
    /// URL-deduplicated union across all queries, first occurrence wins.
    pub results: Vec<SearchResult>,
    pub credits_used: u32,
    /// Per-query error strings; individual failures never abort the batch.
    pub errors: Vec<String>,
}

/// Keyword text search capability.
#[async_trait]
pub trait TextSearch: Send + Sync {
    /// Whether credentials are present. Checked before spending quota.
    fn is_configured(&self) -> bool;

    /// Run one query. Never fails; see the module docs.
    async fn search(&self, query: &str, options: &SearchOptions) -> TextSearchResponse;

    /// Run several queries, deduplicating by URL across all of them.
    ///
    /// Queries run sequentially; a failing query contributes its error
    /// string and the batch continues.
    async fn search_many(&self, queries: &[String], options: &SearchOptions) -> MultiSearchResponse {
        let mut merged = MultiSearchResponse::default();
        let mut seen: HashSet<String> = HashSet::new();

        for query in queries {
            let response = self.search(query, options).await;
            merged.credits_used += response.credits_used;
            if let Some(error) = response.error {
                tracing::warn!(query, error, "Text search query failed, continuing");
                merged.errors.push(format!("{}: {}", query, error));
                continue;
            }
            for result in response.results {
                if seen.insert(crate::matching::url_key(&result.url)) {
                    merged.results.push(result);
                }
            }
        }

        merged
    }
}

/// Response shape for one reverse-image search call.
#[derive(Debug, Clone, Default)]
pub struct VisualSearchResponse {
    pub results: Vec<SearchResult>,
    /// Present only when the provider confidently identified the subject.
    pub knowledge_graph: Option<KnowledgeGraph>,
    pub credits_used: u32,
    pub error: Option<String>,
}

impl VisualSearchResponse {
    /// An empty failure response.
    pub fn failure(message: impl Into<String>, credits_used: u32) -> Self {
        Self {
            credits_used,
            error: Some(message.into()),
            ..Default::default()
        }
    }
}

/// Reverse-image (visual) search capability.
#[async_trait]
pub trait VisualSearch: Send + Sync {
    /// Whether credentials are present. Checked before spending quota.
    fn is_configured(&self) -> bool;

    /// Search by reference image URL. Never fails; failures travel in
    /// `error`.
    async fn search(&self, image_url: &str) -> VisualSearchResponse;
}
