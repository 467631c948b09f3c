//! Request configuration for the multi-stage orchestrator.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::query::QueryVariation;

/// Parameters for one pipeline run.
///
/// Everything the run needs travels in the request; the pipeline holds no
/// mutable state between runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchRequest {
    /// Reference image for the visual stage. No image, no visual stage.
    pub image_url: Option<String>,
    /// Caller-supplied single query for the text stage.
    pub query: Option<String>,
    /// Caller-supplied ranked variations; take precedence over `query`.
    #[serde(default)]
    pub query_variations: Vec<QueryVariation>,
    /// Cap on visual-stage results.
    pub max_lens_results: usize,
    /// Per-query cap for the text stage (provider max is 10).
    pub max_web_results: usize,
    /// How many text queries the text stage may spend.
    pub max_web_queries: usize,
    /// Whether the text stage runs at all. Default true.
    pub include_web_search: bool,
    /// Restrict text search to these sellers' domains, if set.
    #[serde(default)]
    pub dealer_ids: Option<Vec<Uuid>>,
}

impl Default for ResearchRequest {
    fn default() -> Self {
        Self {
            image_url: None,
            query: None,
            query_variations: Vec::new(),
            max_lens_results: 20,
            max_web_results: 10,
            max_web_queries: 3,
            include_web_search: true,
            dealer_ids: None,
        }
    }
}

impl ResearchRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Research seeded by a reference image.
    pub fn for_image(image_url: impl Into<String>) -> Self {
        Self {
            image_url: Some(image_url.into()),
            ..Default::default()
        }
    }

    /// Text-only research seeded by a single query.
    pub fn for_query(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            ..Default::default()
        }
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn with_variations(mut self, variations: Vec<QueryVariation>) -> Self {
        self.query_variations = variations;
        self
    }

    pub fn with_web_search(mut self, include: bool) -> Self {
        self.include_web_search = include;
        self
    }

    pub fn with_max_web_queries(mut self, max: usize) -> Self {
        self.max_web_queries = max;
        self
    }

    pub fn with_dealer_ids(mut self, ids: Vec<Uuid>) -> Self {
        self.dealer_ids = Some(ids);
        self
    }
}
