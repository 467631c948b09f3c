use serde::Deserialize;

/// Top-level response from the Google Lens engine.
///
/// SerpAPI returns many more sections than this; only the ones the research
/// pipeline consumes are modeled. Every field is defaulted because the
/// engine omits whole sections when it has nothing to say.
#[derive(Debug, Clone, Deserialize)]
pub struct LensResponse {
    #[serde(default)]
    pub visual_matches: Vec<VisualMatch>,

    /// Present only when the engine confidently identifies the subject.
    #[serde(default)]
    pub knowledge_graph: Vec<KnowledgeGraphItem>,

    #[serde(default)]
    pub search_metadata: Option<SearchMetadata>,
}

/// One visually similar item.
#[derive(Debug, Clone, Deserialize)]
pub struct VisualMatch {
    #[serde(default)]
    pub position: Option<u32>,
    #[serde(default)]
    pub title: Option<String>,
    pub link: String,
    /// Display name of the hosting site (e.g. "eBay").
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
}

/// A knowledge-graph subject identification.
#[derive(Debug, Clone, Deserialize)]
pub struct KnowledgeGraphItem {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

/// Timing metadata attached to every SerpAPI response.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchMetadata {
    #[serde(default)]
    pub total_time_taken: Option<f64>,
}

/// Error envelope SerpAPI uses for 2xx-with-error responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
