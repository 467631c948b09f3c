//! Search query variations derived from item metadata.

use serde::{Deserialize, Serialize};

/// One derived search query. Deterministic, no identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryVariation {
    /// The query string to send to the text search provider.
    pub query: String,
    /// Human-readable label for curator-facing transparency.
    pub label: String,
    /// Lower = broader. Variations are emitted in ascending specificity.
    pub priority: u8,
}

impl QueryVariation {
    pub fn new(query: impl Into<String>, label: impl Into<String>, priority: u8) -> Self {
        Self {
            query: query.into(),
            label: label.into(),
            priority,
        }
    }
}
