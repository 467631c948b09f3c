//! Extractor input and output types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What we already know about the item under research.
///
/// Every field is optional; the extractor prompt only mentions what is set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemContext {
    pub title: Option<String>,
    pub creator: Option<String>,
    pub date: Option<String>,
    pub dimensions: Option<String>,
    pub technique: Option<String>,
}

impl ItemContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_creator(mut self, creator: impl Into<String>) -> Self {
        self.creator = Some(creator.into());
        self
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    pub fn with_dimensions(mut self, dimensions: impl Into<String>) -> Self {
        self.dimensions = Some(dimensions.into());
        self
    }

    pub fn with_technique(mut self, technique: impl Into<String>) -> Self {
        self.technique = Some(technique.into());
        self
    }

    /// True when no field is set at all.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.creator.is_none()
            && self.date.is_none()
            && self.dimensions.is_none()
            && self.technique.is_none()
    }
}

/// A dealer-attributed search snippet handed to the extractor.
///
/// Snippets without a resolved dealer id are excluded from the prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealerSnippet {
    pub dealer_id: Option<Uuid>,
    pub dealer_name: Option<String>,
    pub url: String,
    pub title: String,
    pub snippet: String,
}

/// One structured fact extracted from a dealer snippet.
///
/// At most one finding per input snippet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    pub dealer_id: Uuid,
    pub dealer_name: String,
    pub url: String,
    /// Asking or realized price, if the snippet states one.
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    /// Attribution claim (artist, printer, edition) found in the snippet.
    #[serde(default)]
    pub attribution: Option<String>,
    #[serde(default)]
    pub condition: Option<String>,
    /// Model confidence, 0-100.
    pub confidence: u8,
    #[serde(default)]
    pub notes: Option<String>,
}
