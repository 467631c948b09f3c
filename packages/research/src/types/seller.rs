//! Seller directory entry.
//!
//! Owned by the external directory; read-only to the core. The pipeline only
//! ever reads a fresh snapshot per request, so nothing here is cached.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A curated seller with trust metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Seller {
    pub id: Uuid,
    pub name: String,
    /// Normalized domain (no scheme, no leading "www.").
    pub domain: String,
    /// 1 (most trusted) through 6 (least trusted).
    pub reliability_tier: u8,
    /// Weight of this seller's word on attribution questions.
    pub attribution_weight: f32,
    /// Weight of this seller's asking prices in valuation context.
    pub pricing_weight: f32,
    /// Whether this seller may be used as a research source.
    pub can_research: bool,
    pub is_active: bool,
}

impl Seller {
    /// Create an active, researchable seller with mid-range defaults.
    pub fn new(name: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            domain: domain.into(),
            reliability_tier: 3,
            attribution_weight: 0.5,
            pricing_weight: 0.5,
            can_research: true,
            is_active: true,
        }
    }

    /// Set the reliability tier (clamped to 1..=6).
    pub fn with_tier(mut self, tier: u8) -> Self {
        self.reliability_tier = tier.clamp(1, 6);
        self
    }

    /// Set the attribution and pricing weights.
    pub fn with_weights(mut self, attribution: f32, pricing: f32) -> Self {
        self.attribution_weight = attribution;
        self.pricing_weight = pricing;
        self
    }

    /// Set whether this seller may be used for research.
    pub fn with_can_research(mut self, can_research: bool) -> Self {
        self.can_research = can_research;
        self
    }

    /// Mark the seller inactive.
    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }
}
