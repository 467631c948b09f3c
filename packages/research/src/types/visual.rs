//! Visual comparison verdicts.

use serde::{Deserialize, Serialize};

/// Verdict for one (reference, candidate) image pair. Ephemeral.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisualMatchResult {
    /// Similarity score, always within [0, 100].
    pub visual_match: u8,
    /// True when the candidate depicts the same physical artwork.
    pub same_image: bool,
    /// True when the candidate is by the same creator.
    pub same_artist: bool,
    /// Short model rationale, or the failure reason for sentinel results.
    pub explanation: String,
}

impl VisualMatchResult {
    /// Build a verdict, clamping the score into [0, 100].
    pub fn new(score: i64, same_image: bool, same_artist: bool, explanation: String) -> Self {
        Self {
            visual_match: score.clamp(0, 100) as u8,
            same_image,
            same_artist,
            explanation,
        }
    }

    /// Zero-confidence sentinel for a failed comparison.
    ///
    /// Failures are data, never exceptions: the reason travels in
    /// `explanation`.
    pub fn failure(reason: impl Into<String>) -> Self {
        Self {
            visual_match: 0,
            same_image: false,
            same_artist: false,
            explanation: reason.into(),
        }
    }

    /// Same artwork: explicit same-image flag or score at least 85.
    pub fn is_confirmed(&self) -> bool {
        self.same_image || self.visual_match >= 85
    }

    /// Strong enough to surface without human review.
    pub fn is_likely(&self) -> bool {
        self.visual_match >= 60
    }

    /// Presentation tier, shared by UI labels and server-side filtering.
    pub fn tier(&self) -> MatchTier {
        if self.is_confirmed() {
            MatchTier::Confirmed
        } else if self.is_likely() {
            MatchTier::Likely
        } else if self.same_artist && self.visual_match >= 30 {
            MatchTier::SameArtistDifferentWork
        } else if self.visual_match >= 30 {
            MatchTier::PossiblyRelated
        } else {
            MatchTier::Unrelated
        }
    }
}

/// Presentation label derived from a [`VisualMatchResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchTier {
    Confirmed,
    Likely,
    SameArtistDifferentWork,
    PossiblyRelated,
    Unrelated,
}

impl MatchTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Confirmed => "confirmed",
            Self::Likely => "likely",
            Self::SameArtistDifferentWork => "same-artist-different-work",
            Self::PossiblyRelated => "possibly-related",
            Self::Unrelated => "unrelated",
        }
    }
}

impl std::fmt::Display for MatchTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
