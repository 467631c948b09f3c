//! Pairwise visual verification of candidate results.
//!
//! Asks a vision-capable model whether a candidate thumbnail depicts the
//! same physical object as the reference photograph, against a fixed
//! scoring rubric. Failures are data: any transport or parse problem yields
//! the zero-confidence sentinel with the reason in `explanation`, never an
//! error.
//!
//! Batch mode is the one place in this crate with explicit concurrency
//! control: comparisons run in fixed windows so no more than the window
//! size is ever in flight against the upstream model at once, and one
//! window fully completes before the next starts.

use std::collections::HashMap;

use futures::future::join_all;
use serde::Deserialize;

use crate::traits::ChatModel;
use crate::types::VisualMatchResult;

/// Hard ceiling on candidates per batch.
pub const MAX_CANDIDATES: usize = 20;

/// Default comparisons in flight per window.
pub const DEFAULT_CONCURRENCY: usize = 5;

/// Hard ceiling on comparisons in flight per window.
pub const MAX_CONCURRENCY: usize = 10;

const RUBRIC_SYSTEM_PROMPT: &str = r#"You compare two images of collectible artworks.

Image 1 is the reference photograph. Image 2 is a candidate from a search result. Score how likely they depict the same physical artwork:

- 90-100: identical artwork (same design, same edition)
- 70-89: very likely the same artwork
- 50-69: uncertain, needs human review
- 30-49: same creator or style, but a different work
- 0-29: unrelated

Return ONLY a JSON object:
{"visual_match": 0-100, "same_image": bool, "same_artist": bool, "explanation": "max 50 words"}"#;

/// Judges (reference, candidate) image pairs with bounded concurrency.
pub struct VisualVerifier<M> {
    model: M,
}

impl<M: ChatModel> VisualVerifier<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }

    /// Compare one candidate against the reference.
    pub async fn compare(&self, reference_url: &str, candidate_url: &str) -> VisualMatchResult {
        if reference_url == candidate_url {
            // The same URL is the same image; skip the model call.
            return VisualMatchResult::new(100, true, true, "identical image URL".to_string());
        }

        if !self.model.is_configured() {
            return VisualMatchResult::failure("visual verifier model is not configured");
        }

        let user = "Compare the reference (first image) with the candidate (second image).";
        let images = [reference_url.to_string(), candidate_url.to_string()];

        let response = match self
            .model
            .complete_with_images(RUBRIC_SYSTEM_PROMPT, user, &images)
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(candidate_url, error = %e, "Visual comparison call failed");
                return VisualMatchResult::failure(format!("comparison failed: {}", e));
            }
        };

        Self::parse_verdict(&response)
    }

    /// Compare up to [`MAX_CANDIDATES`] candidates in fixed windows.
    ///
    /// Returns one entry per distinct input URL. `concurrency` is clamped
    /// to `1..=MAX_CONCURRENCY`; one window fully completes before the
    /// next starts.
    pub async fn batch_compare(
        &self,
        reference_url: &str,
        candidate_urls: &[String],
        concurrency: usize,
    ) -> HashMap<String, VisualMatchResult> {
        let mut seen = std::collections::HashSet::new();
        let candidates: Vec<&String> = candidate_urls
            .iter()
            .filter(|u| seen.insert(u.as_str()))
            .take(MAX_CANDIDATES)
            .collect();

        let window = concurrency.clamp(1, MAX_CONCURRENCY);
        tracing::debug!(
            candidates = candidates.len(),
            window,
            "Batch visual comparison"
        );

        let mut verdicts = HashMap::with_capacity(candidates.len());
        for chunk in candidates.chunks(window) {
            let window_results = join_all(
                chunk
                    .iter()
                    .map(|candidate| self.compare(reference_url, candidate)),
            )
            .await;

            for (candidate, verdict) in chunk.iter().zip(window_results) {
                verdicts.insert((*candidate).clone(), verdict);
            }
        }

        verdicts
    }

    fn parse_verdict(response: &str) -> VisualMatchResult {
        let Some(span) = object_span(response) else {
            return VisualMatchResult::failure("no JSON object in model output");
        };

        let raw: RawVerdict = match serde_json::from_str(span) {
            Ok(raw) => raw,
            Err(e) => {
                return VisualMatchResult::failure(format!("unparseable verdict: {}", e));
            }
        };

        VisualMatchResult::new(
            raw.visual_match.unwrap_or(0.0).round() as i64,
            raw.same_image.unwrap_or(false),
            raw.same_artist.unwrap_or(false),
            truncate_words(&raw.explanation.unwrap_or_default(), 50),
        )
    }
}

fn object_span(s: &str) -> Option<&str> {
    let start = s.find('{')?;
    let end = s.rfind('}')?;
    (end > start).then(|| &s[start..=end])
}

fn truncate_words(s: &str, max_words: usize) -> String {
    let words: Vec<&str> = s.split_whitespace().collect();
    if words.len() <= max_words {
        s.trim().to_string()
    } else {
        words[..max_words].join(" ")
    }
}

#[derive(Debug, Deserialize)]
struct RawVerdict {
    #[serde(default)]
    visual_match: Option<f64>,
    #[serde(default)]
    same_image: Option<bool>,
    #[serde(default)]
    same_artist: Option<bool>,
    #[serde(default)]
    explanation: Option<String>,
}
