//! AI structured extraction over dealer-attributed snippets.
//!
//! One model request turns unstructured search snippets into structured
//! findings (attribution, pricing, condition), at most one per snippet.
//! Model output is recovered leniently: scan for the outermost JSON array,
//! parse, and on failure escape raw control characters inside string
//! literals and parse exactly once more. A second failure is the one error
//! in this crate allowed to propagate past a batch boundary, because
//! unparseable structured output cannot be safely used.

use std::collections::{HashMap, HashSet};

use serde::Deserialize;

use crate::error::{ResearchError, Result};
use crate::matching::normalize_domain;
use crate::traits::ChatModel;
use crate::types::{DealerSnippet, DiscoverySuggestion, Finding, ItemContext, SearchResult};

/// Extract the first-to-last bracket span of `s`, if any.
fn json_array_span(s: &str) -> Option<&str> {
    let start = s.find('[')?;
    let end = s.rfind(']')?;
    (end > start).then(|| &s[start..=end])
}

/// Escape raw control characters occurring strictly inside quoted string
/// literals. Structural whitespace between tokens is preserved.
fn escape_control_chars_in_strings(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_string = false;
    let mut escaped = false;

    for c in s.chars() {
        if in_string {
            if escaped {
                out.push(c);
                escaped = false;
                continue;
            }
            match c {
                '\\' => {
                    out.push(c);
                    escaped = true;
                }
                '"' => {
                    out.push(c);
                    in_string = false;
                }
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\t' => out.push_str("\\t"),
                c if (c as u32) < 0x20 => {
                    out.push_str(&format!("\\u{:04x}", c as u32));
                }
                c => out.push(c),
            }
        } else {
            if c == '"' {
                in_string = true;
            }
            out.push(c);
        }
    }
    out
}

/// Parse a JSON array out of raw model output, with one sanitizing retry.
fn parse_json_array<T: for<'de> Deserialize<'de>>(raw: &str) -> Result<Vec<T>> {
    let span = json_array_span(raw).ok_or_else(|| ResearchError::Parse {
        reason: "no JSON array in model output".to_string(),
    })?;

    match serde_json::from_str(span) {
        Ok(parsed) => Ok(parsed),
        Err(first) => {
            let sanitized = escape_control_chars_in_strings(span);
            serde_json::from_str(&sanitized).map_err(|second| {
                tracing::warn!(%first, %second, "Model output unparseable after sanitization");
                ResearchError::Parse {
                    reason: format!("{} (after sanitization: {})", first, second),
                }
            })
        }
    }
}

/// Turns dealer-attributed snippets plus item context into structured
/// findings via one generative-model request.
pub struct MarketExtractor<M> {
    model: M,
}

impl<M: ChatModel> MarketExtractor<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }

    /// Extract structured findings, at most one per input snippet.
    ///
    /// Snippets without a resolved dealer id are excluded from the prompt
    /// entirely. With nothing left to ask about, no model call is made.
    pub async fn extract(
        &self,
        context: &ItemContext,
        snippets: &[DealerSnippet],
    ) -> Result<Vec<Finding>> {
        let attributed: Vec<&DealerSnippet> =
            snippets.iter().filter(|s| s.dealer_id.is_some()).collect();
        if attributed.is_empty() {
            return Ok(Vec::new());
        }

        let system = FINDINGS_SYSTEM_PROMPT;
        let user = Self::findings_prompt(context, &attributed);

        let response = self.model.complete(system, &user).await?;
        let raw: Vec<RawFinding> = parse_json_array(&response)?;

        // Re-attribute findings from the input snippets: the model's echo of
        // dealer id and name is never trusted.
        let by_url: HashMap<String, &DealerSnippet> = attributed
            .iter()
            .map(|s| (s.url.clone(), *s))
            .collect();

        let mut seen_urls: HashSet<String> = HashSet::new();
        let findings = raw
            .into_iter()
            .filter_map(|f| {
                let snippet = by_url.get(f.url.as_str())?;
                // At most one finding per input snippet.
                if !seen_urls.insert(f.url.clone()) {
                    return None;
                }
                Some(Finding {
                    dealer_id: snippet.dealer_id?,
                    dealer_name: snippet.dealer_name.clone().unwrap_or_default(),
                    url: f.url,
                    price: f.price,
                    currency: f.currency,
                    attribution: f.attribution,
                    condition: f.condition,
                    confidence: f.confidence.clamp(0, 100) as u8,
                    notes: f.notes,
                })
            })
            .collect();

        Ok(findings)
    }

    /// Suggestion mode: propose new directory candidates from raw search
    /// results, skipping domains that are already known.
    pub async fn suggest_sellers(
        &self,
        region: &str,
        seller_type: &str,
        known_domains: &HashSet<String>,
        results: &[SearchResult],
    ) -> Result<Vec<DiscoverySuggestion>> {
        if results.is_empty() {
            return Ok(Vec::new());
        }

        let system = SUGGESTIONS_SYSTEM_PROMPT;
        let user = Self::suggestions_prompt(region, seller_type, known_domains, results);

        let response = self.model.complete(system, &user).await?;
        let raw: Vec<RawSuggestion> = parse_json_array(&response)?;

        // Post-filter: never surface a domain the directory already has,
        // and never the same domain twice.
        let mut seen_domains: HashSet<String> = HashSet::new();
        let suggestions = raw
            .into_iter()
            .filter_map(|s| {
                let domain = normalize_domain(&s.url);
                if domain.is_empty()
                    || known_domains.contains(&domain)
                    || !seen_domains.insert(domain)
                {
                    return None;
                }
                Some(DiscoverySuggestion {
                    name: s.name,
                    url: s.url,
                    region: region.to_string(),
                    seller_type: seller_type.to_string(),
                    evidence: s.evidence,
                })
            })
            .collect();

        Ok(suggestions)
    }

    fn findings_prompt(context: &ItemContext, snippets: &[&DealerSnippet]) -> String {
        let mut prompt = String::from("Item under research:\n");
        if let Some(title) = &context.title {
            prompt.push_str(&format!("- Title: {}\n", title));
        }
        if let Some(creator) = &context.creator {
            prompt.push_str(&format!("- Creator: {}\n", creator));
        }
        if let Some(date) = &context.date {
            prompt.push_str(&format!("- Date: {}\n", date));
        }
        if let Some(dimensions) = &context.dimensions {
            prompt.push_str(&format!("- Dimensions: {}\n", dimensions));
        }
        if let Some(technique) = &context.technique {
            prompt.push_str(&format!("- Technique: {}\n", technique));
        }

        prompt.push_str("\nDealer listings:\n");
        for (i, s) in snippets.iter().enumerate() {
            prompt.push_str(&format!(
                "[{}] dealer: {}\nurl: {}\ntitle: {}\nsnippet: {}\n\n",
                i + 1,
                s.dealer_name.as_deref().unwrap_or("(unnamed)"),
                s.url,
                s.title,
                s.snippet,
            ));
        }
        prompt
    }

    fn suggestions_prompt(
        region: &str,
        seller_type: &str,
        known_domains: &HashSet<String>,
        results: &[SearchResult],
    ) -> String {
        let mut known: Vec<&str> = known_domains.iter().map(String::as_str).collect();
        known.sort_unstable();

        let mut prompt = format!(
            "Region: {}\nSeller type: {}\n\nAlready-known domains (skip these exactly):\n",
            region, seller_type
        );
        for domain in known {
            prompt.push_str(&format!("- {}\n", domain));
        }

        prompt.push_str("\nSearch results:\n");
        for (i, r) in results.iter().enumerate() {
            prompt.push_str(&format!(
                "[{}] title: {}\nurl: {}\nsnippet: {}\n\n",
                i + 1,
                r.title,
                r.url,
                r.snippet.as_deref().unwrap_or(""),
            ));
        }
        prompt
    }
}

const FINDINGS_SYSTEM_PROMPT: &str = r#"You are a collectibles market researcher. Given an item and dealer listings, extract structured facts.

Return ONLY a JSON array, at most one entry per listing, in this shape:
[
  {
    "url": "listing url, copied exactly",
    "price": 1200.0,
    "currency": "USD",
    "attribution": "attribution claim stated in the listing, if any",
    "condition": "condition statement, if any",
    "confidence": 85,
    "notes": "anything else relevant"
  }
]

Only report facts stated in the listing text. Omit fields the listing does not state. Skip listings that say nothing useful."#;

const SUGGESTIONS_SYSTEM_PROMPT: &str = r#"You identify specialist sellers of collectibles from web search results.

Return ONLY a JSON array of candidate sellers:
[
  {
    "name": "business name",
    "url": "their site",
    "evidence": "quoted snippet text showing they actually sell in this category"
  }
]

Skip marketplaces, directories, museums, and any domain in the already-known list. Only propose businesses that plausibly sell themselves."#;

// Duck-typed model payloads, decoded with exhaustive field defaults.

#[derive(Debug, Deserialize)]
struct RawFinding {
    url: String,
    #[serde(default)]
    price: Option<f64>,
    #[serde(default)]
    currency: Option<String>,
    #[serde(default)]
    attribution: Option<String>,
    #[serde(default)]
    condition: Option<String>,
    #[serde(default)]
    confidence: i64,
    #[serde(default)]
    notes: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawSuggestion {
    #[serde(default)]
    name: String,
    url: String,
    #[serde(default)]
    evidence: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockModel;
    use crate::types::SearchSource;
    use uuid::Uuid;

    fn snippet(dealer_id: Option<Uuid>, url: &str) -> DealerSnippet {
        DealerSnippet {
            dealer_id,
            dealer_name: dealer_id.map(|_| "Galerie 1900".to_string()),
            url: url.to_string(),
            title: "Nord Express".to_string(),
            snippet: "Original 1927 lithograph, linen backed, $12,000".to_string(),
        }
    }

    #[test]
    fn test_json_array_span_scans_outermost_brackets() {
        assert_eq!(json_array_span("noise [1, 2] more ] junk"), Some("[1, 2] more ]"));
        assert_eq!(json_array_span("Here you go:\n[{\"a\":1}]\nDone."), Some("[{\"a\":1}]"));
        assert_eq!(json_array_span("no brackets"), None);
        assert_eq!(json_array_span("] backwards ["), None);
    }

    #[test]
    fn test_escape_only_touches_string_interiors() {
        let raw = "[\n  {\"note\": \"line one\nline two\"}\n]";
        let sanitized = escape_control_chars_in_strings(raw);
        // Structural newlines survive, the one inside the literal is escaped.
        assert_eq!(sanitized, "[\n  {\"note\": \"line one\\nline two\"}\n]");
        let parsed: Vec<serde_json::Value> = serde_json::from_str(&sanitized).unwrap();
        assert_eq!(parsed.len(), 1);
    }

    #[test]
    fn test_escape_preserves_existing_escapes() {
        let raw = r#"[{"note": "already \n escaped \" quote"}]"#;
        assert_eq!(escape_control_chars_in_strings(raw), raw);
    }

    #[test]
    fn test_parse_recovers_from_control_chars_once() {
        let raw = "Sure! [{\"url\": \"https://a.com\", \"notes\": \"two\nlines\"}]";
        let parsed: Vec<RawFinding> = parse_json_array(raw).unwrap();
        assert_eq!(parsed[0].notes.as_deref(), Some("two\nlines"));
    }

    #[test]
    fn test_parse_fails_hard_after_second_failure() {
        let raw = "[{\"url\": unquoted}]";
        let err = parse_json_array::<RawFinding>(raw).unwrap_err();
        assert!(matches!(err, ResearchError::Parse { .. }));
    }

    #[tokio::test]
    async fn test_unattributed_snippets_excluded_from_prompt() {
        let id = Uuid::new_v4();
        let model = MockModel::new().with_response(
            r#"[{"url": "https://dealer.com/1", "price": 12000.0, "currency": "USD", "confidence": 90}]"#,
        );
        let extractor = MarketExtractor::new(model);

        let snippets = vec![
            snippet(Some(id), "https://dealer.com/1"),
            snippet(None, "https://anonymous.net/2"),
        ];
        let findings = extractor
            .extract(&ItemContext::new().with_title("Nord Express"), &snippets)
            .await
            .unwrap();

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].dealer_id, id);
        assert_eq!(findings[0].price, Some(12000.0));

        let prompts = extractor.model.prompts();
        assert!(prompts[0].contains("https://dealer.com/1"));
        assert!(!prompts[0].contains("anonymous.net"));
    }

    #[tokio::test]
    async fn test_no_attributed_snippets_means_no_model_call() {
        let extractor = MarketExtractor::new(MockModel::new());
        let findings = extractor
            .extract(&ItemContext::new(), &[snippet(None, "https://x.com/1")])
            .await
            .unwrap();
        assert!(findings.is_empty());
        assert!(extractor.model.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_at_most_one_finding_per_snippet_and_confidence_clamped() {
        let id = Uuid::new_v4();
        let model = MockModel::new().with_response(
            r#"[
                {"url": "https://dealer.com/1", "confidence": 150},
                {"url": "https://dealer.com/1", "confidence": 10},
                {"url": "https://not-an-input.com/9", "confidence": 50}
            ]"#,
        );
        let extractor = MarketExtractor::new(model);

        let findings = extractor
            .extract(&ItemContext::new(), &[snippet(Some(id), "https://dealer.com/1")])
            .await
            .unwrap();

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].confidence, 100);
    }

    #[tokio::test]
    async fn test_suggestion_mode_skips_known_domains() {
        let model = MockModel::new().with_response(
            r#"[
                {"name": "Affiche Atelier", "url": "https://afficheatelier.ch", "evidence": "sells original travel posters"},
                {"name": "Known Gallery", "url": "https://www.galerie1900.com", "evidence": "poster dealer"},
                {"name": "Dup", "url": "https://afficheatelier.ch/shop", "evidence": "same domain again"}
            ]"#,
        );
        let extractor = MarketExtractor::new(model);

        let known: HashSet<String> = ["galerie1900.com".to_string()].into();
        let results = vec![SearchResult::new(
            "poster dealers switzerland",
            "https://afficheatelier.ch",
            SearchSource::Web,
        )];

        let suggestions = extractor
            .suggest_sellers("ch", "gallery", &known, &results)
            .await
            .unwrap();

        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].name, "Affiche Atelier");
        assert_eq!(suggestions[0].region, "ch");
    }
}
