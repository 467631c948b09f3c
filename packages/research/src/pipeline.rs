//! Multi-stage research orchestrator.
//!
//! Sequences reverse-image search, a derived follow-up text search, a
//! URL-deduplicated merge, and directory annotation. This is the
//! composition root: all collaborators are injected, and the directory
//! snapshot taken at run start is the only one the run ever sees.
//!
//! Stages run sequentially because the text stage may depend on titles
//! extracted from the visual stage's output; the handoff is an explicit
//! [`VisualStageOutput`] value, never shared mutable state. A failing stage
//! contributes zero results plus an `errors` entry, and sibling stage output
//! is still returned.

use std::collections::HashSet;

use uuid::Uuid;

use crate::matching::{url_key, DirectoryIndex};
use crate::traits::{SearchOptions, SellerDirectory, TextSearch, VisualSearch};
use crate::types::{
    KnowledgeGraph, MatchedResult, ResearchRequest, SearchResult, Seller,
};

/// At most this many visual-stage titles become follow-up text queries.
pub const MAX_FOLLOW_UP_TITLES: usize = 5;

/// Follow-up titles must be strictly longer than this many characters.
pub const MIN_FOLLOW_UP_TITLE_CHARS: usize = 10;

/// Outcome of one pipeline run.
#[derive(Debug, Clone)]
pub struct ResearchOutcome {
    /// Merged, annotated results across all stages.
    pub results: Vec<MatchedResult>,
    /// Visual-stage subject identification, when the provider offered one.
    pub knowledge_graph: Option<KnowledgeGraph>,
    /// Titles derived from the visual stage for follow-up searching.
    pub extracted_titles: Vec<String>,
    /// Deduplicated domains absent from the directory snapshot.
    pub unknown_domains: Vec<String>,
    /// Total credits across all stages.
    pub credits_used: u32,
    /// Per-stage failure messages; empty on a clean run.
    pub errors: Vec<String>,
    /// False only when no participating provider is configured, never
    /// because a run found zero results.
    pub configured: bool,
}

/// Explicit handoff value from the visual stage to the text stage.
#[derive(Debug, Clone, Default)]
struct VisualStageOutput {
    results: Vec<SearchResult>,
    knowledge_graph: Option<KnowledgeGraph>,
    follow_up_titles: Vec<String>,
    credits_used: u32,
    error: Option<String>,
}

/// The multi-stage orchestrator.
pub struct ResearchPipeline<T, V, D> {
    text: T,
    visual: V,
    directory: D,
}

impl<T, V, D> ResearchPipeline<T, V, D>
where
    T: TextSearch,
    V: VisualSearch,
    D: SellerDirectory,
{
    pub fn new(text: T, visual: V, directory: D) -> Self {
        Self {
            text,
            visual,
            directory,
        }
    }

    /// Run the full pipeline for one request.
    pub async fn run(&self, request: &ResearchRequest) -> ResearchOutcome {
        let mut errors = Vec::new();
        let mut credits_used = 0u32;

        // One directory snapshot per run; "known" is defined against it.
        let snapshot = match self.directory.active_sellers().await {
            Ok(sellers) => sellers,
            Err(e) => {
                tracing::warn!(error = %e, "Directory snapshot failed, all domains unknown");
                errors.push(format!("directory: {}", e));
                Vec::new()
            }
        };

        // Visual stage, iff an image was given.
        let visual_ran = request.image_url.is_some() && self.visual.is_configured();
        let visual = match &request.image_url {
            Some(image_url) if self.visual.is_configured() => {
                self.run_visual_stage(image_url, request.max_lens_results).await
            }
            _ => VisualStageOutput::default(),
        };
        credits_used += visual.credits_used;
        if let Some(error) = &visual.error {
            errors.push(format!("visual: {}", error));
        }

        // Text stage, iff enabled and there is anything to ask.
        let mut text_results = Vec::new();
        if request.include_web_search && self.text.is_configured() {
            let queries = Self::text_queries(request, &visual.follow_up_titles);
            if !queries.is_empty() {
                let options = SearchOptions::new()
                    .with_domains(Self::allowed_domains(&snapshot, &request.dealer_ids))
                    .with_max_results(request.max_web_results);
                let merged = self.text.search_many(&queries, &options).await;
                credits_used += merged.credits_used;
                errors.extend(merged.errors.into_iter().map(|e| format!("text: {}", e)));
                text_results = merged.results;
            }
        }

        // Merge across stages: dedup by URL, first occurrence wins, with
        // visual results ahead of text duplicates.
        let mut seen: HashSet<String> = HashSet::new();
        let merged: Vec<SearchResult> = visual
            .results
            .into_iter()
            .chain(text_results)
            .filter(|r| seen.insert(url_key(&r.url)))
            .collect();

        let annotated = DirectoryIndex::from_sellers(snapshot).annotate(merged);

        let text_participates = request.include_web_search;
        let visual_participates = request.image_url.is_some();
        let configured = match (visual_participates, text_participates) {
            (false, false) => true,
            _ => (visual_participates && self.visual.is_configured())
                || (text_participates && self.text.is_configured()),
        };

        tracing::debug!(
            results = annotated.results.len(),
            unknown_domains = annotated.unknown_domains.len(),
            credits_used,
            visual_ran,
            "Research run complete"
        );

        ResearchOutcome {
            results: annotated.results,
            knowledge_graph: visual.knowledge_graph,
            extracted_titles: visual.follow_up_titles,
            unknown_domains: annotated.unknown_domains,
            credits_used,
            errors,
            configured,
        }
    }

    async fn run_visual_stage(&self, image_url: &str, max_results: usize) -> VisualStageOutput {
        let mut response = self.visual.search(image_url).await;
        response.results.truncate(max_results);

        let follow_up_titles = response
            .results
            .iter()
            .map(|r| r.title.trim())
            .filter(|t| t.chars().count() > MIN_FOLLOW_UP_TITLE_CHARS)
            .take(MAX_FOLLOW_UP_TITLES)
            .map(str::to_string)
            .collect();

        VisualStageOutput {
            results: response.results,
            knowledge_graph: response.knowledge_graph,
            follow_up_titles,
            credits_used: response.credits_used,
            error: response.error,
        }
    }

    /// Caller-supplied variations win, then a caller query, then the titles
    /// the visual stage extracted. Bounded by `max_web_queries`.
    fn text_queries(request: &ResearchRequest, follow_up_titles: &[String]) -> Vec<String> {
        let mut queries: Vec<String> = if !request.query_variations.is_empty() {
            request
                .query_variations
                .iter()
                .map(|v| v.query.clone())
                .collect()
        } else if let Some(query) = &request.query {
            vec![query.clone()]
        } else {
            follow_up_titles.to_vec()
        };
        queries.truncate(request.max_web_queries);
        queries
    }

    /// Domain allow-list when the caller restricts to specific sellers.
    fn allowed_domains(snapshot: &[Seller], dealer_ids: &Option<Vec<Uuid>>) -> Vec<String> {
        let Some(ids) = dealer_ids else {
            return Vec::new();
        };
        let ids: HashSet<&Uuid> = ids.iter().collect();
        snapshot
            .iter()
            .filter(|s| ids.contains(&s.id) && s.can_research)
            .map(|s| s.domain.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockDirectory, MockTextSearch, MockVisualSearch};
    use crate::types::{QueryVariation, SearchSource};

    fn lens_result(title: &str, url: &str) -> SearchResult {
        SearchResult::new(title, url, SearchSource::Lens)
    }

    fn web_result(title: &str, url: &str) -> SearchResult {
        SearchResult::new(title, url, SearchSource::Web)
    }

    #[tokio::test]
    async fn test_image_only_with_unconfigured_web_search() {
        let visual = MockVisualSearch::new().with_results(vec![
            lens_result("Voyage en Suisse original lithograph", "https://a.com/1"),
            lens_result("Nord Express Cassandre poster 1927", "https://b.com/2"),
            lens_result("Swiss railway travel poster c.1935", "https://c.com/3"),
        ]);
        let text = MockTextSearch::new().unconfigured();
        let directory = MockDirectory::new();

        let pipeline = ResearchPipeline::new(text, visual, directory);
        let outcome = pipeline
            .run(&ResearchRequest::for_image("https://cdn.example.com/ref.jpg"))
            .await;

        assert_eq!(outcome.results.len(), 3);
        assert!(outcome.extracted_titles.len() <= MAX_FOLLOW_UP_TITLES);
        assert_eq!(outcome.extracted_titles.len(), 3);
        assert!(outcome.errors.is_empty());
        // Lens was configured and participated, so the run is configured.
        assert!(outcome.configured);
    }

    #[tokio::test]
    async fn test_knowledge_graph_reaches_outcome() {
        let visual = MockVisualSearch::new()
            .with_results(vec![lens_result("A visually similar listing", "https://a.com/1")])
            .with_knowledge_graph(KnowledgeGraph {
                title: "Voyage en Suisse".to_string(),
                subtitle: Some("Lithograph poster".to_string()),
                link: None,
                source: Some("Google Lens".to_string()),
            });
        let pipeline = ResearchPipeline::new(
            MockTextSearch::new().unconfigured(),
            visual,
            MockDirectory::new(),
        );

        let outcome = pipeline
            .run(&ResearchRequest::for_image("https://img/x.jpg"))
            .await;

        let graph = outcome.knowledge_graph.expect("graph should pass through");
        assert_eq!(graph.title, "Voyage en Suisse");
        assert_eq!(graph.subtitle.as_deref(), Some("Lithograph poster"));
    }

    #[tokio::test]
    async fn test_short_titles_not_extracted() {
        let visual = MockVisualSearch::new().with_results(vec![
            lens_result("Short", "https://a.com/1"),
            lens_result("exactly 10", "https://a.com/2"), // 10 chars, not > 10
            lens_result("A longer poster title", "https://a.com/3"),
        ]);
        let pipeline = ResearchPipeline::new(
            MockTextSearch::new().unconfigured(),
            visual,
            MockDirectory::new(),
        );

        let outcome = pipeline
            .run(&ResearchRequest::for_image("https://img/x.jpg"))
            .await;
        assert_eq!(outcome.extracted_titles, vec!["A longer poster title".to_string()]);
    }

    #[tokio::test]
    async fn test_follow_up_titles_drive_text_stage() {
        let visual = MockVisualSearch::new().with_results(vec![lens_result(
            "Voyage en Suisse lithograph",
            "https://lens.com/1",
        )]);
        let text = MockTextSearch::new().with_results(
            "Voyage en Suisse lithograph",
            vec![web_result("Listing", "https://dealer.com/listing")],
        );
        let pipeline = ResearchPipeline::new(text, visual, MockDirectory::new());

        let outcome = pipeline
            .run(&ResearchRequest::for_image("https://img/x.jpg"))
            .await;

        let urls: Vec<_> = outcome.results.iter().map(|r| r.result.url.as_str()).collect();
        assert_eq!(urls, vec!["https://lens.com/1", "https://dealer.com/listing"]);
        assert_eq!(outcome.credits_used, 2);
    }

    #[tokio::test]
    async fn test_caller_variations_beat_extracted_titles_and_are_bounded() {
        let visual = MockVisualSearch::new().with_results(vec![lens_result(
            "A long enough extracted title",
            "https://lens.com/1",
        )]);
        let text = MockTextSearch::new();
        let request = ResearchRequest::for_image("https://img/x.jpg")
            .with_variations(vec![
                QueryVariation::new("q1", "title", 1),
                QueryVariation::new("q2", "title-creator", 2),
                QueryVariation::new("q3", "title-year", 3),
                QueryVariation::new("q4", "title-creator-year", 4),
            ])
            .with_max_web_queries(2);

        let pipeline = ResearchPipeline::new(text, visual, MockDirectory::new());
        let _ = pipeline.run(&request).await;

        assert_eq!(pipeline.text.calls(), vec!["q1".to_string(), "q2".to_string()]);
    }

    #[tokio::test]
    async fn test_merge_dedups_case_insensitively_visual_wins() {
        let visual = MockVisualSearch::new().with_results(vec![lens_result(
            "From the visual stage",
            "https://dealer.com/item?Ref=ABC",
        )]);
        let text = MockTextSearch::new().with_results(
            "q",
            vec![
                web_result("From the text stage", "https://dealer.com/item?ref=abc"),
                web_result("Unique", "https://other.com/x"),
            ],
        );
        let pipeline = ResearchPipeline::new(text, visual, MockDirectory::new());

        let outcome = pipeline
            .run(
                &ResearchRequest::for_image("https://img/x.jpg").with_query("q"),
            )
            .await;

        assert_eq!(outcome.results.len(), 2);
        assert_eq!(outcome.results[0].result.source, SearchSource::Lens);
        assert_eq!(outcome.results[0].result.title, "From the visual stage");
    }

    #[tokio::test]
    async fn test_failing_visual_stage_keeps_text_results() {
        let visual = MockVisualSearch::new().with_failure("Lens search error: HTTP 500", 1);
        let text = MockTextSearch::new()
            .with_results("nord express", vec![web_result("hit", "https://a.com/1")]);

        let pipeline = ResearchPipeline::new(text, visual, MockDirectory::new());
        let outcome = pipeline
            .run(&ResearchRequest::for_image("https://img/x.jpg").with_query("nord express"))
            .await;

        assert_eq!(outcome.results.len(), 1);
        assert_eq!(outcome.errors.len(), 1);
        assert!(outcome.errors[0].starts_with("visual:"));
        assert_eq!(outcome.credits_used, 2);
    }

    #[tokio::test]
    async fn test_annotation_and_unknown_domains() {
        let seller = Seller::new("Galerie 1900", "galerie1900.com").with_tier(1);
        let directory = MockDirectory::new().with_sellers(vec![seller.clone()]);
        let text = MockTextSearch::new().with_results(
            "q",
            vec![
                web_result("known", "https://www.galerie1900.com/item/9"),
                web_result("unknown", "https://stranger.net/listing"),
            ],
        );
        let pipeline = ResearchPipeline::new(text, MockVisualSearch::new(), directory);

        let outcome = pipeline.run(&ResearchRequest::for_query("q")).await;

        assert!(outcome.results[0].is_known_dealer);
        assert_eq!(outcome.results[0].dealer_id, Some(seller.id));
        assert!(!outcome.results[1].is_known_dealer);
        assert_eq!(outcome.unknown_domains, vec!["stranger.net".to_string()]);
        // The snapshot is read exactly once per run.
        assert_eq!(pipeline.directory.reads(), 1);
    }

    #[tokio::test]
    async fn test_dealer_ids_restrict_search_domains() {
        let a = Seller::new("A", "a.com");
        let b = Seller::new("B", "b.com").with_can_research(false);
        let c = Seller::new("C", "c.com");
        let ids = vec![a.id, b.id];
        let directory = MockDirectory::new().with_sellers(vec![a, b, c]);

        let sellers = directory.active_sellers().await.unwrap();
        let domains = ResearchPipeline::<MockTextSearch, MockVisualSearch, MockDirectory>::
            allowed_domains(&sellers, &Some(ids));
        // b.com excluded: not researchable. c.com excluded: not requested.
        assert_eq!(domains, vec!["a.com".to_string()]);
    }

    #[tokio::test]
    async fn test_nothing_configured_flags_outcome() {
        let pipeline = ResearchPipeline::new(
            MockTextSearch::new().unconfigured(),
            MockVisualSearch::new().unconfigured(),
            MockDirectory::new(),
        );
        let outcome = pipeline
            .run(&ResearchRequest::for_image("https://img/x.jpg").with_query("q"))
            .await;
        assert!(!outcome.configured);
        assert!(outcome.results.is_empty());
    }
}
