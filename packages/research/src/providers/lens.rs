//! SerpAPI Google Lens reverse-image search adapter.
//!
//! Wraps the typed `serpapi-client` and normalizes its payload into the
//! common [`VisualSearchResponse`] shape, folding every failure into the
//! `error` field.

use async_trait::async_trait;
use serpapi_client::{LensResponse, SerpApiClient, SerpApiError};

use crate::traits::{VisualSearch, VisualSearchResponse};
use crate::types::{KnowledgeGraph, SearchResult, SearchSource};

/// Google Lens-backed visual search.
pub struct LensVisualSearch {
    client: Option<SerpApiClient>,
}

impl LensVisualSearch {
    /// Create from an injected API key; `None` leaves the provider
    /// unconfigured and `search` refuses without spending quota.
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: api_key
                .filter(|k| !k.is_empty())
                .map(SerpApiClient::new),
        }
    }
}

#[async_trait]
impl VisualSearch for LensVisualSearch {
    fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    async fn search(&self, image_url: &str) -> VisualSearchResponse {
        let Some(client) = &self.client else {
            return VisualSearchResponse::failure("Lens search is not configured", 0);
        };

        match client.google_lens(image_url).await {
            Ok(lens) => adapt(lens),
            Err(SerpApiError::Quota) => {
                tracing::warn!("SerpAPI quota exhausted");
                VisualSearchResponse::failure("Lens search quota exceeded", 0)
            }
            Err(e) => VisualSearchResponse::failure(format!("Lens search error: {}", e), 1),
        }
    }
}

/// Normalize a Lens payload into the common response shape: every visual
/// match becomes a result, and the first titled knowledge-graph entry
/// becomes the subject identification.
fn adapt(lens: LensResponse) -> VisualSearchResponse {
    let results = lens
        .visual_matches
        .into_iter()
        .map(|m| {
            let mut result =
                SearchResult::new(m.title.unwrap_or_default(), m.link, SearchSource::Lens);
            if let Some(thumbnail) = m.thumbnail {
                result = result.with_thumbnail(thumbnail);
            }
            if let Some(source) = m.source {
                result = result.with_snippet(source);
            }
            result
        })
        .collect();

    let knowledge_graph = lens
        .knowledge_graph
        .into_iter()
        .find(|item| item.title.is_some())
        .map(|item| KnowledgeGraph {
            title: item.title.unwrap_or_default(),
            subtitle: item.subtitle,
            link: item.link,
            source: item.source,
        });

    VisualSearchResponse {
        results,
        knowledge_graph,
        credits_used: 1,
        error: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unconfigured_refuses_without_spending_quota() {
        let provider = LensVisualSearch::new(None);
        assert!(!provider.is_configured());

        let response = provider.search("https://cdn.example.com/ref.jpg").await;
        assert_eq!(response.credits_used, 0);
        assert!(response.error.unwrap().contains("not configured"));
    }

    #[test]
    fn test_empty_key_is_unconfigured() {
        assert!(!LensVisualSearch::new(Some(String::new())).is_configured());
        assert!(LensVisualSearch::new(Some("key".into())).is_configured());
    }

    #[test]
    fn test_adapt_maps_matches_and_first_titled_knowledge_graph_entry() {
        let lens: serpapi_client::LensResponse = serde_json::from_str(
            r#"{
                "visual_matches": [
                    {"title": "Voyage en Suisse lithograph", "link": "https://a.ch/1",
                     "source": "Galerie 1900", "thumbnail": "https://t/1.jpg"},
                    {"link": "https://b.ch/2"}
                ],
                "knowledge_graph": [
                    {"subtitle": "untitled entry, skipped"},
                    {"title": "Voyage en Suisse", "subtitle": "Lithograph poster"}
                ]
            }"#,
        )
        .unwrap();

        let response = adapt(lens);
        assert_eq!(response.credits_used, 1);
        assert_eq!(response.results.len(), 2);
        assert_eq!(response.results[0].title, "Voyage en Suisse lithograph");
        assert_eq!(response.results[0].snippet.as_deref(), Some("Galerie 1900"));
        assert_eq!(response.results[0].thumbnail.as_deref(), Some("https://t/1.jpg"));
        assert_eq!(response.results[0].domain, "a.ch");
        assert_eq!(response.results[1].title, "");

        let graph = response.knowledge_graph.unwrap();
        assert_eq!(graph.title, "Voyage en Suisse");
        assert_eq!(graph.subtitle.as_deref(), Some("Lithograph poster"));
    }

    #[test]
    fn test_adapt_without_knowledge_graph() {
        let lens: serpapi_client::LensResponse =
            serde_json::from_str(r#"{"visual_matches": []}"#).unwrap();
        let response = adapt(lens);
        assert!(response.results.is_empty());
        assert!(response.knowledge_graph.is_none());
    }
}
