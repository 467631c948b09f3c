//! Pure SerpAPI REST API client.
//!
//! A minimal client for SerpAPI's Google Lens engine. Supports reverse-image
//! lookups: submit an image URL, get back visually similar items and an
//! optional knowledge-graph identification of the subject.
//!
//! # Example
//!
//! ```rust,ignore
//! use serpapi_client::SerpApiClient;
//!
//! let client = SerpApiClient::new("your-api-key".into());
//!
//! let response = client.google_lens("https://cdn.example.com/item.jpg").await?;
//! for m in &response.visual_matches {
//!     println!("{} ({})", m.title.as_deref().unwrap_or("(untitled)"), m.link);
//! }
//! ```

pub mod error;
pub mod types;

pub use error::{Result, SerpApiError};
pub use types::{KnowledgeGraphItem, LensResponse, SearchMetadata, VisualMatch};

const BASE_URL: &str = "https://serpapi.com/search.json";

pub struct SerpApiClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl SerpApiClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: BASE_URL.to_string(),
        }
    }

    /// Point the client at a different endpoint (tests, proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Run a Google Lens reverse-image search for the given image URL.
    pub async fn google_lens(&self, image_url: &str) -> Result<LensResponse> {
        tracing::debug!(image_url, "Starting Google Lens search");

        let resp = self
            .client
            .get(&self.base_url)
            .query(&[
                ("engine", "google_lens"),
                ("url", image_url),
                ("api_key", &self.api_key),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(classify_failure(status.as_u16(), body));
        }

        let body = resp.text().await?;

        // SerpAPI reports some failures as 200 with an `error` field.
        if let Ok(err) = serde_json::from_str::<types::ErrorBody>(&body) {
            return Err(classify_failure(status.as_u16(), err.error));
        }

        let lens: LensResponse = serde_json::from_str(&body)?;
        tracing::debug!(
            matches = lens.visual_matches.len(),
            knowledge_graph = !lens.knowledge_graph.is_empty(),
            "Lens search complete"
        );
        Ok(lens)
    }
}

/// Classify an API failure: HTTP 429 or a message mentioning "quota" means
/// the account is out of searches, anything else is a generic API error.
fn classify_failure(status: u16, message: String) -> SerpApiError {
    if status == 429 || message.to_lowercase().contains("quota") {
        SerpApiError::Quota
    } else {
        SerpApiError::Api { status, message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lens_response_decodes_with_missing_sections() {
        let body = r#"{"visual_matches": [{"link": "https://example.com/a"}]}"#;
        let lens: LensResponse = serde_json::from_str(body).unwrap();
        assert_eq!(lens.visual_matches.len(), 1);
        assert!(lens.knowledge_graph.is_empty());
        assert!(lens.visual_matches[0].title.is_none());
    }

    #[test]
    fn test_error_body_takes_precedence() {
        let body = r#"{"error": "Your account has run out of searches."}"#;
        let err: types::ErrorBody = serde_json::from_str(body).unwrap();
        assert!(err.error.contains("run out"));
    }

    #[test]
    fn test_429_classified_as_quota() {
        assert!(matches!(
            classify_failure(429, String::new()),
            SerpApiError::Quota
        ));
    }

    #[test]
    fn test_quota_message_classified_as_quota_even_on_200() {
        // The 200-with-error-body path lands here with status 200.
        assert!(matches!(
            classify_failure(200, "Monthly quota reached".to_string()),
            SerpApiError::Quota
        ));
    }

    #[test]
    fn test_generic_failure_keeps_status_and_message() {
        match classify_failure(500, "backend error".to_string()) {
            SerpApiError::Api { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "backend error");
            }
            other => panic!("unexpected classification: {}", other),
        }
    }

    #[test]
    fn test_knowledge_graph_decodes() {
        let body = r#"{
            "visual_matches": [],
            "knowledge_graph": [{"title": "Voyage en Suisse", "subtitle": "Lithograph poster"}]
        }"#;
        let lens: LensResponse = serde_json::from_str(body).unwrap();
        assert_eq!(lens.knowledge_graph.len(), 1);
        assert_eq!(
            lens.knowledge_graph[0].title.as_deref(),
            Some("Voyage en Suisse")
        );
    }
}
