//! Google Custom Search JSON API client.
//!
//! Implements [`TextSearch`] with the never-throw contract: every failure is
//! folded into the response `error` field. Quota exhaustion (HTTP 429 or a
//! body mentioning "quota") reports zero credits because the call was
//! refused; any other failure reports one credit because the call was spent.

use async_trait::async_trait;
use serde::Deserialize;

use crate::security::SecretString;
use crate::traits::{SearchOptions, TextSearch, TextSearchResponse};
use crate::types::{SearchResult, SearchSource};

const BASE_URL: &str = "https://www.googleapis.com/customsearch/v1";

/// Provider hard cap on results per call.
pub const MAX_RESULTS_PER_CALL: usize = 10;

/// Google Custom Search-backed text search.
pub struct GoogleTextSearch {
    client: reqwest::Client,
    api_key: Option<SecretString>,
    /// Programmable Search Engine id.
    cx: Option<String>,
    base_url: String,
}

impl GoogleTextSearch {
    /// Create a client from injected credentials. Either being absent leaves
    /// the provider unconfigured; `search` then refuses without spending
    /// quota.
    pub fn new(api_key: Option<String>, cx: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.filter(|k| !k.is_empty()).map(SecretString::new),
            cx: cx.filter(|c| !c.is_empty()),
            base_url: BASE_URL.to_string(),
        }
    }

    /// Point the client at a different endpoint (tests, proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Classify a non-2xx response into (error message, credits spent).
    ///
    /// Quota exhaustion (HTTP 429 or a body mentioning "quota") spends
    /// nothing because the call was refused; any other failure spends one
    /// credit because the call went through.
    fn classify_failure(status: u16, body: &str) -> (String, u32) {
        if status == 429 || body.to_lowercase().contains("quota") {
            ("Google Search quota exceeded".to_string(), 0)
        } else {
            (format!("Google Search error: HTTP {}", status), 1)
        }
    }

    /// Append OR'd `site:` filters for a domain allow-list.
    fn build_query(query: &str, domains: &[String]) -> String {
        if domains.is_empty() {
            return query.to_string();
        }
        let sites = domains
            .iter()
            .map(|d| format!("site:{}", d))
            .collect::<Vec<_>>()
            .join(" OR ");
        format!("{} {}", query, sites)
    }
}

#[async_trait]
impl TextSearch for GoogleTextSearch {
    fn is_configured(&self) -> bool {
        self.api_key.is_some() && self.cx.is_some()
    }

    async fn search(&self, query: &str, options: &SearchOptions) -> TextSearchResponse {
        let (Some(api_key), Some(cx)) = (&self.api_key, &self.cx) else {
            return TextSearchResponse::failure("Google Search is not configured", 0);
        };

        let full_query = Self::build_query(query, &options.domains);
        let num = options.max_results.clamp(1, MAX_RESULTS_PER_CALL).to_string();
        tracing::debug!(query = %full_query, num, "Google text search");

        let mut params = vec![
            ("key", api_key.expose().to_string()),
            ("cx", cx.clone()),
            ("q", full_query),
            ("num", num),
        ];
        if let Some(start) = options.start_index {
            params.push(("start", start.to_string()));
        }

        let response = match self.client.get(&self.base_url).query(&params).send().await {
            Ok(r) => r,
            Err(e) => {
                return TextSearchResponse::failure(format!("Google Search error: {}", e), 1)
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let (message, credits_used) = Self::classify_failure(status.as_u16(), &body);
            if credits_used == 0 {
                tracing::warn!(%status, "Google Search quota exhausted");
            }
            return TextSearchResponse::failure(message, credits_used);
        }

        let body: SearchBody = match response.json().await {
            Ok(b) => b,
            Err(e) => {
                return TextSearchResponse::failure(
                    format!("Google Search error: bad response body: {}", e),
                    1,
                )
            }
        };

        let results = body
            .items
            .into_iter()
            .map(|item| {
                let mut result =
                    SearchResult::new(item.title, item.link, SearchSource::Web);
                if let Some(snippet) = item.snippet {
                    result = result.with_snippet(snippet);
                }
                result
            })
            .collect();

        let info = body.search_information.unwrap_or_default();
        TextSearchResponse {
            results,
            total_results: info
                .total_results
                .and_then(|t| t.parse().ok())
                .unwrap_or(0),
            search_time: info.search_time.unwrap_or(0.0),
            credits_used: 1,
            error: None,
        }
    }
}

// Duck-typed provider payload, decoded with exhaustive field defaults.

#[derive(Debug, Deserialize)]
struct SearchBody {
    #[serde(default)]
    items: Vec<SearchItem>,
    #[serde(rename = "searchInformation")]
    search_information: Option<SearchInformation>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    #[serde(default)]
    title: String,
    link: String,
    #[serde(default)]
    snippet: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct SearchInformation {
    /// Google reports this as a decimal string.
    #[serde(rename = "totalResults")]
    total_results: Option<String>,
    #[serde(rename = "searchTime")]
    search_time: Option<f64>,
}
