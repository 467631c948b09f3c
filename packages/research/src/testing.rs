//! Mock implementations for testing.
//!
//! Scripted fakes for every injected collaborator, so pipeline behavior can
//! be exercised without network access. Used by this crate's own tests and
//! exported for downstream consumers.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::{ResearchError, Result};
use crate::traits::{
    ChatModel, SearchOptions, SellerDirectory, TextSearch, TextSearchResponse, VisualSearch,
    VisualSearchResponse,
};
use crate::types::{KnowledgeGraph, SearchResult, Seller};

/// Scripted text search provider.
#[derive(Default)]
pub struct MockTextSearch {
    responses: Mutex<HashMap<String, TextSearchResponse>>,
    calls: Mutex<Vec<String>>,
    unconfigured: bool,
}

impl MockTextSearch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a successful response (one credit) for a query.
    pub fn with_results(self, query: &str, results: Vec<SearchResult>) -> Self {
        let total = results.len() as u64;
        self.responses.lock().unwrap().insert(
            query.to_string(),
            TextSearchResponse {
                results,
                total_results: total,
                search_time: 0.01,
                credits_used: 1,
                error: None,
            },
        );
        self
    }

    /// Script a failure for a query.
    pub fn with_failure(self, query: &str, message: &str, credits_used: u32) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(query.to_string(), TextSearchResponse::failure(message, credits_used));
        self
    }

    /// Report the provider as unconfigured.
    pub fn unconfigured(mut self) -> Self {
        self.unconfigured = true;
        self
    }

    /// Queries received so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextSearch for MockTextSearch {
    fn is_configured(&self) -> bool {
        !self.unconfigured
    }

    async fn search(&self, query: &str, _options: &SearchOptions) -> TextSearchResponse {
        self.calls.lock().unwrap().push(query.to_string());
        self.responses
            .lock()
            .unwrap()
            .get(query)
            .cloned()
            .unwrap_or(TextSearchResponse {
                credits_used: 1,
                ..Default::default()
            })
    }
}

/// Scripted reverse-image search provider.
#[derive(Default)]
pub struct MockVisualSearch {
    response: Mutex<VisualSearchResponse>,
    calls: Mutex<Vec<String>>,
    unconfigured: bool,
}

impl MockVisualSearch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the response returned for every search.
    pub fn with_results(self, results: Vec<SearchResult>) -> Self {
        {
            let mut response = self.response.lock().unwrap();
            response.results = results;
            response.credits_used = 1;
        }
        self
    }

    pub fn with_knowledge_graph(self, graph: KnowledgeGraph) -> Self {
        self.response.lock().unwrap().knowledge_graph = Some(graph);
        self
    }

    pub fn with_failure(self, message: &str, credits_used: u32) -> Self {
        *self.response.lock().unwrap() = VisualSearchResponse::failure(message, credits_used);
        self
    }

    pub fn unconfigured(mut self) -> Self {
        self.unconfigured = true;
        self
    }

    /// Image URLs received so far.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl VisualSearch for MockVisualSearch {
    fn is_configured(&self) -> bool {
        !self.unconfigured
    }

    async fn search(&self, image_url: &str) -> VisualSearchResponse {
        self.calls.lock().unwrap().push(image_url.to_string());
        self.response.lock().unwrap().clone()
    }
}

/// In-memory seller directory that counts reads.
#[derive(Default)]
pub struct MockDirectory {
    sellers: Vec<Seller>,
    reads: AtomicUsize,
}

impl MockDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sellers(mut self, sellers: Vec<Seller>) -> Self {
        self.sellers = sellers;
        self
    }

    /// How many snapshot reads have been taken.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SellerDirectory for MockDirectory {
    async fn active_sellers(&self) -> Result<Vec<Seller>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .sellers
            .iter()
            .filter(|s| s.is_active)
            .cloned()
            .collect())
    }

    async fn seller(&self, id: Uuid) -> Result<Seller> {
        self.sellers
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or(ResearchError::SellerNotFound { id })
    }
}

/// Scripted generative model.
///
/// Responses are consumed in order; when the queue is empty the default
/// response is used, and with no default the call fails. An optional delay
/// plus in-flight counters let concurrency bounds be asserted.
#[derive(Default)]
pub struct MockModel {
    responses: Mutex<VecDeque<std::result::Result<String, String>>>,
    default_response: Option<String>,
    prompts: Mutex<Vec<String>>,
    delay: Option<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    unconfigured: bool,
}

impl MockModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue one successful completion.
    pub fn with_response(self, response: impl Into<String>) -> Self {
        self.responses.lock().unwrap().push_back(Ok(response.into()));
        self
    }

    /// Queue one failing completion.
    pub fn with_error(self, message: impl Into<String>) -> Self {
        self.responses.lock().unwrap().push_back(Err(message.into()));
        self
    }

    /// Response used whenever the queue is empty.
    pub fn with_default_response(mut self, response: impl Into<String>) -> Self {
        self.default_response = Some(response.into());
        self
    }

    /// Sleep this long inside every call (for concurrency assertions).
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn unconfigured(mut self) -> Self {
        self.unconfigured = true;
        self
    }

    /// User prompts received so far.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    /// Highest number of calls observed in flight at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    async fn run(&self, user: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(user.to_string());

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let scripted = self.responses.lock().unwrap().pop_front();
        match scripted {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(ResearchError::Model(message.into())),
            None => self
                .default_response
                .clone()
                .ok_or_else(|| ResearchError::Model("no scripted response".into())),
        }
    }
}

#[async_trait]
impl ChatModel for MockModel {
    fn is_configured(&self) -> bool {
        !self.unconfigured
    }

    async fn complete(&self, _system: &str, user: &str) -> Result<String> {
        self.run(user).await
    }

    async fn complete_with_images(
        &self,
        _system: &str,
        user: &str,
        _image_urls: &[String],
    ) -> Result<String> {
        self.run(user).await
    }
}
