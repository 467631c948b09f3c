//! Collectible Item Research Library
//!
//! A multi-stage research pipeline for identifying collectible items (vintage
//! posters and similar works on paper) and surveying the dealer market for
//! them: reverse-image search, title-driven web search, dealer directory
//! matching, structured market-fact extraction, and pairwise visual
//! verification.
//!
//! # Design Philosophy
//!
//! **"Failures are data"**
//!
//! - Every provider call returns a structured response; errors travel in it
//! - Partial results always come back; one failing stage never cancels siblings
//! - Quota exhaustion is distinguishable from generic failure
//! - Collaborators are injected traits, so everything tests against fakes
//!
//! # Usage
//!
//! ```rust,ignore
//! use research::pipeline::ResearchPipeline;
//! use research::providers::{GoogleTextSearch, LensVisualSearch};
//! use research::types::ResearchRequest;
//!
//! let pipeline = ResearchPipeline::new(text_search, lens, directory);
//! let outcome = pipeline
//!     .run(&ResearchRequest::for_image("https://img.example/poster.jpg"))
//!     .await;
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Core trait abstractions (TextSearch, VisualSearch, SellerDirectory, ChatModel)
//! - [`types`] - Research data types
//! - [`queries`] - Title cleaning and query variation generation
//! - [`matching`] - Domain normalization and directory matching
//! - [`pipeline`] - Multi-stage research orchestrator
//! - [`providers`] - Search provider implementations
//! - [`extractor`] - Structured market-fact extraction
//! - [`verifier`] - Pairwise visual verification
//! - [`discovery`] - Discovery of new seller candidates
//! - [`security`] - Credential handling
//! - [`testing`] - Mock implementations for testing

pub mod discovery;
pub mod error;
pub mod extractor;
pub mod matching;
pub mod pipeline;
pub mod providers;
pub mod queries;
pub mod security;
pub mod testing;
pub mod traits;
pub mod types;
pub mod verifier;

#[cfg(feature = "openai")]
pub mod ai;

// Re-export core types at crate root
pub use error::{ResearchError, Result};
pub use traits::{
    ChatModel, MultiSearchResponse, SearchOptions, SellerDirectory, TextSearch,
    TextSearchResponse, VisualSearch, VisualSearchResponse,
};
pub use types::{
    DealerSnippet, DiscoveryRequest, DiscoveryResponse, DiscoverySuggestion, Finding,
    ItemContext, KnowledgeGraph, MatchTier, MatchedResult, QueryVariation, ResearchRequest,
    SearchResult, SearchSource, Seller, VisualMatchResult,
};

// Re-export the orchestrator and its collaborators
pub use discovery::DealerScout;
pub use extractor::MarketExtractor;
pub use matching::{normalize_domain, url_key, DirectoryIndex};
pub use pipeline::{ResearchOutcome, ResearchPipeline};
pub use queries::QueryGenerator;
pub use verifier::VisualVerifier;

// Re-export provider implementations
pub use providers::{GoogleTextSearch, LensVisualSearch};

#[cfg(feature = "openai")]
pub use ai::OpenAi;

// Re-export testing utilities
pub use testing::{MockDirectory, MockModel, MockTextSearch, MockVisualSearch};
