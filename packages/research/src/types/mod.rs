//! Domain types for the research pipeline.

pub mod config;
pub mod discovery;
pub mod finding;
pub mod query;
pub mod result;
pub mod seller;
pub mod visual;

pub use config::ResearchRequest;
pub use discovery::{DiscoveryRequest, DiscoveryResponse, DiscoverySuggestion};
pub use finding::{DealerSnippet, Finding, ItemContext};
pub use query::QueryVariation;
pub use result::{KnowledgeGraph, MatchedResult, SearchResult, SearchSource};
pub use seller::Seller;
pub use visual::{MatchTier, VisualMatchResult};
