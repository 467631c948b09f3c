//! Core trait abstractions.
//!
//! Every external collaborator (text search, reverse-image search, the
//! seller directory, the generative model) sits behind one of these traits
//! so the pipeline can be driven entirely by fakes in tests.

pub mod directory;
pub mod model;
pub mod searcher;

pub use directory::SellerDirectory;
pub use model::ChatModel;
pub use searcher::{
    MultiSearchResponse, SearchOptions, TextSearch, TextSearchResponse, VisualSearch,
    VisualSearchResponse,
};
