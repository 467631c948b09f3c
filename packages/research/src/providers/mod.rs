//! Concrete search provider clients.
//!
//! - [`GoogleTextSearch`]: Google Custom Search JSON API (keyword search).
//! - [`LensVisualSearch`]: SerpAPI Google Lens (reverse-image search).

pub mod google;
pub mod lens;

pub use google::GoogleTextSearch;
pub use lens::LensVisualSearch;
