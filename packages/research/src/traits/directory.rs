//! Seller directory trait.
//!
//! The directory owns seller records; the core only reads them. Callers take
//! a fresh snapshot per request; nothing in this crate caches directory
//! reads, which is what makes re-running discovery or research idempotent
//! with respect to directory edits.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::types::Seller;

/// Read access to the curated seller directory.
#[async_trait]
pub trait SellerDirectory: Send + Sync {
    /// All active sellers. Implementations must hit the source of truth,
    /// not a cache.
    async fn active_sellers(&self) -> Result<Vec<Seller>>;

    /// One seller by id. Absent ids yield [`ResearchError::SellerNotFound`],
    /// which callers report as a non-match rather than a failure.
    ///
    /// [`ResearchError::SellerNotFound`]: crate::error::ResearchError::SellerNotFound
    async fn seller(&self, id: Uuid) -> Result<Seller>;
}
