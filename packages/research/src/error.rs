//! Typed errors for the research library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling.
//!
//! Most provider failures never surface through these types at the public
//! boundary: search clients fold them into an `error` string on the response
//! so a partial result set is always returned. The enum exists for the
//! internal plumbing and for the one case allowed to propagate, an
//! unparseable model payload ([`ResearchError::Parse`]).

use thiserror::Error;

/// Errors that can occur during research operations.
#[derive(Debug, Error)]
pub enum ResearchError {
    /// Required credentials or settings absent; checked before spending quota.
    #[error("configuration missing: {what}")]
    ConfigMissing { what: String },

    /// Provider quota exhausted. Implies "do not retry now".
    ///
    /// The Display string contains "quota" so callers folding this into a
    /// response `error` field can still tell exhaustion from a generic
    /// failure.
    #[error("{provider} quota exceeded")]
    QuotaExceeded { provider: String },

    /// Transport or non-2xx failure from a provider; retryable later.
    #[error("{provider} error: {message}")]
    Provider { provider: String, message: String },

    /// Model output unparseable even after sanitization.
    #[error("failed to parse model output: {reason}")]
    Parse { reason: String },

    /// Referenced seller absent from the directory snapshot.
    #[error("seller not found: {id}")]
    SellerNotFound { id: uuid::Uuid },

    /// Generative model call failed.
    #[error("model error: {0}")]
    Model(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Directory read failed.
    #[error("directory error: {0}")]
    Directory(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// JSON decoding error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ResearchError {
    /// Whether this failure means the provider quota is spent for now.
    pub fn is_quota(&self) -> bool {
        matches!(self, Self::QuotaExceeded { .. })
    }
}

/// Result type alias for research operations.
pub type Result<T> = std::result::Result<T, ResearchError>;
