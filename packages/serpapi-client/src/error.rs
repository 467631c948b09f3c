//! Typed errors for the SerpAPI client.

use thiserror::Error;

/// Errors returned by the SerpAPI client.
#[derive(Debug, Error)]
pub enum SerpApiError {
    /// Transport-level failure (DNS, TLS, timeout).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response from the API.
    #[error("SerpAPI error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Account quota exhausted (HTTP 429 or an explicit quota message).
    #[error("SerpAPI quota exhausted")]
    Quota,

    /// Response body did not decode into the expected shape.
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Result type alias for SerpAPI operations.
pub type Result<T> = std::result::Result<T, SerpApiError>;
