//! Error types for the embeddings system.

use thiserror::Error;

/// Result type alias for embedding operations.
pub type Result<T> = std::result::Result<T, EmbeddingError>;

/// Errors that can occur in the embeddings system.
///
/// Scoring never fails: mismatched dimensions and zero vectors degrade to
/// sentinel scores instead. These variants cover corrupt stored data and
/// the embedding generator boundary.
#[derive(Error, Debug)]
pub enum EmbeddingError {
    /// Serialized embedding whose length is not a whole number of elements.
    #[error("malformed embedding bytes: {len} bytes is not a multiple of {width}")]
    MalformedBytes { len: usize, width: usize },

    /// Dimension mismatch.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Provider not configured.
    #[error("embedding provider not configured")]
    ProviderNotConfigured,

    /// Request the provider cannot serve as given.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// API request failed.
    #[error("API request failed: {0}")]
    ApiRequest(String),

    /// Invalid response from provider.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded.
    #[error("rate limit exceeded, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP error.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}
