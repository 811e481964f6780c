//! Error types for skydoc.
//!
//! This module defines a unified error enum covering every failure category
//! in the pipeline: ingestion, embedding, retrieval, weather resolution,
//! answer generation, and the surrounding configuration and I/O plumbing.

use thiserror::Error;

/// Unified error type for skydoc.
///
/// All fallible functions in the workspace return `Result<T, AppError>`.
/// We never panic — errors must be represented and propagated.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Ingestion input unusable (absent, unreadable, or no extractable text).
    /// Fatal to the ingestion call; committed collections are unaffected.
    #[error("Document load error: {0}")]
    Load(String),

    /// Embedding provider failure. Fatal to the call that requested it;
    /// during ingestion this aborts the whole run with no partial commit.
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Search against a store with no committed collection
    #[error("Not found: {0}")]
    NotFound(String),

    /// The query contained no extractable location
    #[error("No location found: {0}")]
    LocationNotFound(String),

    /// Weather service unreachable, rate-limited, or returned malformed data
    #[error("Upstream weather error: {0}")]
    Upstream(String),

    /// Language model failure or empty output. Fatal to the request.
    #[error("Generation error: {0}")]
    Generation(String),

    /// Concurrent ingestion attempted on a collection already being written
    #[error("Collection busy: {0}")]
    Busy(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The request was cancelled cooperatively between pipeline stages
    #[error("Request cancelled")]
    Cancelled,
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
