//! Error types for the collection sync client

use thiserror::Error;

/// Failure of a Synchronization API call
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// The request could not complete (connect failure, timeout, reset)
    #[error("Network error: {0}")]
    Network(String),

    /// Duplicate add
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Target of a remove is absent; callers treat this as success
    #[error("Not found")]
    NotFound,

    /// 401/403 or no credentials for the owner
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Invalid response body: {0}")]
    Decode(String),
}

/// Errors of the durable collection cache
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
