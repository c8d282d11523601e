//! Error types for the cache server
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache server.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Value exceeds the configured payload limit
    #[error("Cache entry too large: {actual} bytes (max allowed: {max} bytes)")]
    EntryTooLarge { actual: usize, max: usize },

    /// Shard count must be a positive integer
    #[error("Invalid shard count: {0} (must be greater than zero)")]
    InvalidShardCount(usize),

    /// Key not found in cache (HTTP layer only)
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let message = self.to_string();

        let (status, body) = match &self {
            CacheError::EntryTooLarge { actual, max } => (
                StatusCode::PAYLOAD_TOO_LARGE,
                json!({
                    "error": message,
                    "actual": actual,
                    "limit": max,
                }),
            ),
            CacheError::NotFound(_) => (StatusCode::NOT_FOUND, json!({ "error": message })),
            CacheError::InvalidRequest(_) | CacheError::InvalidShardCount(_) => {
                (StatusCode::BAD_REQUEST, json!({ "error": message }))
            }
            CacheError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": message }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache server.
pub type Result<T> = std::result::Result<T, CacheError>;
