//! Error types for data operations.
//!
//! This module defines [`RxError`] which covers all error cases that can occur
//! when building queries, executing them remotely, or caching results.

use thiserror::Error;

/// Errors that can occur during data operations.
#[derive(Error, Debug)]
pub enum RxError {
    /// Network-related errors (connection failures, timeouts, etc.).
    #[error("Network error: {0}")]
    Network(String),

    /// Rate limit exceeded by the analytic service.
    #[error("Rate limited by {service}: retry after {retry_after:?}")]
    RateLimited {
        /// The service that rate limited the request.
        service: String,
        /// Suggested time to wait before retrying.
        retry_after: Option<std::time::Duration>,
    },

    /// The remote service rejected or failed the query.
    #[error("Query failed: {0}")]
    Query(String),

    /// Error parsing a result set returned by the service.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Error interacting with the cache.
    #[error("Cache error: {0}")]
    Cache(String),

    /// No query executor is configured.
    #[error("Executor not configured: {0}")]
    ExecutorNotConfigured(String),

    /// An invalid parameter was provided.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Authentication failed against the analytic service.
    #[error("Authentication failed for {0}")]
    AuthenticationFailed(String),

    /// Any other error.
    #[error("{0}")]
    Other(String),
}

/// Result type alias using [`RxError`].
pub type Result<T> = std::result::Result<T, RxError>;
