//! Logo service error types.

use thiserror::Error;

/// Errors from logo lookups and write-back.
#[derive(Debug, Error)]
pub enum LogoError {
    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The logo service returned a non-success status code.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code returned by the service.
        status: u16,
        /// Error message or response body.
        message: String,
    },

    /// The service returned a 429 Too Many Requests response.
    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// Failed to parse a service response.
    #[error("parse error: {0}")]
    Parse(String),

    /// No endpoint configured.
    #[error("logo service is not configured")]
    NotConfigured,

    /// Writing the logo back failed.
    #[error("database error: {0}")]
    Database(#[from] fit_db::error::DatabaseError),
}

impl LogoError {
    /// Whether another attempt might succeed.
    ///
    /// Transport failures, rate limiting and server errors are retried; other
    /// client errors and malformed responses are not.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(_) | Self::RateLimited { .. } => true,
            Self::Api { status, .. } => *status >= 500,
            Self::Parse(_) | Self::NotConfigured | Self::Database(_) => false,
        }
    }
}
