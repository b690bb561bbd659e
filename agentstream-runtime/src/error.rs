//! Runtime client error types.

use agentstream_streaming::StreamError;
use std::time::Duration;
use thiserror::Error;

/// Errors from invoking an agent runtime.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Non-success HTTP status.
    #[error("HTTP error: {status} - {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// Could not connect.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Request timed out.
    #[error("Request timeout after {0:?}")]
    Timeout(Duration),

    /// Invalid or missing configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Failure while reading or decoding the response stream.
    #[error("Stream error: {0}")]
    Stream(#[from] StreamError),

    /// Network error.
    #[error("Network error: {0}")]
    Network(String),
}

impl RuntimeError {
    /// Check if starting a fresh session and retrying may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            RuntimeError::Timeout(_) => true,
            RuntimeError::Connection(_) => true,
            RuntimeError::Network(_) => true,
            RuntimeError::Http { status, .. } => *status == 429 || *status >= 500,
            RuntimeError::Stream(err) => err.is_recoverable(),
            _ => false,
        }
    }

    /// Create an HTTP error.
    pub fn http(status: u16, body: impl Into<String>) -> Self {
        Self::Http {
            status,
            body: body.into(),
        }
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Map a reqwest error, reporting `timeout` for timeouts.
    pub fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            RuntimeError::Timeout(timeout)
        } else if err.is_connect() {
            RuntimeError::Connection(err.to_string())
        } else if let Some(status) = err.status() {
            RuntimeError::http(status.as_u16(), err.to_string())
        } else {
            RuntimeError::Network(err.to_string())
        }
    }
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
