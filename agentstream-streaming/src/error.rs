//! Streaming errors.

use std::time::Duration;
use thiserror::Error;

/// Errors that end a decoding session.
///
/// Malformed payloads are never reported here; they are absorbed by the
/// decoder. Only failures of the underlying transport, or misuse of a
/// finished decoder, surface as errors.
#[derive(Debug, Error)]
pub enum StreamError {
    /// The transport failed while reading.
    #[error("Transport error: {0}")]
    Transport(String),

    /// No data arrived within the idle timeout.
    #[error("Timeout after {0:?} waiting for data")]
    Timeout(Duration),

    /// Unconsumed input grew past the configured limit.
    #[error("Buffer overflow: {size} bytes buffered, limit is {limit}")]
    BufferOverflow {
        /// Bytes currently buffered.
        size: usize,
        /// Configured limit.
        limit: usize,
    },

    /// The decoder was used after it completed or failed.
    #[error("Invalid state: {0}")]
    InvalidState(String),
}

impl StreamError {
    /// Check if the error is recoverable by retrying with a fresh session.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::Transport(_))
    }

    /// Create a transport error from any displayable error.
    pub fn transport<E: std::fmt::Display>(err: E) -> Self {
        Self::Transport(err.to_string())
    }
}

/// Result type for streaming operations.
pub type StreamResult<T> = Result<T, StreamError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StreamError::Timeout(Duration::from_secs(5));
        assert_eq!(err.to_string(), "Timeout after 5s waiting for data");

        let err = StreamError::BufferOverflow { size: 11, limit: 10 };
        assert_eq!(
            err.to_string(),
            "Buffer overflow: 11 bytes buffered, limit is 10"
        );
    }

    #[test]
    fn test_recoverable() {
        assert!(StreamError::Timeout(Duration::from_secs(1)).is_recoverable());
        assert!(StreamError::transport("connection reset").is_recoverable());
        assert!(!StreamError::InvalidState("finished".into()).is_recoverable());
        assert!(!StreamError::BufferOverflow { size: 2, limit: 1 }.is_recoverable());
    }
}
