//! Decoder configuration.

use crate::frame::DEFAULT_MAX_BUFFER_SIZE;
use agentstream_core::{ToolNameScanner, DEFAULT_TRIGGERS};
use std::time::Duration;

/// Configuration for a [`StreamFrameDecoder`](crate::StreamFrameDecoder).
#[derive(Debug, Clone)]
pub struct DecoderConfig {
    /// Limit for input that has not yet formed a complete frame.
    pub max_buffer_size: usize,
    /// Longest wait for the next chunk when driving an async stream.
    pub idle_timeout: Option<Duration>,
    /// Substrings that enable the heuristic tool-name scan.
    pub tool_triggers: Vec<String>,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_buffer_size: DEFAULT_MAX_BUFFER_SIZE,
            idle_timeout: None,
            tool_triggers: DEFAULT_TRIGGERS.iter().map(|t| t.to_string()).collect(),
        }
    }
}

impl DecoderConfig {
    /// Create the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the buffer limit.
    #[must_use]
    pub fn with_max_buffer_size(mut self, size: usize) -> Self {
        self.max_buffer_size = size;
        self
    }

    /// Set the idle timeout.
    #[must_use]
    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = Some(timeout);
        self
    }

    /// Replace the heuristic scan triggers.
    #[must_use]
    pub fn with_tool_triggers<I, S>(mut self, triggers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tool_triggers = triggers.into_iter().map(Into::into).collect();
        self
    }

    /// Build the tool-name scanner for this configuration.
    #[must_use]
    pub fn scanner(&self) -> ToolNameScanner {
        ToolNameScanner::with_triggers(self.tool_triggers.iter().cloned())
    }
}
