//! Callbacks fired by the decoder.

use crate::error::StreamError;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

/// Receives decoded output from a [`StreamFrameDecoder`](crate::StreamFrameDecoder).
///
/// All methods default to doing nothing.
///
/// - `on_text_chunk` fires once per text delta, in arrival order, with only
///   the new text.
/// - `on_tool_use` fires at most once per distinct tool name.
/// - `on_complete` fires exactly once, with the authoritative response.
/// - `on_error` fires at most once and nothing fires after it.
pub trait StreamHandler {
    /// A text delta arrived.
    fn on_text_chunk(&mut self, _text: &str) {}

    /// The agent used a tool not reported before in this session.
    fn on_tool_use(&mut self, _name: &str) {}

    /// The stream ended normally.
    fn on_complete(&mut self, _full_text: &str) {}

    /// The transport failed.
    fn on_error(&mut self, _error: &StreamError) {}
}

impl StreamHandler for () {}

impl<H: StreamHandler + ?Sized> StreamHandler for &mut H {
    fn on_text_chunk(&mut self, text: &str) {
        (**self).on_text_chunk(text);
    }

    fn on_tool_use(&mut self, name: &str) {
        (**self).on_tool_use(name);
    }

    fn on_complete(&mut self, full_text: &str) {
        (**self).on_complete(full_text);
    }

    fn on_error(&mut self, error: &StreamError) {
        (**self).on_error(error);
    }
}

impl<H: StreamHandler + ?Sized> StreamHandler for Box<H> {
    fn on_text_chunk(&mut self, text: &str) {
        (**self).on_text_chunk(text);
    }

    fn on_tool_use(&mut self, name: &str) {
        (**self).on_tool_use(name);
    }

    fn on_complete(&mut self, full_text: &str) {
        (**self).on_complete(full_text);
    }

    fn on_error(&mut self, error: &StreamError) {
        (**self).on_error(error);
    }
}

type TextCallback = Box<dyn FnMut(&str) + Send>;
type ErrorCallback = Box<dyn FnMut(&StreamError) + Send>;

/// Closure-backed [`StreamHandler`].
///
/// ```rust
/// use agentstream_streaming::{decode_str, StreamCallbacks};
///
/// let callbacks = StreamCallbacks::new()
///     .with_text_chunk(|text| print!("{text}"))
///     .with_tool_use(|name| println!("\n[using {name}]"));
///
/// let text = decode_str("data: {\"message\":{\"content\":[{\"text\":\"hi\"}]}}", callbacks).unwrap();
/// assert_eq!(text, "hi");
/// ```
#[derive(Default)]
pub struct StreamCallbacks {
    text_chunk: Option<TextCallback>,
    tool_use: Option<TextCallback>,
    complete: Option<TextCallback>,
    error: Option<ErrorCallback>,
}

impl StreamCallbacks {
    /// Create callbacks that do nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the text chunk callback.
    #[must_use]
    pub fn with_text_chunk(mut self, f: impl FnMut(&str) + Send + 'static) -> Self {
        self.text_chunk = Some(Box::new(f));
        self
    }

    /// Set the tool use callback.
    #[must_use]
    pub fn with_tool_use(mut self, f: impl FnMut(&str) + Send + 'static) -> Self {
        self.tool_use = Some(Box::new(f));
        self
    }

    /// Set the completion callback.
    #[must_use]
    pub fn with_complete(mut self, f: impl FnMut(&str) + Send + 'static) -> Self {
        self.complete = Some(Box::new(f));
        self
    }

    /// Set the error callback.
    #[must_use]
    pub fn with_error(mut self, f: impl FnMut(&StreamError) + Send + 'static) -> Self {
        self.error = Some(Box::new(f));
        self
    }
}

impl fmt::Debug for StreamCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamCallbacks")
            .field("text_chunk", &self.text_chunk.is_some())
            .field("tool_use", &self.tool_use.is_some())
            .field("complete", &self.complete.is_some())
            .field("error", &self.error.is_some())
            .finish()
    }
}

impl StreamHandler for StreamCallbacks {
    fn on_text_chunk(&mut self, text: &str) {
        if let Some(f) = self.text_chunk.as_mut() {
            f(text);
        }
    }

    fn on_tool_use(&mut self, name: &str) {
        if let Some(f) = self.tool_use.as_mut() {
            f(name);
        }
    }

    fn on_complete(&mut self, full_text: &str) {
        if let Some(f) = self.complete.as_mut() {
            f(full_text);
        }
    }

    fn on_error(&mut self, error: &StreamError) {
        if let Some(f) = self.error.as_mut() {
            f(error);
        }
    }
}

/// A callback invocation captured as a value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DecodedEvent {
    /// A text delta.
    TextChunk {
        /// The new text.
        text: String,
    },
    /// First use of a tool.
    ToolUse {
        /// Tool name.
        name: String,
    },
    /// The stream completed.
    Complete {
        /// The authoritative response text.
        text: String,
    },
}

impl DecodedEvent {
    /// Get the text of a chunk.
    pub fn as_text_chunk(&self) -> Option<&str> {
        match self {
            Self::TextChunk { text } => Some(text),
            _ => None,
        }
    }

    /// Check if this is the completion event.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete { .. })
    }
}

/// Handler that queues callbacks as [`DecodedEvent`]s.
///
/// Errors are not queued; whoever drives the decoder already receives them
/// as the `Err` of the failing call.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: VecDeque<DecodedEvent>,
}

impl EventQueue {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pop the oldest queued event.
    pub fn pop(&mut self) -> Option<DecodedEvent> {
        self.events.pop_front()
    }

    /// Number of queued events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check if nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Take all queued events.
    pub fn drain(&mut self) -> Vec<DecodedEvent> {
        self.events.drain(..).collect()
    }
}

impl StreamHandler for EventQueue {
    fn on_text_chunk(&mut self, text: &str) {
        self.events.push_back(DecodedEvent::TextChunk {
            text: text.to_string(),
        });
    }

    fn on_tool_use(&mut self, name: &str) {
        self.events.push_back(DecodedEvent::ToolUse {
            name: name.to_string(),
        });
    }

    fn on_complete(&mut self, full_text: &str) {
        self.events.push_back(DecodedEvent::Complete {
            text: full_text.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_callbacks_forward() {
        let seen = Arc::new(Mutex::new(Vec::new()));

        let text_log = Arc::clone(&seen);
        let tool_log = Arc::clone(&seen);
        let error_log = Arc::clone(&seen);
        let mut callbacks = StreamCallbacks::new()
            .with_text_chunk(move |t| text_log.lock().unwrap().push(format!("text:{t}")))
            .with_tool_use(move |n| tool_log.lock().unwrap().push(format!("tool:{n}")))
            .with_error(move |e| error_log.lock().unwrap().push(format!("error:{e}")));

        callbacks.on_text_chunk("a");
        callbacks.on_tool_use("get_roster");
        callbacks.on_complete("ignored, no callback set");
        callbacks.on_error(&StreamError::transport("reset"));

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                "text:a".to_string(),
                "tool:get_roster".to_string(),
                "error:Transport error: reset".to_string(),
            ]
        );
    }

    #[test]
    fn test_callbacks_debug() {
        let callbacks = StreamCallbacks::new().with_complete(|_| {});
        assert_eq!(
            format!("{callbacks:?}"),
            "StreamCallbacks { text_chunk: false, tool_use: false, complete: true, error: false }"
        );
    }

    #[test]
    fn test_event_queue() {
        let mut queue = EventQueue::new();
        queue.on_text_chunk("Hi");
        queue.on_tool_use("search_videos");
        queue.on_error(&StreamError::transport("ignored"));
        queue.on_complete("Hi");

        assert_eq!(queue.len(), 3);
        let first = queue.pop().unwrap();
        assert_eq!(first.as_text_chunk(), Some("Hi"));
        assert!(!first.is_complete());

        let rest = queue.drain();
        assert!(rest.last().is_some_and(DecodedEvent::is_complete));
        assert_eq!(
            rest,
            vec![
                DecodedEvent::ToolUse {
                    name: "search_videos".into()
                },
                DecodedEvent::Complete { text: "Hi".into() },
            ]
        );
        assert!(queue.is_empty());
    }
}
