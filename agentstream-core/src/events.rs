//! Stream event types and payload classification.
//!
//! Every `data:` payload pulled out of a frame is classified into zero or
//! more [`StreamEvent`]s. JSON payloads are matched against a small fixed set
//! of discriminator paths; anything else becomes [`StreamEvent::Unrecognized`]
//! and is left to the heuristic scanner in [`crate::tool_scan`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::fmt;

/// JSON pointers carrying an incremental text chunk.
pub const TEXT_DELTA_PATHS: &[&str] = &[
    "/event/contentBlockDelta/delta/text",
    "/contentBlockDelta/delta/text",
];

/// JSON pointer carrying the complete assistant message.
pub const FINAL_MESSAGE_PATH: &str = "/message/content";

/// JSON pointers carrying the name of a tool invocation.
pub const TOOL_USE_PATHS: &[&str] = &[
    "/event/contentBlockStart/start/toolUse/name",
    "/contentBlockStart/start/toolUse/name",
];

/// Keys that name a tool on their own.
const TOOL_NAME_KEYS: &[&str] = &["tool_name", "function_name"];

/// Keys that turn a plain `name` into a tool invocation when present alongside it.
const TOOL_COMPANION_KEYS: &[&str] = &[
    "toolUseId",
    "tool_use_id",
    "id",
    "type",
    "input",
    "arguments",
];

/// An event decoded from a single frame payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Incremental chunk of assistant output.
    TextDelta {
        /// The new text only.
        text: String,
    },

    /// Complete response that supersedes accumulated deltas.
    FinalMessage {
        /// The full response text.
        text: String,
    },

    /// The remote agent invoked a named capability.
    ToolUse {
        /// Tool name.
        name: String,
    },

    /// Payload that is not JSON or matches no known shape.
    Unrecognized {
        /// The payload as received.
        raw: String,
    },
}

impl StreamEvent {
    /// Create a text delta event.
    pub fn text_delta(text: impl Into<String>) -> Self {
        Self::TextDelta { text: text.into() }
    }

    /// Create a final message event.
    pub fn final_message(text: impl Into<String>) -> Self {
        Self::FinalMessage { text: text.into() }
    }

    /// Create a tool use event.
    pub fn tool_use(name: impl Into<String>) -> Self {
        Self::ToolUse { name: name.into() }
    }

    /// Create an unrecognized event.
    pub fn unrecognized(raw: impl Into<String>) -> Self {
        Self::Unrecognized { raw: raw.into() }
    }

    /// Get the delta text if this is a text delta.
    pub fn as_delta(&self) -> Option<&str> {
        match self {
            Self::TextDelta { text } => Some(text),
            _ => None,
        }
    }

    /// Get the tool name if this is a tool use.
    pub fn tool_name(&self) -> Option<&str> {
        match self {
            Self::ToolUse { name } => Some(name),
            _ => None,
        }
    }

    /// Check if this payload could not be classified.
    #[must_use]
    pub fn is_unrecognized(&self) -> bool {
        matches!(self, Self::Unrecognized { .. })
    }
}

impl fmt::Display for StreamEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TextDelta { text } => write!(f, "{}", text),
            Self::FinalMessage { text } => write!(f, "[final] {}", text),
            Self::ToolUse { name } => write!(f, "[tool_use] {}", name),
            Self::Unrecognized { raw } => write!(f, "[unrecognized] {}", raw),
        }
    }
}

/// Classify one `data:` payload.
///
/// Returns events in the order tool use, text delta, final message. A payload
/// that is not JSON, or JSON that matches none of the known shapes, yields a
/// single [`StreamEvent::Unrecognized`].
pub fn classify_payload(payload: &str) -> Vec<StreamEvent> {
    let events = serde_json::from_str::<JsonValue>(payload)
        .map(|value| classify_value(&value))
        .unwrap_or_default();

    if events.is_empty() {
        vec![StreamEvent::unrecognized(payload)]
    } else {
        events
    }
}

/// Classify an already-parsed JSON payload.
///
/// An empty result means the value matched no known shape.
pub fn classify_value(value: &JsonValue) -> Vec<StreamEvent> {
    let mut events = Vec::new();

    if let Some(name) = find_tool_name(value) {
        events.push(StreamEvent::ToolUse { name });
    }
    if let Some(text) = find_text_delta(value) {
        events.push(StreamEvent::TextDelta { text });
    }
    if let Some(text) = find_final_message(value) {
        events.push(StreamEvent::FinalMessage { text });
    }

    events
}

fn find_text_delta(value: &JsonValue) -> Option<String> {
    TEXT_DELTA_PATHS
        .iter()
        .filter_map(|path| value.pointer(path))
        .filter_map(JsonValue::as_str)
        .find(|text| !text.is_empty())
        .map(str::to_string)
}

fn find_final_message(value: &JsonValue) -> Option<String> {
    let text = match value.pointer(FINAL_MESSAGE_PATH)? {
        JsonValue::String(text) => text.clone(),
        JsonValue::Array(blocks) => {
            let mut texts = blocks
                .iter()
                .filter_map(|block| block.get("text").and_then(JsonValue::as_str))
                .peekable();
            texts.peek()?;
            texts.collect::<String>()
        }
        _ => return None,
    };

    (!text.is_empty()).then_some(text)
}

/// Find the first tool name in a payload.
///
/// Known discriminator paths are checked first. Failing that, the value is
/// walked depth-first for an object that either carries `tool_name` /
/// `function_name`, or a string `name` next to an identifying companion such
/// as `toolUseId`, `id`, `type` or `input`. A lone `name` is not a tool.
pub fn find_tool_name(value: &JsonValue) -> Option<String> {
    TOOL_USE_PATHS
        .iter()
        .filter_map(|path| value.pointer(path))
        .find_map(non_empty_name)
        .or_else(|| walk_for_tool(value))
}

fn walk_for_tool(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::Object(map) => tool_name_in(map).or_else(|| map.values().find_map(walk_for_tool)),
        JsonValue::Array(items) => items.iter().find_map(walk_for_tool),
        _ => None,
    }
}

fn tool_name_in(map: &Map<String, JsonValue>) -> Option<String> {
    if let Some(name) = TOOL_NAME_KEYS
        .iter()
        .filter_map(|key| map.get(*key))
        .find_map(non_empty_name)
    {
        return Some(name);
    }

    let name = map.get("name").and_then(non_empty_name)?;
    TOOL_COMPANION_KEYS
        .iter()
        .any(|key| map.contains_key(*key))
        .then_some(name)
}

fn non_empty_name(value: &JsonValue) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}
