//! # agentstream-core
//!
//! Core types for decoding agent runtime response streams.
//!
//! - **Events**: the [`StreamEvent`] sum type and the payload classifier
//! - **Tool scanning**: regex heuristics for payloads the classifier cannot place
//! - **Sessions**: caller-owned map from logical to runtime session ids
//!
//! ## Example
//!
//! ```rust
//! use agentstream_core::{classify_payload, StreamEvent};
//!
//! let events = classify_payload(r#"{"event":{"contentBlockDelta":{"delta":{"text":"Hi"}}}}"#);
//! assert_eq!(events, vec![StreamEvent::text_delta("Hi")]);
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod events;
pub mod session;
pub mod tool_scan;

pub use events::{classify_payload, classify_value, find_tool_name, StreamEvent};
pub use session::{derive_runtime_session_id, RuntimeSession, SessionStore};
pub use tool_scan::{ToolNameScanner, DEFAULT_TRIGGERS};

/// Prelude module for common imports.
pub mod prelude {
    pub use crate::events::{classify_payload, StreamEvent};
    pub use crate::session::{RuntimeSession, SessionStore};
    pub use crate::tool_scan::ToolNameScanner;
}
