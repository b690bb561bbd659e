//! # agentstream-runtime
//!
//! Client for a hosted agent runtime that answers over a streaming HTTP
//! response.
//!
//! Every conversation is pinned to a runtime session. The first invocation for
//! a conversation creates the runtime session id, later invocations reuse it,
//! so the agent keeps its memory between turns. Responses are decoded with
//! [`agentstream_streaming`] as they arrive.
//!
//! ## Example
//!
//! ```ignore
//! use agentstream_runtime::{AgentRuntimeClient, RuntimeConfig};
//! use agentstream_streaming::StreamCallbacks;
//!
//! let client = AgentRuntimeClient::from_config(RuntimeConfig::from_env()?)?;
//! let callbacks = StreamCallbacks::new()
//!     .with_text_chunk(|text| print!("{}", text))
//!     .with_tool_use(|name| println!("\n[tool] {}", name));
//!
//! let answer = client.invoke("chat-42", "Who is on shift today?", callbacks).await?;
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod client;
pub mod config;
pub mod error;
pub mod transport;

// Re-exports
pub use client::AgentRuntimeClient;
pub use config::{RuntimeConfig, DEFAULT_QUALIFIER, DEFAULT_REGION, SESSION_HEADER};
pub use error::{RuntimeError, RuntimeResult};
pub use transport::{ByteStream, HttpTransport, InvokeRequest, Transport};

/// Prelude for common imports.
pub mod prelude {
    pub use crate::{AgentRuntimeClient, RuntimeConfig, RuntimeError, RuntimeResult, Transport};
}
