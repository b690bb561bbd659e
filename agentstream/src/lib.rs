//! # agentstream
//!
//! Incremental decoding of streamed agent runtime responses.
//!
//! A hosted agent answers with a Server-Sent-Events-like stream whose frames
//! arrive split at arbitrary points. agentstream reassembles the frames,
//! recognizes text deltas, tool invocations and the final message, and hands
//! them to your callbacks as they arrive.
//!
//! ## Quick Start
//!
//! ```ignore
//! use agentstream::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = AgentRuntimeClient::from_env()?;
//!     let callbacks = StreamCallbacks::new()
//!         .with_text_chunk(|text| print!("{}", text))
//!         .with_tool_use(|name| println!("\n[tool] {}", name));
//!
//!     let answer = client.invoke("chat-1", "Who is on shift today?", callbacks).await?;
//!     println!("\n{}", answer);
//!     Ok(())
//! }
//! ```
//!
//! ## Decoding Without a Client
//!
//! ```ignore
//! use agentstream::prelude::*;
//!
//! let mut decoder = StreamFrameDecoder::new(StreamCallbacks::new());
//! decoder.feed("data: {\"contentBlockDelta\":{\"delta\":{\"text\":\"Hi\"}}}\n")?;
//! decoder.feed("\n")?;
//! assert_eq!(decoder.finish()?, "Hi");
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description | Default |
//! |---------|-------------|--------|
//! | `runtime` | HTTP client for the agent runtime | ✅ |
//!
//! ## Architecture
//!
//! - [`agentstream_core`] - Event classification, tool-name scan, sessions
//! - [`agentstream_streaming`] - Frame splitting, decoder, handlers
//! - `agentstream_runtime` - Runtime HTTP client (feature `runtime`)

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// ============================================================================
// Crate Re-exports
// ============================================================================

/// Event classification, tool-name scan and sessions.
pub use agentstream_core as core;

/// Frame splitting and the stream decoder.
pub use agentstream_streaming as streaming;

/// Runtime HTTP client.
#[cfg(feature = "runtime")]
#[cfg_attr(docsrs, doc(cfg(feature = "runtime")))]
pub use agentstream_runtime as runtime;

// ============================================================================
// Flat Re-exports
// ============================================================================

pub use agentstream_core::{
    classify_payload, RuntimeSession, SessionStore, StreamEvent, ToolNameScanner,
};

pub use agentstream_streaming::{
    decode_str, DecodeStreamExt, DecodedEvent, DecoderConfig, DecoderPhase, EventStream,
    StreamCallbacks, StreamError, StreamFrameDecoder, StreamHandler, StreamResult,
};

#[cfg(feature = "runtime")]
pub use agentstream_runtime::{
    AgentRuntimeClient, HttpTransport, InvokeRequest, RuntimeConfig, RuntimeError,
    RuntimeResult, Transport,
};

// ============================================================================
// Prelude
// ============================================================================

/// Prelude for common imports.
pub mod prelude {
    pub use agentstream_core::prelude::*;
    pub use agentstream_streaming::prelude::*;

    #[cfg(feature = "runtime")]
    pub use agentstream_runtime::prelude::*;
}
