//! # agentstream-streaming
//!
//! Decoding of agent runtime response streams.
//!
//! The runtime answers with a Server-Sent-Events-like stream: frames separated
//! by a blank line, each carrying one or more `data:` payloads. This crate
//! reassembles frames split across network reads, classifies their payloads
//! and forwards text deltas, tool uses and the final text to a handler.
//!
//! ## Core Concepts
//!
//! - **[`StreamFrameDecoder`]**: per-session decoder with `feed` / `finish`
//! - **[`StreamHandler`]**: callback trait; [`StreamCallbacks`] wraps closures
//! - **[`EventStream`]**: lazily decode a byte stream into [`DecodedEvent`]s
//! - **[`FrameSplitter`]**: the blank-line frame splitter underneath
//!
//! ## Example - Callbacks
//!
//! ```ignore
//! use agentstream_streaming::{StreamCallbacks, StreamFrameDecoder};
//!
//! let callbacks = StreamCallbacks::new()
//!     .with_text_chunk(|text| print!("{}", text))
//!     .with_tool_use(|name| println!("[tool] {}", name));
//!
//! let mut decoder = StreamFrameDecoder::new(callbacks);
//! let text = decoder.drive(response.bytes_stream()).await?;
//! ```
//!
//! ## Example - Event Stream
//!
//! ```ignore
//! use agentstream_streaming::{DecodeStreamExt, DecodedEvent};
//! use futures::StreamExt;
//!
//! let mut events = response.bytes_stream().decode_events();
//! while let Some(event) = events.next().await {
//!     match event? {
//!         DecodedEvent::TextChunk { text } => print!("{}", text),
//!         DecodedEvent::ToolUse { name } => println!("[tool] {}", name),
//!         DecodedEvent::Complete { text } => println!("\n{} chars", text.len()),
//!     }
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod config;
pub mod decoder;
pub mod error;
pub mod frame;
pub mod handler;
pub mod stream;

// Re-exports
pub use config::DecoderConfig;
pub use decoder::{decode_str, DecoderPhase, StreamFrameDecoder, StreamState};
pub use error::{StreamError, StreamResult};
pub use frame::{data_payloads, FrameSplitter};
pub use handler::{DecodedEvent, EventQueue, StreamCallbacks, StreamHandler};
pub use stream::{DecodeStreamExt, EventStream};

/// Prelude for common imports.
pub mod prelude {
    pub use crate::{
        decode_str, DecodeStreamExt, DecodedEvent, DecoderConfig, EventStream, StreamCallbacks,
        StreamError, StreamFrameDecoder, StreamHandler, StreamResult,
    };
}
