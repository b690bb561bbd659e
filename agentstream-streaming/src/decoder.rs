//! The stream frame decoder.
//!
//! A [`StreamFrameDecoder`] owns the [`StreamState`] of one request. Input is
//! fed as it arrives; every complete frame is parsed immediately and its
//! events are forwarded to the [`StreamHandler`]. Partial frames stay
//! buffered until the rest arrives or [`StreamFrameDecoder::finish`] flushes
//! them.

use crate::config::DecoderConfig;
use crate::error::{StreamError, StreamResult};
use crate::frame::{data_payloads, FrameSplitter, DONE_SENTINEL};
use crate::handler::StreamHandler;
use agentstream_core::{classify_payload, StreamEvent, ToolNameScanner};
use std::collections::HashSet;
use tracing::{debug, trace, warn};

/// Lifecycle of a decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderPhase {
    /// Accepting input.
    Streaming,
    /// `finish` ran and `on_complete` fired.
    Completed,
    /// The transport failed and `on_error` fired.
    Failed,
}

/// Per-session decoding state.
#[derive(Debug)]
pub struct StreamState {
    frames: FrameSplitter,
    accumulated_text: String,
    final_text: Option<String>,
    seen_tools: HashSet<String>,
    tools_used: Vec<String>,
    frame_count: usize,
}

impl StreamState {
    fn new(max_buffer_size: usize) -> Self {
        Self {
            frames: FrameSplitter::new(max_buffer_size),
            accumulated_text: String::new(),
            final_text: None,
            seen_tools: HashSet::new(),
            tools_used: Vec::new(),
            frame_count: 0,
        }
    }

    /// Input that has not formed a complete frame yet.
    pub fn buffered(&self) -> &str {
        self.frames.buffered()
    }

    /// Concatenation of every text delta so far.
    pub fn accumulated_text(&self) -> &str {
        &self.accumulated_text
    }

    /// The final message, if one arrived.
    pub fn final_text(&self) -> Option<&str> {
        self.final_text.as_deref()
    }

    /// Tool names reported so far.
    pub fn seen_tools(&self) -> &HashSet<String> {
        &self.seen_tools
    }

    /// Tool names in the order they were first reported.
    pub fn tools_used(&self) -> &[String] {
        &self.tools_used
    }

    /// Number of frames parsed.
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// The authoritative text: the final message if any, else the deltas.
    pub fn result(&self) -> &str {
        self.final_text.as_deref().unwrap_or(&self.accumulated_text)
    }
}

/// Decodes a chunked frame stream into handler callbacks.
///
/// # Example
///
/// ```rust
/// use agentstream_streaming::{EventQueue, StreamFrameDecoder};
///
/// let mut decoder = StreamFrameDecoder::new(EventQueue::new());
/// decoder.feed("data: {\"event\":{\"contentBlockDelta\":{\"delta\":{\"text\":\"Hel").unwrap();
/// decoder.feed("lo\"}}}}\n\n").unwrap();
///
/// assert_eq!(decoder.state().accumulated_text(), "Hello");
/// assert_eq!(decoder.finish().unwrap(), "Hello");
/// ```
#[derive(Debug)]
pub struct StreamFrameDecoder<H> {
    state: StreamState,
    handler: H,
    scanner: ToolNameScanner,
    config: DecoderConfig,
    phase: DecoderPhase,
}

impl<H: StreamHandler> StreamFrameDecoder<H> {
    /// Create a decoder with the default configuration.
    pub fn new(handler: H) -> Self {
        Self::with_config(handler, DecoderConfig::default())
    }

    /// Create a decoder with a custom configuration.
    pub fn with_config(handler: H, config: DecoderConfig) -> Self {
        Self {
            state: StreamState::new(config.max_buffer_size),
            handler,
            scanner: config.scanner(),
            config,
            phase: DecoderPhase::Streaming,
        }
    }

    /// Get the decoding state.
    pub fn state(&self) -> &StreamState {
        &self.state
    }

    /// Get the configuration.
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Get the current phase.
    pub fn phase(&self) -> DecoderPhase {
        self.phase
    }

    /// Check if the decoder completed or failed.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.phase != DecoderPhase::Streaming
    }

    /// Get the handler.
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Get the handler mutably.
    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    /// Consume the decoder, returning the handler.
    pub fn into_handler(self) -> H {
        self.handler
    }

    /// Feed a text chunk.
    ///
    /// Every complete frame in the buffer is processed before returning.
    pub fn feed(&mut self, chunk: &str) -> StreamResult<()> {
        self.ensure_streaming()?;
        self.state.frames.push_str(chunk);
        self.drain_frames()
    }

    /// Feed a raw byte chunk.
    ///
    /// UTF-8 sequences split across chunks are reassembled.
    pub fn feed_bytes(&mut self, chunk: &[u8]) -> StreamResult<()> {
        self.ensure_streaming()?;
        self.state.frames.push_bytes(chunk);
        self.drain_frames()
    }

    /// End the stream.
    ///
    /// Processes any unterminated trailing frame, fires `on_complete` and
    /// returns the authoritative text.
    pub fn finish(&mut self) -> StreamResult<String> {
        self.ensure_streaming()?;

        if let Some(frame) = self.state.frames.take_remainder() {
            trace!(len = frame.len(), "Flushing unterminated frame");
            self.process_frame(&frame);
        }

        self.phase = DecoderPhase::Completed;
        let text = self.state.result().to_string();
        debug!(
            frames = self.state.frame_count,
            text_len = text.len(),
            tools = self.state.tools_used.len(),
            final_message = self.state.final_text.is_some(),
            "Stream complete"
        );
        self.handler.on_complete(&text);

        Ok(text)
    }

    /// Fail the session with a transport-level error.
    ///
    /// Fires `on_error` unless the decoder already finished, and hands the
    /// error back for propagation.
    pub fn fail(&mut self, error: StreamError) -> StreamError {
        if self.phase == DecoderPhase::Streaming {
            warn!(error = %error, "Stream failed");
            self.phase = DecoderPhase::Failed;
            self.handler.on_error(&error);
        }
        error
    }

    fn ensure_streaming(&self) -> StreamResult<()> {
        match self.phase {
            DecoderPhase::Streaming => Ok(()),
            DecoderPhase::Completed => Err(StreamError::InvalidState(
                "decoder already completed".into(),
            )),
            DecoderPhase::Failed => Err(StreamError::InvalidState("decoder already failed".into())),
        }
    }

    fn drain_frames(&mut self) -> StreamResult<()> {
        while let Some(frame) = self.state.frames.next_frame() {
            self.process_frame(&frame);
        }

        self.state.frames.check_size().map_err(|err| self.fail(err))
    }

    fn process_frame(&mut self, frame: &str) {
        self.state.frame_count += 1;
        trace!(frame = self.state.frame_count, len = frame.len(), "Parsing frame");

        for payload in data_payloads(frame) {
            if payload.trim() == DONE_SENTINEL {
                continue;
            }
            for event in classify_payload(payload) {
                self.dispatch(event);
            }
        }
    }

    fn dispatch(&mut self, event: StreamEvent) {
        match event {
            StreamEvent::TextDelta { text } => {
                self.state.accumulated_text.push_str(&text);
                self.handler.on_text_chunk(&text);
            }
            StreamEvent::FinalMessage { text } => {
                self.state.final_text = Some(text);
            }
            StreamEvent::ToolUse { name } => self.report_tool(name),
            StreamEvent::Unrecognized { raw } => match self.scanner.scan(&raw) {
                Some(name) => self.report_tool(name),
                None => debug!(len = raw.len(), "Ignoring unrecognized payload"),
            },
        }
    }

    fn report_tool(&mut self, name: String) {
        if self.state.seen_tools.insert(name.clone()) {
            debug!(tool = %name, "Tool use");
            self.handler.on_tool_use(&name);
            self.state.tools_used.push(name);
        } else {
            trace!(tool = %name, "Suppressing repeated tool use");
        }
    }
}

/// Decode a complete response handed over in one piece.
pub fn decode_str<H: StreamHandler>(input: &str, handler: H) -> StreamResult<String> {
    let mut decoder = StreamFrameDecoder::new(handler);
    decoder.feed(input)?;
    decoder.finish()
}
