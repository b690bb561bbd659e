//! Frame splitting.
//!
//! Frames are separated by a blank line (`\n\n` or `\r\n\r\n`). The splitter
//! accumulates text (or raw bytes, decoded incrementally as UTF-8) and hands
//! out complete frames only.

use crate::error::{StreamError, StreamResult};

/// Default limit for unconsumed input.
pub const DEFAULT_MAX_BUFFER_SIZE: usize = 10 * 1024 * 1024;

/// Marker payload some runtimes send after the last frame.
pub const DONE_SENTINEL: &str = "[DONE]";

const REPLACEMENT: char = '\u{FFFD}';

/// Splits accumulated input into blank-line delimited frames.
#[derive(Debug)]
pub struct FrameSplitter {
    buffer: String,
    pending_bytes: Vec<u8>,
    max_buffer_size: usize,
}

impl Default for FrameSplitter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_BUFFER_SIZE)
    }
}

impl FrameSplitter {
    /// Create a splitter with the given buffer limit.
    #[must_use]
    pub fn new(max_buffer_size: usize) -> Self {
        Self {
            buffer: String::new(),
            pending_bytes: Vec::new(),
            max_buffer_size,
        }
    }

    /// Append text.
    pub fn push_str(&mut self, s: &str) {
        self.buffer.push_str(s);
    }

    /// Append raw bytes.
    ///
    /// A multi-byte character cut off at the end of `bytes` is held back until
    /// the rest arrives. Invalid sequences become U+FFFD.
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.pending_bytes.extend_from_slice(bytes);

        loop {
            let (valid, invalid_len) = match std::str::from_utf8(&self.pending_bytes) {
                Ok(text) => (text.len(), None),
                Err(e) => (e.valid_up_to(), e.error_len()),
            };

            if let Ok(text) = std::str::from_utf8(&self.pending_bytes[..valid]) {
                self.buffer.push_str(text);
            }

            match invalid_len {
                Some(len) => {
                    self.buffer.push(REPLACEMENT);
                    self.pending_bytes.drain(..valid + len);
                }
                None => {
                    self.pending_bytes.drain(..valid);
                    break;
                }
            }
        }
    }

    /// Take the next complete frame, if any.
    pub fn next_frame(&mut self) -> Option<String> {
        let (pos, delimiter_len) = self.find_frame_boundary()?;
        let frame = self.buffer[..pos].to_string();
        self.buffer.drain(..pos + delimiter_len);
        Some(frame)
    }

    /// Take whatever is left once the input has ended.
    ///
    /// Returns `None` when only whitespace remains.
    pub fn take_remainder(&mut self) -> Option<String> {
        if !self.pending_bytes.is_empty() {
            let tail = String::from_utf8_lossy(&self.pending_bytes).into_owned();
            self.buffer.push_str(&tail);
            self.pending_bytes.clear();
        }

        let remainder = std::mem::take(&mut self.buffer);
        if remainder.trim().is_empty() {
            None
        } else {
            Some(remainder.trim_end_matches(['\n', '\r']).to_string())
        }
    }

    /// Unconsumed text length in bytes.
    #[must_use]
    pub fn buffered_len(&self) -> usize {
        self.buffer.len() + self.pending_bytes.len()
    }

    /// Unconsumed text.
    pub fn buffered(&self) -> &str {
        &self.buffer
    }

    /// Clear the splitter state.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.pending_bytes.clear();
    }

    /// Fail if the unconsumed input exceeds the limit.
    ///
    /// Call after draining complete frames, so only input that cannot yet be
    /// consumed counts against the limit.
    pub fn check_size(&self) -> StreamResult<()> {
        let size = self.buffered_len();
        if size > self.max_buffer_size {
            return Err(StreamError::BufferOverflow {
                size,
                limit: self.max_buffer_size,
            });
        }
        Ok(())
    }

    fn find_frame_boundary(&self) -> Option<(usize, usize)> {
        let newline = self.buffer.find("\n\n").map(|pos| (pos, 2));
        let carriage = self.buffer.find("\r\n\r\n").map(|pos| (pos, 4));

        match (newline, carriage) {
            (Some(nl), Some(cr)) => Some(if cr.0 < nl.0 { cr } else { nl }),
            (Some(nl), None) => Some(nl),
            (None, Some(cr)) => Some(cr),
            (None, None) => None,
        }
    }
}

/// Iterate over the `data:` payloads of a frame.
///
/// One payload per `data:` line, with a single leading space stripped.
/// Stray carriage returns around a line are ignored. `event:`, `id:`,
/// `retry:` and comment lines are skipped.
pub fn data_payloads(frame: &str) -> impl Iterator<Item = &str> {
    frame.lines().filter_map(|line| {
        let value = line.trim_matches('\r').strip_prefix("data:")?;
        Some(value.strip_prefix(' ').unwrap_or(value))
    })
}
