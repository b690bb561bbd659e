//! Async adapters over byte streams.
//!
//! [`StreamFrameDecoder::drive`] pushes a whole transport stream through a
//! decoder and returns the final text. [`EventStream`] does the same lazily,
//! yielding each callback as a [`DecodedEvent`].

use crate::config::DecoderConfig;
use crate::decoder::StreamFrameDecoder;
use crate::error::{StreamError, StreamResult};
use crate::handler::{DecodedEvent, EventQueue, StreamHandler};
use futures::{Stream, StreamExt};
use pin_project_lite::pin_project;
use std::fmt::Display;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::time::Sleep;

impl<H: StreamHandler> StreamFrameDecoder<H> {
    /// Drive a transport stream to completion.
    ///
    /// Each chunk is fed as bytes. An `Err` item fails the session, as does a
    /// read that outlasts [`DecoderConfig::idle_timeout`]. End of stream
    /// finishes the decoder and returns the authoritative text.
    pub async fn drive<S, B, E>(&mut self, stream: S) -> StreamResult<String>
    where
        S: Stream<Item = Result<B, E>>,
        B: AsRef<[u8]>,
        E: Display,
    {
        let mut stream = std::pin::pin!(stream);

        loop {
            let next = match self.config().idle_timeout {
                Some(limit) => match tokio::time::timeout(limit, stream.next()).await {
                    Ok(next) => next,
                    Err(_) => return Err(self.fail(StreamError::Timeout(limit))),
                },
                None => stream.next().await,
            };

            match next {
                Some(Ok(chunk)) => self.feed_bytes(chunk.as_ref())?,
                Some(Err(err)) => return Err(self.fail(StreamError::transport(err))),
                None => return self.finish(),
            }
        }
    }
}

pin_project! {
    /// Stream of decoded events over a byte stream.
    ///
    /// Yields `TextChunk` and `ToolUse` events as frames complete, then a
    /// single `Complete`. A transport error or timeout is yielded once as
    /// `Err`, after which the stream ends.
    pub struct EventStream<S> {
        #[pin]
        inner: S,
        decoder: StreamFrameDecoder<EventQueue>,
        idle: Option<Pin<Box<Sleep>>>,
        finished: bool,
    }
}

impl<S> EventStream<S> {
    /// Create an event stream with the default configuration.
    pub fn new(inner: S) -> Self {
        Self::with_config(inner, DecoderConfig::default())
    }

    /// Create an event stream with a custom configuration.
    pub fn with_config(inner: S, config: DecoderConfig) -> Self {
        Self {
            inner,
            decoder: StreamFrameDecoder::with_config(EventQueue::new(), config),
            idle: None,
            finished: false,
        }
    }

    /// Get the underlying decoder.
    pub fn decoder(&self) -> &StreamFrameDecoder<EventQueue> {
        &self.decoder
    }
}

impl<S, B, E> Stream for EventStream<S>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: Display,
{
    type Item = StreamResult<DecodedEvent>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        loop {
            if let Some(event) = this.decoder.handler_mut().pop() {
                return Poll::Ready(Some(Ok(event)));
            }

            if *this.finished {
                return Poll::Ready(None);
            }

            match this.inner.as_mut().poll_next(cx) {
                Poll::Ready(Some(Ok(chunk))) => {
                    *this.idle = None;
                    if let Err(error) = this.decoder.feed_bytes(chunk.as_ref()) {
                        *this.finished = true;
                        return Poll::Ready(Some(Err(error)));
                    }
                }
                Poll::Ready(Some(Err(err))) => {
                    *this.finished = true;
                    let error = this.decoder.fail(StreamError::transport(err));
                    return Poll::Ready(Some(Err(error)));
                }
                Poll::Ready(None) => {
                    *this.finished = true;
                    if let Err(error) = this.decoder.finish() {
                        return Poll::Ready(Some(Err(error)));
                    }
                }
                Poll::Pending => {
                    let Some(limit) = this.decoder.config().idle_timeout else {
                        return Poll::Pending;
                    };
                    let sleep = this
                        .idle
                        .get_or_insert_with(|| Box::pin(tokio::time::sleep(limit)));
                    if sleep.as_mut().poll(cx).is_ready() {
                        *this.finished = true;
                        let error = this.decoder.fail(StreamError::Timeout(limit));
                        return Poll::Ready(Some(Err(error)));
                    }
                    return Poll::Pending;
                }
            }
        }
    }
}

/// Extension trait for decoding byte streams.
pub trait DecodeStreamExt: Stream + Sized {
    /// Decode this byte stream into events.
    fn decode_events(self) -> EventStream<Self> {
        EventStream::new(self)
    }

    /// Decode this byte stream into events with a custom configuration.
    fn decode_events_with(self, config: DecoderConfig) -> EventStream<Self> {
        EventStream::with_config(self, config)
    }
}

impl<S: Stream> DecodeStreamExt for S {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::StreamCallbacks;
    use bytes::Bytes;
    use futures::stream;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    fn chunks(parts: &[&'static str]) -> impl Stream<Item = Result<Bytes, std::io::Error>> {
        stream::iter(
            parts
                .iter()
                .map(|p| Ok(Bytes::from_static(p.as_bytes())))
                .collect::<Vec<_>>(),
        )
    }

    const SPLIT_RESPONSE: &[&str] = &[
        "data: {\"event\":{\"contentBlockDelta\":{\"delta\":{\"text\":\"Hel",
        "lo\"}}}}\n\ndata: {\"toolUse\":{\"name\":\"search_videos\",\"toolUseId\":\"1\"}}\n",
        "\ndata: {\"event\":{\"contentBlockDelta\":{\"delta\":{\"text\":\" world\"}}}}",
    ];

    #[tokio::test]
    async fn test_drive_reassembles_split_frames() {
        let chunks_seen = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&chunks_seen);
        let callbacks = StreamCallbacks::new().with_text_chunk(move |t| log.lock().unwrap().push(t.to_string()));

        let mut decoder = StreamFrameDecoder::new(callbacks);
        let text = decoder.drive(chunks(SPLIT_RESPONSE)).await.unwrap();

        assert_eq!(text, "Hello world");
        assert_eq!(*chunks_seen.lock().unwrap(), vec!["Hello", " world"]);
        assert_eq!(decoder.state().tools_used(), ["search_videos".to_string()]);
    }

    #[test]
    fn test_drive_single_chunk_blocking() {
        let mut decoder = StreamFrameDecoder::new(());
        let response = chunks(&["data: {\"message\":{\"content\":[{\"text\":\"ok\"}]}}\n\n"]);

        let text = tokio_test::block_on(decoder.drive(response)).unwrap();
        assert_eq!(text, "ok");
    }

    #[tokio::test]
    async fn test_drive_transport_error() {
        let errors = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&errors);
        let completed = Arc::new(Mutex::new(false));
        let done = Arc::clone(&completed);
        let callbacks = StreamCallbacks::new()
            .with_error(move |e| log.lock().unwrap().push(e.to_string()))
            .with_complete(move |_| *done.lock().unwrap() = true);

        let items: Vec<Result<Bytes, std::io::Error>> = vec![
            Ok(Bytes::from_static(b"data: {\"contentBlockDelta\":{\"delta\":{\"text\":\"a\"}}}\n\n")),
            Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset by peer")),
            Ok(Bytes::from_static(b"data: never read\n\n")),
        ];

        let mut decoder = StreamFrameDecoder::new(callbacks);
        let err = decoder.drive(stream::iter(items)).await.unwrap_err();

        assert!(matches!(err, StreamError::Transport(_)));
        assert_eq!(*errors.lock().unwrap(), vec!["Transport error: reset by peer"]);
        assert!(!*completed.lock().unwrap());
        assert_eq!(decoder.state().accumulated_text(), "a");
    }

    #[tokio::test(start_paused = true)]
    async fn test_drive_idle_timeout() {
        let config = DecoderConfig::new().with_idle_timeout(Duration::from_secs(5));
        let mut decoder = StreamFrameDecoder::with_config((), config);

        let stalled = chunks(&["data: x"]).chain(stream::pending());
        let err = decoder.drive(stalled).await.unwrap_err();

        assert!(matches!(err, StreamError::Timeout(d) if d == Duration::from_secs(5)));
        assert!(decoder.is_finished());
    }

    #[tokio::test]
    async fn test_event_stream() {
        let events: Vec<DecodedEvent> = chunks(SPLIT_RESPONSE)
            .decode_events()
            .map(|event| event.unwrap())
            .collect()
            .await;

        assert_eq!(
            events,
            vec![
                DecodedEvent::TextChunk { text: "Hello".into() },
                DecodedEvent::ToolUse {
                    name: "search_videos".into()
                },
                DecodedEvent::TextChunk {
                    text: " world".into()
                },
                DecodedEvent::Complete {
                    text: "Hello world".into()
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_event_stream_error_ends_stream() {
        let items: Vec<Result<&'static str, String>> =
            vec![Ok("data: {\"message\":{\"content\":\"done\"}}"), Err("boom".to_string())];

        let results: Vec<StreamResult<DecodedEvent>> =
            stream::iter(items).decode_events().collect().await;

        assert_eq!(results.len(), 1);
        assert!(matches!(&results[0], Err(StreamError::Transport(msg)) if msg == "boom"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_event_stream_idle_timeout() {
        let config = DecoderConfig::new().with_idle_timeout(Duration::from_millis(250));
        let mut events = chunks(&["data: {\"contentBlockDelta\":{\"delta\":{\"text\":\"hi\"}}}\n\n"])
            .chain(stream::pending())
            .decode_events_with(config);

        let first = events.next().await.unwrap().unwrap();
        assert_eq!(first.as_text_chunk(), Some("hi"));

        let second = events.next().await.unwrap();
        assert!(matches!(second, Err(StreamError::Timeout(_))));
        assert!(events.next().await.is_none());
    }
}
