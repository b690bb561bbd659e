//! Agent runtime client.
//!
//! Each invocation resolves the runtime session through the client's
//! [`SessionStore`], opens the transport, and decodes the response with a
//! fresh [`StreamFrameDecoder`]. Decoders are never shared between requests.

use crate::config::RuntimeConfig;
use crate::error::RuntimeResult;
use crate::transport::{ByteStream, HttpTransport, InvokeRequest, Transport};
use agentstream_core::SessionStore;
use agentstream_streaming::{
    DecoderConfig, EventStream, StreamError, StreamFrameDecoder, StreamHandler,
};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing::debug;

/// Client for one agent runtime.
#[derive(Debug)]
pub struct AgentRuntimeClient<T = HttpTransport> {
    transport: T,
    sessions: Arc<SessionStore>,
    decoder_config: DecoderConfig,
}

impl AgentRuntimeClient<HttpTransport> {
    /// Create an HTTP client from a configuration.
    pub fn from_config(config: RuntimeConfig) -> RuntimeResult<Self> {
        let mut decoder_config = DecoderConfig::default();
        decoder_config.idle_timeout = config.idle_timeout;

        Ok(Self::new(HttpTransport::new(config)?).with_decoder_config(decoder_config))
    }

    /// Create an HTTP client configured from the environment.
    pub fn from_env() -> RuntimeResult<Self> {
        Self::from_config(RuntimeConfig::from_env()?)
    }
}

impl<T: Transport> AgentRuntimeClient<T> {
    /// Create a client over any transport.
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            sessions: Arc::new(SessionStore::new()),
            decoder_config: DecoderConfig::default(),
        }
    }

    /// Use a session store owned by the caller.
    #[must_use]
    pub fn with_sessions(mut self, sessions: Arc<SessionStore>) -> Self {
        self.sessions = sessions;
        self
    }

    /// Set the decoder configuration used for every invocation.
    #[must_use]
    pub fn with_decoder_config(mut self, config: DecoderConfig) -> Self {
        self.decoder_config = config;
        self
    }

    /// Get the session store.
    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    /// Get the transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Send a prompt and stream the answer into `handler`.
    ///
    /// Returns the authoritative response text. Any failure to reach the
    /// runtime fires `on_error` on the handler before being returned.
    pub async fn invoke<H: StreamHandler>(
        &self,
        session_id: &str,
        prompt: &str,
        handler: H,
    ) -> RuntimeResult<String> {
        self.invoke_payload(session_id, serde_json::json!({ "prompt": prompt }), handler)
            .await
    }

    /// Send an arbitrary JSON body and stream the answer into `handler`.
    pub async fn invoke_payload<H: StreamHandler>(
        &self,
        session_id: &str,
        payload: JsonValue,
        handler: H,
    ) -> RuntimeResult<String> {
        let mut decoder = StreamFrameDecoder::with_config(handler, self.decoder_config.clone());

        let stream = match self.open(session_id, payload).await {
            Ok(stream) => stream,
            Err(err) => {
                decoder.fail(StreamError::transport(&err));
                return Err(err);
            }
        };

        Ok(decoder.drive(stream).await?)
    }

    /// Send a prompt and return the answer as a stream of decoded events.
    pub async fn stream_events(
        &self,
        session_id: &str,
        prompt: &str,
    ) -> RuntimeResult<EventStream<ByteStream>> {
        let stream = self
            .open(session_id, serde_json::json!({ "prompt": prompt }))
            .await?;
        Ok(EventStream::with_config(stream, self.decoder_config.clone()))
    }

    async fn open(&self, session_id: &str, payload: JsonValue) -> RuntimeResult<ByteStream> {
        let runtime_session_id = self.sessions.runtime_session_id(session_id);
        debug!(
            session_id = %session_id,
            runtime_session_id = %runtime_session_id,
            "Opening runtime stream"
        );
        self.transport
            .open(InvokeRequest::new(runtime_session_id, payload))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SESSION_HEADER;
    use crate::error::RuntimeError;
    use crate::transport::MockTransport;
    use agentstream_streaming::{DecodedEvent, StreamCallbacks};
    use bytes::Bytes;
    use futures::{stream, StreamExt};
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;
    use wiremock::matchers::{header_exists, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const RESPONSE: &str = concat!(
        "data: {\"event\":{\"contentBlockStart\":{\"start\":{\"toolUse\":{\"name\":\"get_roster\",\"toolUseId\":\"t1\"}}}}}\n\n",
        "data: {\"event\":{\"contentBlockDelta\":{\"delta\":{\"text\":\"Alice works \"}}}}\n\n",
        "data: {\"event\":{\"contentBlockDelta\":{\"delta\":{\"text\":\"Monday.\"}}}}\n\n",
    );

    fn byte_stream(parts: Vec<&'static str>) -> ByteStream {
        Box::pin(stream::iter(
            parts
                .into_iter()
                .map(|p| Ok::<_, RuntimeError>(Bytes::from_static(p.as_bytes())))
                .collect::<Vec<_>>(),
        ))
    }

    #[derive(Debug, Default)]
    struct Log {
        chunks: Vec<String>,
        tools: Vec<String>,
        errors: Vec<String>,
    }

    fn logging_callbacks(log: &Arc<Mutex<Log>>) -> StreamCallbacks {
        let (chunks, tools, errors) = (Arc::clone(log), Arc::clone(log), Arc::clone(log));
        StreamCallbacks::new()
            .with_text_chunk(move |t| chunks.lock().unwrap().chunks.push(t.to_string()))
            .with_tool_use(move |n| tools.lock().unwrap().tools.push(n.to_string()))
            .with_error(move |e| errors.lock().unwrap().errors.push(e.to_string()))
    }

    #[tokio::test]
    async fn test_invoke_decodes_split_response() {
        let mut transport = MockTransport::new();
        transport
            .expect_open()
            .withf(|request| {
                request.runtime_session_id.starts_with("staff-")
                    && request.payload == serde_json::json!({"prompt": "Who works Monday?"})
            })
            .times(1)
            .returning(|_| {
                let (a, b) = RESPONSE.split_at(RESPONSE.len() / 2);
                Ok(byte_stream(vec![a, b]))
            });

        let log = Arc::new(Mutex::new(Log::default()));
        let client = AgentRuntimeClient::new(transport);
        let text = client
            .invoke("staff", "Who works Monday?", logging_callbacks(&log))
            .await
            .unwrap();

        assert_eq!(text, "Alice works Monday.");
        let log = log.lock().unwrap();
        assert_eq!(log.chunks, vec!["Alice works ", "Monday."]);
        assert_eq!(log.tools, vec!["get_roster"]);
        assert!(log.errors.is_empty());
    }

    #[tokio::test]
    async fn test_invoke_reuses_runtime_session() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let record = Arc::clone(&seen);

        let mut transport = MockTransport::new();
        transport.expect_open().times(3).returning(move |request| {
            record.lock().unwrap().push(request.runtime_session_id);
            Ok(byte_stream(vec![RESPONSE]))
        });

        let sessions = Arc::new(SessionStore::new());
        let client = AgentRuntimeClient::new(transport).with_sessions(Arc::clone(&sessions));

        client.invoke("video-chat", "first", ()).await.unwrap();
        client.invoke("video-chat", "second", ()).await.unwrap();
        client.invoke("other-chat", "third", ()).await.unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen[0], seen[1]);
        assert_ne!(seen[0], seen[2]);
        assert_eq!(sessions.len(), 2);
        assert_eq!(
            sessions.get("video-chat").unwrap().runtime_session_id,
            seen[0]
        );
    }

    #[tokio::test]
    async fn test_open_failure_fires_on_error() {
        let mut transport = MockTransport::new();
        transport
            .expect_open()
            .returning(|_| Err(RuntimeError::Connection("refused".into())));

        let log = Arc::new(Mutex::new(Log::default()));
        let client = AgentRuntimeClient::new(transport);
        let err = client
            .invoke("s", "hi", logging_callbacks(&log))
            .await
            .unwrap_err();

        assert!(matches!(err, RuntimeError::Connection(_)));
        assert_eq!(
            log.lock().unwrap().errors,
            vec!["Transport error: Connection error: refused"]
        );
    }

    #[tokio::test]
    async fn test_mid_stream_failure() {
        let mut transport = MockTransport::new();
        transport.expect_open().returning(|_| {
            let items = vec![
                Ok(Bytes::from_static(
                    b"data: {\"contentBlockDelta\":{\"delta\":{\"text\":\"par\"}}}\n\n",
                )),
                Err(RuntimeError::Network("stream reset".into())),
            ];
            Ok(Box::pin(stream::iter(items)) as ByteStream)
        });

        let log = Arc::new(Mutex::new(Log::default()));
        let client = AgentRuntimeClient::new(transport);
        let err = client
            .invoke("s", "hi", logging_callbacks(&log))
            .await
            .unwrap_err();

        assert!(matches!(err, RuntimeError::Stream(StreamError::Transport(_))));
        assert!(err.is_retryable());
        let log = log.lock().unwrap();
        assert_eq!(log.chunks, vec!["par"]);
        assert_eq!(log.errors.len(), 1);
    }

    #[tokio::test]
    async fn test_stream_events() {
        let mut transport = MockTransport::new();
        transport
            .expect_open()
            .returning(|_| Ok(byte_stream(vec![RESPONSE])));

        let client = AgentRuntimeClient::new(transport);
        let events: Vec<DecodedEvent> = client
            .stream_events("s", "hi")
            .await
            .unwrap()
            .map(|event| event.unwrap())
            .collect()
            .await;

        assert_eq!(events.len(), 4);
        assert_eq!(
            events[0],
            DecodedEvent::ToolUse {
                name: "get_roster".into()
            }
        );
        assert_eq!(
            events[3],
            DecodedEvent::Complete {
                text: "Alice works Monday.".into()
            }
        );
    }

    #[tokio::test]
    async fn test_http_round_trip() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header_exists(SESSION_HEADER))
            .respond_with(ResponseTemplate::new(200).set_body_raw(RESPONSE, "text/event-stream"))
            .mount(&server)
            .await;

        let config = RuntimeConfig::new("arn:aws:bedrock-agentcore:us-east-1:1:runtime/demo", "us-east-1")
            .unwrap()
            .with_endpoint(&server.uri())
            .unwrap();
        let client = AgentRuntimeClient::from_config(config).unwrap();

        let text = client.invoke("chat-1", "hi", ()).await.unwrap();
        assert_eq!(text, "Alice works Monday.");

        let requests = server.received_requests().await.unwrap();
        let header = requests[0].headers.get(SESSION_HEADER).unwrap().to_str().unwrap();
        assert_eq!(
            header,
            client.sessions().get("chat-1").unwrap().runtime_session_id
        );
    }
}
