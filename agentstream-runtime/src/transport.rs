//! Transports that open a response byte stream.

use crate::config::{RuntimeConfig, SESSION_HEADER};
use crate::error::{RuntimeError, RuntimeResult};
use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::pin::Pin;
use tracing::debug;

/// Boxed response byte stream.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, RuntimeError>> + Send>>;

/// One invocation of the agent runtime.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvokeRequest {
    /// Runtime session id to send.
    pub runtime_session_id: String,
    /// JSON request body.
    pub payload: JsonValue,
}

impl InvokeRequest {
    /// Create a request with an arbitrary JSON body.
    pub fn new(runtime_session_id: impl Into<String>, payload: JsonValue) -> Self {
        Self {
            runtime_session_id: runtime_session_id.into(),
            payload,
        }
    }

    /// Create a request carrying a single prompt.
    pub fn prompt(runtime_session_id: impl Into<String>, prompt: &str) -> Self {
        Self::new(runtime_session_id, serde_json::json!({ "prompt": prompt }))
    }
}

/// Opens the response stream for an invocation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send the request and return the response body as a byte stream.
    async fn open(&self, request: InvokeRequest) -> RuntimeResult<ByteStream>;
}

/// HTTP transport over reqwest.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    config: RuntimeConfig,
}

impl HttpTransport {
    /// Create a transport with its own HTTP client.
    pub fn new(config: RuntimeConfig) -> RuntimeResult<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| RuntimeError::configuration(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    /// Create a transport sharing an existing client.
    pub fn with_client(client: Client, config: RuntimeConfig) -> Self {
        Self { client, config }
    }

    /// Get the configuration.
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn open(&self, request: InvokeRequest) -> RuntimeResult<ByteStream> {
        let url = self.config.invocation_url()?;
        debug!(
            url = %url,
            runtime_session_id = %request.runtime_session_id,
            "Invoking agent runtime"
        );

        let mut builder = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "text/event-stream")
            .header(SESSION_HEADER, request.runtime_session_id.as_str());

        for (name, value) in &self.config.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let timeout = self.config.connect_timeout;
        let response = builder
            .json(&request.payload)
            .send()
            .await
            .map_err(|e| RuntimeError::from_reqwest(e, timeout))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RuntimeError::http(status.as_u16(), body));
        }

        let stream = response
            .bytes_stream()
            .map(move |chunk| chunk.map_err(|e| RuntimeError::from_reqwest(e, timeout)));
        Ok(Box::pin(stream))
    }
}
