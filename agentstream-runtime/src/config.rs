//! Runtime client configuration.

use crate::error::{RuntimeError, RuntimeResult};
use std::time::Duration;
use url::{form_urlencoded, Url};

/// Default AWS region.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Default endpoint qualifier.
pub const DEFAULT_QUALIFIER: &str = "DEFAULT";

/// Header carrying the runtime session id.
pub const SESSION_HEADER: &str = "X-Amzn-Bedrock-AgentCore-Runtime-Session-Id";

/// Configuration for reaching one agent runtime.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Service endpoint, without the `/runtimes/...` path.
    pub endpoint: Url,
    /// ARN of the agent runtime.
    pub runtime_arn: String,
    /// Endpoint qualifier.
    pub qualifier: String,
    /// Timeout for establishing the connection.
    pub connect_timeout: Duration,
    /// Longest wait for the next response chunk.
    pub idle_timeout: Option<Duration>,
    /// Extra headers sent with every request.
    pub headers: Vec<(String, String)>,
}

impl RuntimeConfig {
    /// Create a configuration for a runtime in the given region.
    pub fn new(runtime_arn: impl Into<String>, region: &str) -> RuntimeResult<Self> {
        Ok(Self {
            endpoint: regional_endpoint(region)?,
            runtime_arn: runtime_arn.into(),
            qualifier: DEFAULT_QUALIFIER.to_string(),
            connect_timeout: Duration::from_secs(10),
            idle_timeout: Some(Duration::from_secs(120)),
            headers: Vec::new(),
        })
    }

    /// Load from environment variables.
    ///
    /// - `AGENTCORE_RUNTIME_ARN` (required)
    /// - `AWS_REGION` or `AWS_DEFAULT_REGION` (default `us-east-1`)
    /// - `AGENTCORE_ENDPOINT` overrides the regional endpoint
    /// - `AGENTCORE_QUALIFIER` (default `DEFAULT`)
    pub fn from_env() -> RuntimeResult<Self> {
        let runtime_arn = std::env::var("AGENTCORE_RUNTIME_ARN")
            .map_err(|_| RuntimeError::configuration("AGENTCORE_RUNTIME_ARN not set"))?;
        let region = std::env::var("AWS_REGION")
            .or_else(|_| std::env::var("AWS_DEFAULT_REGION"))
            .unwrap_or_else(|_| DEFAULT_REGION.to_string());

        let mut config = Self::new(runtime_arn, &region)?;
        if let Ok(endpoint) = std::env::var("AGENTCORE_ENDPOINT") {
            config = config.with_endpoint(&endpoint)?;
        }
        if let Ok(qualifier) = std::env::var("AGENTCORE_QUALIFIER") {
            config = config.with_qualifier(qualifier);
        }
        Ok(config)
    }

    /// Override the endpoint.
    pub fn with_endpoint(mut self, endpoint: &str) -> RuntimeResult<Self> {
        self.endpoint = Url::parse(endpoint)
            .map_err(|e| RuntimeError::configuration(format!("invalid endpoint {endpoint}: {e}")))?;
        Ok(self)
    }

    /// Set the qualifier.
    #[must_use]
    pub fn with_qualifier(mut self, qualifier: impl Into<String>) -> Self {
        self.qualifier = qualifier.into();
        self
    }

    /// Set the connect timeout.
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the idle timeout, or disable it with `None`.
    #[must_use]
    pub fn with_idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Add a header sent with every request.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Build the invocation URL.
    ///
    /// The ARN is encoded as a single path segment, `:` and `/` included.
    pub fn invocation_url(&self) -> RuntimeResult<Url> {
        let arn: String = form_urlencoded::byte_serialize(self.runtime_arn.as_bytes()).collect();
        let raw = format!(
            "{}/runtimes/{}/invocations",
            self.endpoint.as_str().trim_end_matches('/'),
            arn
        );

        let mut url = Url::parse(&raw)
            .map_err(|e| RuntimeError::configuration(format!("invalid invocation url: {e}")))?;
        url.query_pairs_mut().append_pair("qualifier", &self.qualifier);
        Ok(url)
    }
}

fn regional_endpoint(region: &str) -> RuntimeResult<Url> {
    let raw = format!("https://bedrock-agentcore.{region}.amazonaws.com");
    Url::parse(&raw).map_err(|e| RuntimeError::configuration(format!("invalid region {region}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const ARN: &str = "arn:aws:bedrock-agentcore:us-west-2:123456789012:runtime/staff_agent-abc";

    #[test]
    fn test_regional_endpoint() {
        let config = RuntimeConfig::new(ARN, "us-west-2").unwrap();
        assert_eq!(
            config.endpoint.as_str(),
            "https://bedrock-agentcore.us-west-2.amazonaws.com/"
        );
        assert_eq!(config.qualifier, "DEFAULT");
        assert_eq!(config.idle_timeout, Some(Duration::from_secs(120)));
    }

    #[test]
    fn test_invocation_url_encodes_arn() {
        let config = RuntimeConfig::new(ARN, "us-west-2").unwrap();
        assert_eq!(
            config.invocation_url().unwrap().as_str(),
            "https://bedrock-agentcore.us-west-2.amazonaws.com/runtimes/\
             arn%3Aaws%3Abedrock-agentcore%3Aus-west-2%3A123456789012%3Aruntime%2Fstaff_agent-abc\
             /invocations?qualifier=DEFAULT"
        );
    }

    #[test]
    fn test_endpoint_override() {
        let config = RuntimeConfig::new("arn", DEFAULT_REGION)
            .unwrap()
            .with_endpoint("http://127.0.0.1:9000/")
            .unwrap()
            .with_qualifier("prod")
            .with_header("x-tenant", "demo");

        assert_eq!(
            config.invocation_url().unwrap().as_str(),
            "http://127.0.0.1:9000/runtimes/arn/invocations?qualifier=prod"
        );
        assert_eq!(config.headers, vec![("x-tenant".to_string(), "demo".to_string())]);
    }

    #[test]
    fn test_invalid_endpoint() {
        let err = RuntimeConfig::new("arn", DEFAULT_REGION)
            .unwrap()
            .with_endpoint("not a url")
            .unwrap_err();
        assert!(matches!(err, RuntimeError::Configuration(_)));
    }
}
