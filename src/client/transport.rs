//! Transport layer for agent service communication.
//!
//! Provides the `Transport` trait for abstracting over how requests reach the
//! service, and `HttpTransport` for plain JSON over HTTP.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use serde_json::Value;

use crate::config::{Settings, DEFAULT_TIMEOUT_SECS};
use crate::error::{AgentClientError, AgentResult};

use super::sse::SseStream;

/// Transport abstraction for agent service requests.
///
/// Paths are relative to the service base URL and start with `/`.
#[async_trait]
pub trait Transport: Send + Sync {
    /// `GET` a path and parse the JSON response.
    async fn get(&self, path: &str) -> AgentResult<Value>;

    /// `POST` a JSON body and parse the JSON response.
    async fn post(&self, path: &str, body: &Value) -> AgentResult<Value>;

    /// `POST` a JSON body and receive a server-sent event stream.
    async fn post_stream(&self, path: &str, body: &Value) -> AgentResult<SseStream>;

    /// Close the transport and release any held resources.
    ///
    /// The default implementation is a no-op.
    async fn close(&self) -> AgentResult<()> {
        Ok(())
    }
}

/// Configuration for [`HttpTransport`].
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Timeout for connecting and for each JSON request. Streams are only
    /// bounded until their response headers arrive. Defaults to 60 seconds.
    pub timeout: Duration,
    /// Additional HTTP headers to include on every request.
    pub headers: HashMap<String, String>,
    /// Bearer token for the `Authorization` header.
    pub bearer_token: Option<String>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            headers: HashMap::new(),
            bearer_token: None,
        }
    }
}

impl From<&Settings> for TransportConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            timeout: settings.timeout,
            headers: HashMap::new(),
            bearer_token: settings.auth_secret.clone(),
        }
    }
}

/// JSON over HTTP transport using `reqwest`.
///
/// # Example
///
/// ```no_run
/// use agent_run_client::client::HttpTransport;
///
/// let transport = HttpTransport::new("http://localhost:8123").unwrap();
/// assert_eq!(transport.base_url(), "http://localhost:8123");
/// ```
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    timeout: Option<Duration>,
}

impl HttpTransport {
    /// Create a transport for the given base URL with default configuration.
    pub fn new(base_url: impl Into<String>) -> AgentResult<Self> {
        Self::with_config(base_url, TransportConfig::default())
    }

    /// Create a transport with custom configuration.
    ///
    /// Fails if a header name or value is not valid HTTP.
    pub fn with_config(base_url: impl Into<String>, config: TransportConfig) -> AgentResult<Self> {
        let mut default_headers = HeaderMap::new();
        for (key, value) in &config.headers {
            let name = HeaderName::from_bytes(key.as_bytes())
                .map_err(|e| AgentClientError::Config(format!("invalid header name '{key}': {e}")))?;
            let val = HeaderValue::from_str(value).map_err(|e| {
                AgentClientError::Config(format!("invalid value for header '{key}': {e}"))
            })?;
            default_headers.insert(name, val);
        }
        if let Some(token) = &config.bearer_token {
            let mut val = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| AgentClientError::Config(format!("invalid bearer token: {e}")))?;
            val.set_sensitive(true);
            default_headers.insert(AUTHORIZATION, val);
        }

        // No total timeout on the client: it would also cut off SSE bodies.
        let client = reqwest::Client::builder()
            .connect_timeout(config.timeout)
            .default_headers(default_headers)
            .build()
            .map_err(|e| AgentClientError::Config(format!("failed to build HTTP client: {e}")))?;

        let mut transport = Self::with_client(base_url, client);
        transport.timeout = Some(config.timeout);
        Ok(transport)
    }

    /// Create a transport with an existing `reqwest::Client`.
    ///
    /// No per-request timeout is applied beyond what the client carries.
    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: None,
        }
    }

    /// Timeout applied to JSON requests and to stream response headers.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Returns the base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, path: &str) -> AgentResult<Value> {
        let url = self.url(path);
        tracing::debug!("GET {}", url);

        let mut request = self.client.get(&url).header("Accept", "application/json");
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }
        let response = request
            .send()
            .await
            .map_err(|e| send_error(e, "request"))?;

        read_json(response).await
    }

    async fn post(&self, path: &str, body: &Value) -> AgentResult<Value> {
        let url = self.url(path);
        tracing::debug!("POST {}", url);

        let mut request = self.client.post(&url).json(body);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }
        let response = request
            .send()
            .await
            .map_err(|e| send_error(e, "request"))?;

        read_json(response).await
    }

    async fn post_stream(&self, path: &str, body: &Value) -> AgentResult<SseStream> {
        let url = self.url(path);
        tracing::debug!("POST {} (stream)", url);

        let send = self
            .client
            .post(&url)
            .header("Accept", "text/event-stream")
            .json(body)
            .send();
        let response = match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, send).await.map_err(|_| {
                AgentClientError::Timeout(format!(
                    "stream request timed out after {timeout:?} waiting for response headers"
                ))
            })?,
            None => send.await,
        }
        .map_err(|e| send_error(e, "stream request"))?;

        let response = check_status(response).await?;
        Ok(SseStream::from_response(response))
    }
}

fn send_error(e: reqwest::Error, what: &str) -> AgentClientError {
    if e.is_timeout() {
        AgentClientError::Timeout(format!("{what} timed out: {e}"))
    } else if e.is_connect() {
        AgentClientError::Transport(format!("{what} connection failed: {e}"))
    } else {
        AgentClientError::Transport(format!("{what} failed: {e}"))
    }
}

async fn check_status(response: reqwest::Response) -> AgentResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(AgentClientError::Http {
        status: status.as_u16(),
        body,
    })
}

async fn read_json(response: reqwest::Response) -> AgentResult<Value> {
    let response = check_status(response).await?;

    let bytes = response.bytes().await.map_err(|e| {
        if e.is_timeout() {
            AgentClientError::Timeout(format!("timed out reading response body: {e}"))
        } else {
            AgentClientError::Transport(format!("failed to read response body: {e}"))
        }
    })?;

    serde_json::from_slice(&bytes)
        .map_err(|e| AgentClientError::InvalidJson(format!("failed to parse response: {e}")))
}
