//! High-level client for a remote agent service.
//!
//! Provides typed methods for every service endpoint: service info, one-shot
//! invocation, SSE streaming, background runs, chat history and feedback.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::api::{AgentApi, EventStream};
use crate::builders::AgentClientBuilder;
use crate::config::Settings;
use crate::error::{AgentClientError, AgentResult};
use crate::types::{
    ChatHistory, ChatHistoryInput, ChatMessage, Feedback, FeedbackResponse, RunHandle, RunStatus,
    ServiceMetadata, StreamInput, UserInput,
};

use super::sse::SseStream;
use super::transport::{HttpTransport, Transport, TransportConfig};

/// Client for interacting with an agent service.
///
/// Agent-bound operations (`invoke`, `stream`, runs) are sent to the
/// currently selected agent. The agent is chosen by
/// [`retrieve_info()`](Self::retrieve_info) (service default) or
/// [`update_agent()`](Self::update_agent).
///
/// # Construction
///
/// ```no_run
/// use agent_run_client::client::AgentClient;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// // Fetches /info and selects the default agent:
/// let client = AgentClient::from_url("http://localhost:8123").await?;
/// println!("{}", client.info().unwrap());
///
/// // With custom transport:
/// use agent_run_client::client::HttpTransport;
/// let transport = HttpTransport::new("http://localhost:8123")?;
/// let client = AgentClient::with_transport(Box::new(transport));
/// # Ok(())
/// # }
/// ```
pub struct AgentClient {
    transport: Box<dyn Transport>,
    info: Option<ServiceMetadata>,
    agent: Option<String>,
    model: Option<String>,
}

impl std::fmt::Debug for AgentClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentClient")
            .field("agent", &self.agent)
            .field("model", &self.model)
            .field("info", &self.info)
            .finish_non_exhaustive()
    }
}

impl AgentClient {
    /// Create a client for a base URL and fetch the service info.
    ///
    /// Selects the service's default agent.
    pub async fn from_url(url: &str) -> AgentResult<Self> {
        AgentClientBuilder::new(url).build().await
    }

    /// Create a client for a base URL without contacting the service.
    ///
    /// An agent must be selected with [`update_agent()`](Self::update_agent)
    /// (or [`retrieve_info()`](Self::retrieve_info)) before agent-bound calls.
    pub fn from_endpoint(url: &str) -> AgentResult<Self> {
        Ok(Self::with_transport(Box::new(HttpTransport::new(url)?)))
    }

    /// Create a client from [`Settings`] without contacting the service.
    pub fn from_settings(settings: &Settings) -> AgentResult<Self> {
        settings.validate()?;
        let transport =
            HttpTransport::with_config(&settings.base_url, TransportConfig::from(settings))?;
        let mut client = Self::with_transport(Box::new(transport));
        client.agent = settings.agent.clone();
        client.model = settings.model.clone();
        Ok(client)
    }

    /// Create a builder.
    pub fn builder(url: impl Into<String>) -> AgentClientBuilder {
        AgentClientBuilder::new(url)
    }

    /// Create a client with a custom transport.
    pub fn with_transport(transport: Box<dyn Transport>) -> Self {
        Self {
            transport,
            info: None,
            agent: None,
            model: None,
        }
    }

    /// Service metadata, if retrieved.
    pub fn info(&self) -> Option<&ServiceMetadata> {
        self.info.as_ref()
    }

    /// The currently selected agent.
    pub fn agent(&self) -> Option<&str> {
        self.agent.as_deref()
    }

    /// The model requested when an input does not name one.
    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    /// Set the model requested when an input does not name one.
    pub fn set_model(&mut self, model: Option<String>) {
        self.model = model;
    }

    /// Select an agent without verifying it (used by the builder).
    pub(crate) fn set_agent_unchecked(&mut self, agent: Option<String>) {
        self.agent = agent;
    }

    // ──────────────────────────────────────────────────
    // Service endpoints
    // ──────────────────────────────────────────────────

    /// Fetch service metadata (`GET /info`).
    ///
    /// If no agent is selected, or the selected agent is not offered by the
    /// service, the service's default agent is selected.
    pub async fn retrieve_info(&mut self) -> AgentResult<&ServiceMetadata> {
        let value = self.transport.get("/info").await?;
        let info: ServiceMetadata = from_value(value, "service info")?;

        let keep_current = matches!(self.agent.as_deref(), Some(agent) if info.has_agent(agent));
        if !keep_current {
            match &self.agent {
                Some(agent) => tracing::warn!(
                    "agent '{}' not offered by service, using default '{}'",
                    agent,
                    info.default_agent
                ),
                None => tracing::debug!("using default agent '{}'", info.default_agent),
            }
            self.agent = Some(info.default_agent.clone());
        }

        Ok(self.info.insert(info))
    }

    /// Select the agent for subsequent calls.
    ///
    /// With `verify`, the agent must be listed in the service info (fetched
    /// first if needed); otherwise [`AgentClientError::AgentNotFound`].
    pub async fn update_agent(&mut self, agent: &str, verify: bool) -> AgentResult<()> {
        if verify {
            if self.info.is_none() {
                self.retrieve_info().await?;
            }
            let info = self.info.as_ref().ok_or(AgentClientError::NoAgentSelected)?;
            if !info.has_agent(agent) {
                return Err(AgentClientError::AgentNotFound {
                    agent: agent.to_string(),
                    available: info.agent_keys(),
                });
            }
        }
        self.agent = Some(agent.to_string());
        Ok(())
    }

    /// Invoke the agent and wait for the final message (`POST /{agent}/invoke`).
    pub async fn invoke(&self, input: UserInput) -> AgentResult<ChatMessage> {
        let path = format!("/{}/invoke", self.require_agent()?);
        let body = to_value(&self.with_default_model(input))?;
        let value = self.transport.post(&path, &body).await?;
        from_value(value, "invoke response")
    }

    /// Convenience: invoke with a text message.
    pub async fn invoke_text(&self, text: &str) -> AgentResult<ChatMessage> {
        self.invoke(UserInput::message(text)).await
    }

    /// Stream the agent's response (`POST /{agent}/stream`).
    pub async fn stream(&self, input: StreamInput) -> AgentResult<SseStream> {
        let path = format!("/{}/stream", self.require_agent()?);
        let input = StreamInput {
            input: self.with_default_model(input.input),
            stream_tokens: input.stream_tokens,
        };
        let body = to_value(&input)?;
        self.transport.post_stream(&path, &body).await
    }

    /// Start a background run (`POST /{agent}/runs`).
    ///
    /// Returns the raw response mapping; see [`start_run()`](Self::start_run)
    /// for the extracted handle.
    pub async fn start_agent_run(&self, input: UserInput) -> AgentResult<Value> {
        let path = format!("/{}/runs", self.require_agent()?);
        let body = to_value(&self.with_default_model(input))?;
        self.transport.post(&path, &body).await
    }

    /// Start a background run and extract its [`RunHandle`].
    pub async fn start_run(&self, input: UserInput) -> AgentResult<RunHandle> {
        let response = self.start_agent_run(input).await?;
        RunHandle::from_response(&response)
    }

    /// Get the status of a run (`GET /{agent}/runs/{run_id}`).
    pub async fn get_run_status(&self, run_id: &str) -> AgentResult<RunStatus> {
        let path = format!("/{}/runs/{}", self.require_agent()?, run_id);
        let value = self.transport.get(&path).await?;
        from_value(value, "run status")
    }

    /// Get the chat history of a thread (`POST /history`).
    pub async fn get_history(&self, thread_id: &str) -> AgentResult<ChatHistory> {
        let body = to_value(&ChatHistoryInput {
            thread_id: thread_id.to_string(),
        })?;
        let value = self.transport.post("/history", &body).await?;
        from_value(value, "chat history")
    }

    /// Record feedback for a run (`POST /feedback`).
    pub async fn create_feedback(&self, feedback: Feedback) -> AgentResult<FeedbackResponse> {
        let body = to_value(&feedback)?;
        let value = self.transport.post("/feedback", &body).await?;
        from_value(value, "feedback response")
    }

    /// Close the client and release any held resources.
    pub async fn close(self) -> AgentResult<()> {
        self.transport.close().await
    }

    // ──────────────────────────────────────────────────
    // Internal helpers
    // ──────────────────────────────────────────────────

    fn require_agent(&self) -> AgentResult<&str> {
        self.agent.as_deref().ok_or(AgentClientError::NoAgentSelected)
    }

    fn with_default_model(&self, mut input: UserInput) -> UserInput {
        if input.model.is_none() {
            input.model = self.model.clone();
        }
        input
    }
}

#[async_trait]
impl AgentApi for AgentClient {
    fn info(&self) -> Option<&ServiceMetadata> {
        AgentClient::info(self)
    }

    async fn invoke(&self, input: UserInput) -> AgentResult<ChatMessage> {
        AgentClient::invoke(self, input).await
    }

    async fn stream(&self, input: StreamInput) -> AgentResult<EventStream> {
        let stream = AgentClient::stream(self, input).await?;
        Ok(Box::pin(stream.into_stream()))
    }

    async fn start_agent_run(&self, input: UserInput) -> AgentResult<Value> {
        AgentClient::start_agent_run(self, input).await
    }

    async fn get_run_status(&self, run_id: &str) -> AgentResult<RunStatus> {
        AgentClient::get_run_status(self, run_id).await
    }
}

fn to_value(body: &impl Serialize) -> AgentResult<Value> {
    serde_json::to_value(body)
        .map_err(|e| AgentClientError::Transport(format!("failed to serialize request: {e}")))
}

fn from_value<T: DeserializeOwned>(value: Value, what: &str) -> AgentResult<T> {
    serde_json::from_value(value)
        .map_err(|e| AgentClientError::InvalidJson(format!("failed to deserialize {what}: {e}")))
}
