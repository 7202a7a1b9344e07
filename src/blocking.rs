//! A blocking agent client.
//!
//! [`AgentClient`] wraps the async [`crate::client::AgentClient`] together
//! with a private current-thread tokio runtime and blocks on every call.
//! Streams are exposed as plain iterators.
//!
//! Do not use it from inside an async runtime: blocking on a runtime from
//! within another runtime panics.
//!
//! ```no_run
//! use agent_run_client::blocking::AgentClient;
//! use agent_run_client::types::{StreamEvent, UserInput};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = AgentClient::from_url("http://localhost:8123")?;
//! for event in client.stream(UserInput::message("hello").into())? {
//!     if let StreamEvent::Token(text) = event? {
//!         print!("{text}");
//!     }
//! }
//! # Ok(())
//! # }
//! ```

use serde_json::Value;
use tokio::runtime::Runtime;

use crate::api::{BlockingAgentApi, EventIter};
use crate::builders::AgentClientBuilder;
use crate::client::{self, SseStream};
use crate::config::Settings;
use crate::error::{AgentClientError, AgentResult};
use crate::types::{
    ChatHistory, ChatMessage, Feedback, FeedbackResponse, RunHandle, RunStatus, ServiceMetadata,
    StreamEvent, StreamInput, UserInput,
};

/// Blocking client for an agent service.
#[derive(Debug)]
pub struct AgentClient {
    inner: client::AgentClient,
    runtime: Runtime,
}

impl AgentClient {
    /// Create a client for a base URL and fetch the service info.
    pub fn from_url(url: &str) -> AgentResult<Self> {
        Self::from_builder(AgentClientBuilder::new(url))
    }

    /// Create a client from [`Settings`] and fetch the service info.
    pub fn from_settings(settings: Settings) -> AgentResult<Self> {
        Self::from_builder(AgentClientBuilder::from_settings(settings))
    }

    /// Build the async client on the private runtime, then fetch the service
    /// info.
    pub fn from_builder(builder: AgentClientBuilder) -> AgentResult<Self> {
        let runtime = new_runtime()?;
        let inner = runtime.block_on(builder.build())?;
        Ok(Self { inner, runtime })
    }

    /// Wrap an existing async client without contacting the service.
    pub fn from_client(inner: client::AgentClient) -> AgentResult<Self> {
        Ok(Self {
            inner,
            runtime: new_runtime()?,
        })
    }

    pub fn info(&self) -> Option<&ServiceMetadata> {
        self.inner.info()
    }

    pub fn agent(&self) -> Option<&str> {
        self.inner.agent()
    }

    pub fn retrieve_info(&mut self) -> AgentResult<&ServiceMetadata> {
        self.runtime.block_on(self.inner.retrieve_info())
    }

    pub fn update_agent(&mut self, agent: &str, verify: bool) -> AgentResult<()> {
        self.runtime.block_on(self.inner.update_agent(agent, verify))
    }

    pub fn invoke(&self, input: UserInput) -> AgentResult<ChatMessage> {
        self.runtime.block_on(self.inner.invoke(input))
    }

    /// Stream the agent's response as an iterator of events.
    pub fn stream(&self, input: StreamInput) -> AgentResult<BlockingEventStream<'_>> {
        let stream = self.runtime.block_on(self.inner.stream(input))?;
        Ok(BlockingEventStream {
            runtime: &self.runtime,
            stream,
        })
    }

    pub fn start_agent_run(&self, input: UserInput) -> AgentResult<Value> {
        self.runtime.block_on(self.inner.start_agent_run(input))
    }

    pub fn start_run(&self, input: UserInput) -> AgentResult<RunHandle> {
        self.runtime.block_on(self.inner.start_run(input))
    }

    pub fn get_run_status(&self, run_id: &str) -> AgentResult<RunStatus> {
        self.runtime.block_on(self.inner.get_run_status(run_id))
    }

    pub fn get_history(&self, thread_id: &str) -> AgentResult<ChatHistory> {
        self.runtime.block_on(self.inner.get_history(thread_id))
    }

    pub fn create_feedback(&self, feedback: Feedback) -> AgentResult<FeedbackResponse> {
        self.runtime.block_on(self.inner.create_feedback(feedback))
    }

    /// Unwrap the async client. The private runtime is dropped.
    pub fn into_inner(self) -> client::AgentClient {
        self.inner
    }
}

fn new_runtime() -> AgentResult<Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| AgentClientError::Io(format!("failed to start runtime: {e}")))
}

/// Iterator over a streamed response; each `next()` blocks until the next
/// event arrives.
pub struct BlockingEventStream<'a> {
    runtime: &'a Runtime,
    stream: SseStream,
}

impl std::fmt::Debug for BlockingEventStream<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockingEventStream").finish_non_exhaustive()
    }
}

impl Iterator for BlockingEventStream<'_> {
    type Item = AgentResult<StreamEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        self.runtime.block_on(self.stream.next())
    }
}

impl BlockingAgentApi for AgentClient {
    fn info(&self) -> Option<&ServiceMetadata> {
        AgentClient::info(self)
    }

    fn invoke(&self, input: UserInput) -> AgentResult<ChatMessage> {
        AgentClient::invoke(self, input)
    }

    fn stream(&self, input: StreamInput) -> AgentResult<EventIter<'_>> {
        Ok(Box::new(AgentClient::stream(self, input)?))
    }

    fn start_agent_run(&self, input: UserInput) -> AgentResult<Value> {
        AgentClient::start_agent_run(self, input)
    }

    fn get_run_status(&self, run_id: &str) -> AgentResult<RunStatus> {
        AgentClient::get_run_status(self, run_id)
    }
}
