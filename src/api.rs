//! The client interface consumed by the run drivers.
//!
//! [`AgentApi`] is implemented by the HTTP [`AgentClient`](crate::client::AgentClient)
//! and [`BlockingAgentApi`] by its [blocking](crate::blocking) wrapper. Tests
//! implement them with in-memory doubles.

use std::pin::Pin;

use async_trait::async_trait;
use futures::stream::Stream;
use serde_json::Value;

use crate::error::AgentResult;
use crate::types::{ChatMessage, RunStatus, ServiceMetadata, StreamEvent, StreamInput, UserInput};

/// A boxed stream of decoded events, consumed cooperatively.
pub type EventStream = Pin<Box<dyn Stream<Item = AgentResult<StreamEvent>> + Send>>;

/// A boxed iterator of decoded events, consumed by blocking the thread.
pub type EventIter<'a> = Box<dyn Iterator<Item = AgentResult<StreamEvent>> + 'a>;

/// Asynchronous agent service operations.
#[async_trait]
pub trait AgentApi: Send + Sync {
    /// Service metadata, if it has been retrieved.
    fn info(&self) -> Option<&ServiceMetadata>;

    /// Single request, single response.
    async fn invoke(&self, input: UserInput) -> AgentResult<ChatMessage>;

    /// Request a streamed response. The stream ends when the service signals
    /// end-of-sequence and cannot be restarted.
    async fn stream(&self, input: StreamInput) -> AgentResult<EventStream>;

    /// Start a background run. Returns the raw response mapping, which is
    /// expected to carry [`RUN_ID_KEY`](crate::types::RUN_ID_KEY).
    async fn start_agent_run(&self, input: UserInput) -> AgentResult<Value>;

    /// Query the status of a run.
    async fn get_run_status(&self, run_id: &str) -> AgentResult<RunStatus>;
}

/// Blocking counterpart of [`AgentApi`].
pub trait BlockingAgentApi {
    fn info(&self) -> Option<&ServiceMetadata>;

    fn invoke(&self, input: UserInput) -> AgentResult<ChatMessage>;

    fn stream(&self, input: StreamInput) -> AgentResult<EventIter<'_>>;

    fn start_agent_run(&self, input: UserInput) -> AgentResult<Value>;

    fn get_run_status(&self, run_id: &str) -> AgentResult<RunStatus>;
}
