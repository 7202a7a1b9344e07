//! In-memory test doubles for the client interfaces the drivers consume.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use agent_run_client::api::{AgentApi, BlockingAgentApi, EventIter, EventStream};
use agent_run_client::error::AgentResult;
use agent_run_client::poll::{BlockingPacer, Pacer};
use agent_run_client::types::{
    ChatMessage, MessageType, RunState, RunStatus, ServiceMetadata, StreamEvent, StreamInput,
    UserInput,
};
use async_trait::async_trait;
use serde_json::{json, Value};

/// Shared, ordered record of waits and status checks.
pub type CallLog = Arc<Mutex<Vec<String>>>;

/// An agent that replays scripted responses and logs what it was asked.
pub struct ScriptedAgent {
    pub info: Option<ServiceMetadata>,
    pub events: Vec<AgentResult<StreamEvent>>,
    pub start_response: Value,
    /// Status reported per check; the last entry repeats.
    pub statuses: Vec<RunState>,
    pub log: CallLog,
    pub last_input: Mutex<Option<UserInput>>,
}

impl ScriptedAgent {
    pub fn new(log: CallLog) -> Self {
        Self {
            info: None,
            events: Vec::new(),
            start_response: json!({"run_id": "abc123"}),
            statuses: vec![RunState::Running],
            log,
            last_input: Mutex::new(None),
        }
    }

    pub fn with_events(mut self, events: Vec<AgentResult<StreamEvent>>) -> Self {
        self.events = events;
        self
    }

    fn status_for(&self, run_id: &str) -> RunStatus {
        let mut log = self.log.lock().unwrap();
        let checks = log.iter().filter(|l| l.starts_with("status")).count();
        log.push(format!("status {run_id}"));
        let state = self
            .statuses
            .get(checks)
            .or(self.statuses.last())
            .copied()
            .unwrap_or_default();
        let mut status = RunStatus::new(state);
        status.run_id = Some(run_id.to_string());
        status
    }

    fn reply(&self, input: UserInput) -> ChatMessage {
        let text = input.message.clone().unwrap_or_default();
        *self.last_input.lock().unwrap() = Some(input);
        ChatMessage::new(MessageType::Ai, format!("echo: {text}"))
    }

    fn start(&self, input: UserInput) -> Value {
        *self.last_input.lock().unwrap() = Some(input);
        self.start_response.clone()
    }
}

#[async_trait]
impl AgentApi for ScriptedAgent {
    fn info(&self) -> Option<&ServiceMetadata> {
        self.info.as_ref()
    }

    async fn invoke(&self, input: UserInput) -> AgentResult<ChatMessage> {
        Ok(self.reply(input))
    }

    async fn stream(&self, input: StreamInput) -> AgentResult<EventStream> {
        *self.last_input.lock().unwrap() = Some(input.input);
        Ok(Box::pin(futures::stream::iter(self.events.clone())))
    }

    async fn start_agent_run(&self, input: UserInput) -> AgentResult<Value> {
        Ok(self.start(input))
    }

    async fn get_run_status(&self, run_id: &str) -> AgentResult<RunStatus> {
        Ok(self.status_for(run_id))
    }
}

impl BlockingAgentApi for ScriptedAgent {
    fn info(&self) -> Option<&ServiceMetadata> {
        self.info.as_ref()
    }

    fn invoke(&self, input: UserInput) -> AgentResult<ChatMessage> {
        Ok(self.reply(input))
    }

    fn stream(&self, input: StreamInput) -> AgentResult<EventIter<'_>> {
        *self.last_input.lock().unwrap() = Some(input.input);
        Ok(Box::new(self.events.clone().into_iter()))
    }

    fn start_agent_run(&self, input: UserInput) -> AgentResult<Value> {
        Ok(self.start(input))
    }

    fn get_run_status(&self, run_id: &str) -> AgentResult<RunStatus> {
        Ok(self.status_for(run_id))
    }
}

/// Records waits in the call log instead of sleeping.
#[derive(Clone)]
pub struct RecordingPacer {
    pub log: CallLog,
}

impl RecordingPacer {
    fn record(&self, duration: Duration) {
        self.log
            .lock()
            .unwrap()
            .push(format!("wait {}ms", duration.as_millis()));
    }
}

#[async_trait]
impl Pacer for RecordingPacer {
    async fn wait(&self, duration: Duration) {
        self.record(duration);
    }
}

impl BlockingPacer for RecordingPacer {
    fn wait(&self, duration: Duration) {
        self.record(duration);
    }
}

pub fn new_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn output_text(bytes: Vec<u8>) -> String {
    String::from_utf8(bytes).unwrap()
}
