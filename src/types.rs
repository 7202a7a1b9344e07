//! Wire types for the agent service.
//!
//! Field names match the service's JSON (snake_case). Optional fields are
//! skipped when `None` so requests stay minimal.

use std::fmt;
use std::io::Write;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{AgentClientError, AgentResult};

/// Initial state for state-based agents: string keys to arbitrary JSON values.
///
/// No schema is enforced locally; the service validates it.
pub type InitialState = Map<String, Value>;

/// Key under which the service returns the identifier of a started run.
pub const RUN_ID_KEY: &str = "run_id";

// ---------------------------------------------------------------------------
// Service metadata
// ---------------------------------------------------------------------------

/// Info about an available agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentInfo {
    /// Agent key, used in request paths.
    pub key: String,
    /// Description of the agent.
    #[serde(default)]
    pub description: String,
}

/// Metadata about the service: available agents and models.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceMetadata {
    /// Available agents.
    #[serde(default)]
    pub agents: Vec<AgentInfo>,
    /// Available LLMs.
    #[serde(default)]
    pub models: Vec<String>,
    /// Default agent used when none is specified.
    pub default_agent: String,
    /// Default model used when none is specified.
    #[serde(default)]
    pub default_model: String,
}

impl ServiceMetadata {
    /// Whether the service offers an agent with this key.
    pub fn has_agent(&self, key: &str) -> bool {
        self.agents.iter().any(|a| a.key == key)
    }

    /// Keys of all advertised agents.
    pub fn agent_keys(&self) -> Vec<String> {
        self.agents.iter().map(|a| a.key.clone()).collect()
    }
}

impl fmt::Display for ServiceMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "default agent: {}", self.default_agent)?;
        writeln!(f, "default model: {}", self.default_model)?;
        writeln!(f, "agents:")?;
        for agent in &self.agents {
            if agent.description.is_empty() {
                writeln!(f, "  - {}", agent.key)?;
            } else {
                writeln!(f, "  - {} ({})", agent.key, agent.description)?;
            }
        }
        write!(f, "models: {}", self.models.join(", "))
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Basic user input for the agent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserInput {
    /// User input to the agent. Required for chat-based agents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Initial state for state-based agents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<InitialState>,
    /// LLM model to use for the agent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Thread ID to persist and continue a multi-turn conversation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
}

impl UserInput {
    /// Input carrying a chat message.
    pub fn message(text: impl Into<String>) -> Self {
        Self {
            message: Some(text.into()),
            ..Self::default()
        }
    }

    /// Input carrying an initial state.
    pub fn state(state: InitialState) -> Self {
        Self {
            state: Some(state),
            ..Self::default()
        }
    }

    /// Set the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the thread ID.
    pub fn with_thread_id(mut self, thread_id: impl Into<String>) -> Self {
        self.thread_id = Some(thread_id.into());
        self
    }

    /// Set the chat message, keeping any state.
    pub fn with_message(mut self, text: impl Into<String>) -> Self {
        self.message = Some(text.into());
        self
    }
}

/// User input for streaming the agent's response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamInput {
    #[serde(flatten)]
    pub input: UserInput,
    /// Whether to stream LLM tokens to the client.
    #[serde(default = "default_stream_tokens")]
    pub stream_tokens: bool,
}

fn default_stream_tokens() -> bool {
    true
}

impl From<UserInput> for StreamInput {
    fn from(input: UserInput) -> Self {
        Self {
            input,
            stream_tokens: true,
        }
    }
}

/// Input for retrieving chat history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatHistoryInput {
    pub thread_id: String,
}

/// Feedback for a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    /// Run ID to record feedback for.
    pub run_id: String,
    /// Feedback key.
    pub key: String,
    /// Feedback score.
    pub score: f64,
    /// Additional feedback kwargs.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub kwargs: Map<String, Value>,
}

/// Response for feedback submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackResponse {
    pub status: String,
}

// ---------------------------------------------------------------------------
// Chat messages
// ---------------------------------------------------------------------------

/// Role of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Human,
    Ai,
    Tool,
    Custom,
}

impl MessageType {
    fn title(&self) -> &'static str {
        match self {
            MessageType::Human => "Human",
            MessageType::Ai => "Ai",
            MessageType::Tool => "Tool",
            MessageType::Custom => "Custom",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MessageType::Human => "human",
            MessageType::Ai => "ai",
            MessageType::Tool => "tool",
            MessageType::Custom => "custom",
        };
        write!(f, "{}", s)
    }
}

/// A request to call a tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// The name of the tool to be called.
    pub name: String,
    /// The arguments to the tool call.
    #[serde(default)]
    pub args: Map<String, Value>,
    /// An identifier associated with the tool call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub call_type: Option<String>,
}

/// Message in a chat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message.
    #[serde(rename = "type")]
    pub message_type: MessageType,
    /// Content of the message.
    pub content: String,
    /// Tool calls in the message.
    #[serde(default)]
    pub tool_calls: Vec<ToolCall>,
    /// Tool call that this message is responding to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    /// Run ID of the message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
    /// Response metadata, e.g. response headers, logprobs, token counts.
    #[serde(default)]
    pub response_metadata: Map<String, Value>,
    /// Custom message data.
    #[serde(default)]
    pub custom_data: Map<String, Value>,
}

impl ChatMessage {
    /// Create a message with no tool calls or metadata.
    pub fn new(message_type: MessageType, content: impl Into<String>) -> Self {
        Self {
            message_type,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
            run_id: None,
            response_metadata: Map::new(),
            custom_data: Map::new(),
        }
    }

    /// Render the message as an 80-column title bar followed by the content.
    ///
    /// ```
    /// use agent_run_client::types::{ChatMessage, MessageType};
    ///
    /// let repr = ChatMessage::new(MessageType::Ai, "hi").pretty_repr();
    /// assert_eq!(repr.lines().next().unwrap().len(), 80);
    /// assert!(repr.contains(" Ai Message "));
    /// assert!(repr.ends_with("\n\nhi"));
    /// ```
    pub fn pretty_repr(&self) -> String {
        let padded = format!(" {} Message ", self.message_type.title());
        let sep = "=".repeat(80usize.saturating_sub(padded.len()) / 2);
        let second_sep = if padded.len() % 2 == 1 {
            format!("{sep}=")
        } else {
            sep.clone()
        };
        let mut out = format!("{sep}{padded}{second_sep}\n\n{}", self.content);
        for call in &self.tool_calls {
            let args = serde_json::to_string(&call.args).unwrap_or_default();
            out.push_str(&format!("\nTool Call: {} {}", call.name, args));
        }
        out
    }

    /// Write [`pretty_repr`](Self::pretty_repr) plus a newline to `out`.
    pub fn write_pretty<W: Write + ?Sized>(&self, out: &mut W) -> std::io::Result<()> {
        writeln!(out, "{}", self.pretty_repr())
    }

    /// Print the message to stdout.
    pub fn pretty_print(&self) {
        println!("{}", self.pretty_repr());
    }
}

/// Chat history containing messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatHistory {
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}

// ---------------------------------------------------------------------------
// Runs
// ---------------------------------------------------------------------------

/// Identifier of a started run. Opaque to the client.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunHandle {
    pub run_id: String,
}

impl RunHandle {
    /// Extract the run identifier from a start-run response.
    ///
    /// The identifier must be present under [`RUN_ID_KEY`] as a string or an
    /// integer; anything else is an error rather than a default.
    pub fn from_response(response: &Value) -> AgentResult<Self> {
        let id = response
            .get(RUN_ID_KEY)
            .ok_or_else(|| AgentClientError::missing_field(RUN_ID_KEY, "start run response"))?;
        let run_id = match id {
            Value::String(s) if !s.is_empty() => s.clone(),
            Value::Number(n) if n.is_u64() || n.is_i64() => n.to_string(),
            other => {
                return Err(AgentClientError::InvalidJson(format!(
                    "'{RUN_ID_KEY}' must be a non-empty string, got {other}"
                )))
            }
        };
        Ok(Self { run_id })
    }
}

impl fmt::Display for RunHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.run_id)
    }
}

/// Lifecycle state reported for a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    Pending,
    Queued,
    Running,
    Completed,
    Failed,
    #[serde(alias = "canceled")]
    Cancelled,
    /// Any state string this client does not know.
    #[default]
    #[serde(other)]
    Unknown,
}

impl RunState {
    /// Whether the run has finished (successfully or not).
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunState::Completed | RunState::Failed | RunState::Cancelled
        )
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunState::Pending => "pending",
            RunState::Queued => "queued",
            RunState::Running => "running",
            RunState::Completed => "completed",
            RunState::Failed => "failed",
            RunState::Cancelled => "cancelled",
            RunState::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

/// Status of a run as reported by the service.
///
/// Only `status` is interpreted (by poll policies); everything else is kept
/// for display. Decoding never fails on an odd payload: a status that is not
/// a known string is [`RunState::Unknown`], and fields that do not fit their
/// typed slot (an unparseable timestamp, a non-string run id) stay
/// in `extra` as sent. Timestamps without an offset are read as UTC.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct RunStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
    pub status: RunState,
    /// Final agent response, present once the run completed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl From<Map<String, Value>> for RunStatus {
    fn from(mut map: Map<String, Value>) -> Self {
        let run_id = match map.remove("run_id") {
            Some(Value::String(s)) => Some(s),
            Some(Value::Number(n)) => Some(n.to_string()),
            Some(Value::Null) | None => None,
            Some(other) => {
                map.insert("run_id".to_string(), other);
                None
            }
        };
        let status = map
            .remove("status")
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default();
        let response = map.remove("response").filter(|v| !v.is_null());
        let error = map.remove("error").filter(|v| !v.is_null());
        let updated_at = match map.remove("updated_at") {
            Some(Value::String(s)) => match parse_timestamp(&s) {
                Some(at) => Some(at),
                None => {
                    map.insert("updated_at".to_string(), Value::String(s));
                    None
                }
            },
            Some(Value::Null) | None => None,
            Some(other) => {
                map.insert("updated_at".to_string(), other);
                None
            }
        };
        Self {
            run_id,
            status,
            response,
            error,
            updated_at,
            extra: map,
        }
    }
}

/// RFC 3339, or an offset-less ISO 8601 timestamp taken as UTC.
fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|at| at.with_timezone(&Utc))
        .ok()
        .or_else(|| s.parse::<NaiveDateTime>().ok().map(|at| at.and_utc()))
}

impl RunStatus {
    /// A bare status with the given state.
    pub fn new(status: RunState) -> Self {
        Self {
            run_id: None,
            status,
            response: None,
            error: None,
            updated_at: None,
            extra: Map::new(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(json) => write!(f, "{}", json),
            Err(_) => write!(f, "{}", self.status),
        }
    }
}

// ---------------------------------------------------------------------------
// Stream events
// ---------------------------------------------------------------------------

/// One unit of a streamed agent response.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// A text fragment (LLM token).
    Token(String),
    /// A complete chat message.
    Message(ChatMessage),
    /// A state-update mapping.
    StateUpdate(Map<String, Value>),
    /// A payload of any other shape.
    Unknown(Value),
}

impl StreamEvent {
    /// Decode one `data:` payload.
    ///
    /// Tagged objects (`{"type": ..., "content": ...}`) are dispatched on the
    /// tag; a bare string is a token; an untagged object is a state update.
    /// An `error` tag is returned as [`AgentClientError::Stream`]. Any other
    /// payload that does not fit its tag, such as a `message` whose content
    /// is not a chat message, decodes as [`StreamEvent::Unknown`].
    pub fn decode(value: Value) -> AgentResult<Self> {
        let tag = value
            .get("type")
            .and_then(Value::as_str)
            .map(str::to_owned);

        match (value, tag.as_deref()) {
            (Value::String(text), _) => Ok(StreamEvent::Token(text)),
            (value, Some("token")) => match value.get("content") {
                Some(Value::String(text)) => Ok(StreamEvent::Token(text.clone())),
                _ => Ok(StreamEvent::Unknown(value)),
            },
            (value, Some("message")) => match value.get("content") {
                Some(content) => match ChatMessage::deserialize(content) {
                    Ok(message) => Ok(StreamEvent::Message(message)),
                    Err(_) => Ok(StreamEvent::Unknown(value)),
                },
                None => Ok(StreamEvent::Unknown(value)),
            },
            (value, Some("update" | "state")) => match value.get("content") {
                Some(Value::Object(map)) => Ok(StreamEvent::StateUpdate(map.clone())),
                _ => Ok(StreamEvent::Unknown(value)),
            },
            (value, Some("error")) => {
                let message = match value.get("content") {
                    Some(Value::String(s)) => s.clone(),
                    Some(other) => other.to_string(),
                    None => "unknown error".to_string(),
                };
                Err(AgentClientError::Stream(message))
            }
            (value, Some("human" | "ai" | "tool" | "custom")) if value.get("content").is_some() => {
                match serde_json::from_value::<ChatMessage>(value.clone()) {
                    Ok(message) => Ok(StreamEvent::Message(message)),
                    Err(_) => Ok(StreamEvent::Unknown(value)),
                }
            }
            (Value::Object(map), None) => Ok(StreamEvent::StateUpdate(map)),
            (value, _) => Ok(StreamEvent::Unknown(value)),
        }
    }

    /// Short name of the event's shape, used in diagnostics.
    pub fn shape(&self) -> String {
        match self {
            StreamEvent::Token(_) => "token".to_string(),
            StreamEvent::Message(_) => "message".to_string(),
            StreamEvent::StateUpdate(_) => "state update".to_string(),
            StreamEvent::Unknown(value) => value_shape(value),
        }
    }
}

/// The `type` tag of an object, or the JSON kind of the value.
pub fn value_shape(value: &Value) -> String {
    if let Some(tag) = value.get("type").and_then(Value::as_str) {
        return tag.to_string();
    }
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn pretty_repr_pads_to_80_columns() {
        let msg = ChatMessage::new(MessageType::Human, "hello");
        let repr = msg.pretty_repr();
        let title = repr.lines().next().unwrap();
        assert_eq!(title.len(), 80);
        assert!(title.contains(" Human Message "));
        assert!(repr.ends_with("\n\nhello"));
    }

    #[test]
    fn pretty_repr_odd_padding_goes_right() {
        // " Tool Message " is 14 chars: 33 left, 33 right.
        // " Human Message " is 15 chars: 32 left, 33 right.
        let title = ChatMessage::new(MessageType::Human, "")
            .pretty_repr()
            .lines()
            .next()
            .unwrap()
            .to_string();
        let left = title.find(' ').unwrap();
        let right = title.len() - title.rfind(' ').unwrap() - 1;
        assert_eq!(left, 32);
        assert_eq!(right, 33);
    }

    #[test]
    fn chat_message_deserializes_with_defaults() {
        let msg: ChatMessage = serde_json::from_value(json!({
            "type": "ai",
            "content": "Done"
        }))
        .unwrap();
        assert_eq!(msg.message_type, MessageType::Ai);
        assert!(msg.tool_calls.is_empty());
        assert!(msg.custom_data.is_empty());
    }

    #[test]
    fn user_input_skips_unset_fields() {
        let input = UserInput::message("hi").with_thread_id("t-1");
        let value = serde_json::to_value(&input).unwrap();
        assert_eq!(value, json!({"message": "hi", "thread_id": "t-1"}));
    }

    #[test]
    fn stream_input_flattens_user_input() {
        let mut state = InitialState::new();
        state.insert("max_personas".into(), json!(2));
        let input = StreamInput::from(UserInput::state(state));
        let value = serde_json::to_value(&input).unwrap();
        assert_eq!(
            value,
            json!({"state": {"max_personas": 2}, "stream_tokens": true})
        );
    }

    #[test]
    fn run_handle_requires_run_id() {
        let err = RunHandle::from_response(&json!({"id": "abc"})).unwrap_err();
        assert!(matches!(err, AgentClientError::MissingField { ref field, .. } if field == "run_id"));
    }

    #[test]
    fn run_handle_accepts_string_and_integer_ids() {
        let handle = RunHandle::from_response(&json!({"run_id": "abc123"})).unwrap();
        assert_eq!(handle.run_id, "abc123");
        let handle = RunHandle::from_response(&json!({"run_id": 42})).unwrap();
        assert_eq!(handle.run_id, "42");
        assert!(RunHandle::from_response(&json!({"run_id": null})).is_err());
        assert!(RunHandle::from_response(&json!({"run_id": ""})).is_err());
    }

    #[test]
    fn run_state_parses_known_and_unknown_values() {
        let status: RunStatus = serde_json::from_value(json!({"status": "canceled"})).unwrap();
        assert_eq!(status.status, RunState::Cancelled);
        let status: RunStatus = serde_json::from_value(json!({"status": "thinking"})).unwrap();
        assert_eq!(status.status, RunState::Unknown);
        let status: RunStatus = serde_json::from_value(json!({"progress": 0.5})).unwrap();
        assert_eq!(status.status, RunState::Unknown);
        assert_eq!(status.extra.get("progress"), Some(&json!(0.5)));
    }

    #[test]
    fn terminal_states() {
        assert!(RunState::Completed.is_terminal());
        assert!(RunState::Failed.is_terminal());
        assert!(RunState::Cancelled.is_terminal());
        assert!(!RunState::Running.is_terminal());
        assert!(!RunState::Unknown.is_terminal());
    }

    #[test]
    fn decode_tagged_events() {
        assert_eq!(
            StreamEvent::decode(json!({"type": "token", "content": "He"})).unwrap(),
            StreamEvent::Token("He".into())
        );
        let event = StreamEvent::decode(json!({
            "type": "message",
            "content": {"type": "ai", "content": "Hello"}
        }))
        .unwrap();
        assert!(matches!(event, StreamEvent::Message(ref m) if m.content == "Hello"));
        let event =
            StreamEvent::decode(json!({"type": "update", "content": {"step": "research"}}))
                .unwrap();
        assert!(matches!(event, StreamEvent::StateUpdate(ref m) if m["step"] == "research"));
    }

    #[test]
    fn decode_untagged_values() {
        assert_eq!(
            StreamEvent::decode(json!("plain")).unwrap(),
            StreamEvent::Token("plain".into())
        );
        assert!(matches!(
            StreamEvent::decode(json!({"personas": []})).unwrap(),
            StreamEvent::StateUpdate(_)
        ));
        assert_eq!(
            StreamEvent::decode(json!(7)).unwrap(),
            StreamEvent::Unknown(json!(7))
        );
    }

    #[test]
    fn malformed_message_event_is_unknown() {
        let value = json!({"type": "message", "content": "plain text"});
        let event = StreamEvent::decode(value.clone()).unwrap();
        assert_eq!(event, StreamEvent::Unknown(value));
        assert_eq!(event.shape(), "message");

        let value = json!({"type": "message"});
        assert_eq!(
            StreamEvent::decode(value.clone()).unwrap(),
            StreamEvent::Unknown(value)
        );
    }

    #[test]
    fn run_status_accepts_naive_timestamp() {
        let status: RunStatus = serde_json::from_value(json!({
            "status": "running",
            "updated_at": "2024-05-01T12:00:00.123456"
        }))
        .unwrap();
        assert_eq!(status.status, RunState::Running);
        let at = status.updated_at.unwrap();
        assert_eq!(at.to_rfc3339(), "2024-05-01T12:00:00.123456+00:00");
        assert!(status.extra.is_empty());
    }

    #[test]
    fn run_status_keeps_odd_fields_instead_of_failing() {
        let status: RunStatus = serde_json::from_value(json!({
            "run_id": 9,
            "status": {"phase": "running"},
            "error": {"code": 3, "detail": "quota"},
            "updated_at": "yesterday"
        }))
        .unwrap();
        assert_eq!(status.run_id.as_deref(), Some("9"));
        assert_eq!(status.status, RunState::Unknown);
        assert_eq!(status.error, Some(json!({"code": 3, "detail": "quota"})));
        assert!(status.updated_at.is_none());
        assert_eq!(status.extra.get("updated_at"), Some(&json!("yesterday")));

        let printed: Value = serde_json::from_str(&status.to_string()).unwrap();
        assert_eq!(printed["updated_at"], "yesterday");
        assert_eq!(printed["error"]["detail"], "quota");
    }

    #[test]
    fn decode_error_event_is_an_error() {
        let err = StreamEvent::decode(json!({"type": "error", "content": "boom"})).unwrap_err();
        assert!(matches!(err, AgentClientError::Stream(ref m) if m == "boom"));
    }

    #[test]
    fn decode_unknown_tag_keeps_payload() {
        let event = StreamEvent::decode(json!({"type": "telemetry", "cpu": 3})).unwrap();
        assert_eq!(event.shape(), "telemetry");
        assert!(matches!(event, StreamEvent::Unknown(_)));
    }

    #[test]
    fn shape_names_json_kinds() {
        assert_eq!(value_shape(&json!([1, 2])), "array");
        assert_eq!(value_shape(&json!(null)), "null");
        assert_eq!(value_shape(&json!(true)), "bool");
    }
}
