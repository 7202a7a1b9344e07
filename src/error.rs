//! Agent client error types.
//!
//! A single [`AgentClientError`] enum covers transport failures, HTTP status
//! errors, malformed payloads, agent selection problems and run polling
//! failures. Unknown stream payloads are *not* errors: they are surfaced as
//! [`StreamEvent::Unknown`](crate::types::StreamEvent::Unknown).

use std::time::Duration;

/// Unified error type for all agent client operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AgentClientError {
    /// Transport-level error (connection failed, request failed, etc.).
    #[error("Transport error: {0}")]
    Transport(String),

    /// Request timed out.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// HTTP error with status code and response body.
    #[error("HTTP {status}: {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body text.
        body: String,
    },

    /// Invalid JSON received from the service (parse or deserialization failure).
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    /// A response was well-formed JSON but lacked a required field.
    #[error("Missing field '{field}' in {context}")]
    MissingField {
        /// Name of the expected key.
        field: String,
        /// Where the key was expected (e.g. "start run response").
        context: String,
    },

    /// An agent-bound operation was called before an agent was selected.
    #[error("No agent selected. Call retrieve_info() or update_agent() first")]
    NoAgentSelected,

    /// The requested agent is not offered by the service.
    #[error("Agent {agent} not found in available agents: {}", available.join(", "))]
    AgentNotFound {
        /// The agent key that was requested.
        agent: String,
        /// Agent keys the service advertises.
        available: Vec<String>,
    },

    /// The service sent an `error` event on the stream.
    #[error("Stream error: {0}")]
    Stream(String),

    /// Run status polling exhausted its time budget without reaching a
    /// terminal state.
    #[error("Run {run_id} did not finish within {elapsed:?}")]
    PollTimeout {
        /// The run being polled.
        run_id: String,
        /// Time spent polling.
        elapsed: Duration,
    },

    /// Invalid configuration (bad URL, bad header value, bad env var).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Console or file I/O failure while rendering output.
    #[error("I/O error: {0}")]
    Io(String),
}

/// Convenience result type for agent client operations.
pub type AgentResult<T> = Result<T, AgentClientError>;

impl AgentClientError {
    /// Create a `MissingField` error.
    pub fn missing_field(field: impl Into<String>, context: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
            context: context.into(),
        }
    }

    /// Returns `true` for errors caused by the network or the remote service
    /// rather than by local misuse.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            AgentClientError::Transport(_)
                | AgentClientError::Timeout(_)
                | AgentClientError::Http { .. }
                | AgentClientError::Stream(_)
        )
    }

    /// HTTP status code, if this error carries one.
    pub fn status(&self) -> Option<u16> {
        match self {
            AgentClientError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for AgentClientError {
    fn from(err: serde_json::Error) -> Self {
        AgentClientError::InvalidJson(err.to_string())
    }
}

impl From<std::io::Error> for AgentClientError {
    fn from(err: std::io::Error) -> Self {
        AgentClientError::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agent_not_found_lists_available_agents() {
        let err = AgentClientError::AgentNotFound {
            agent: "planner".to_string(),
            available: vec!["chatbot".to_string(), "research".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Agent planner not found in available agents: chatbot, research"
        );
    }

    #[test]
    fn missing_field_names_key_and_context() {
        let err = AgentClientError::missing_field("run_id", "start run response");
        let msg = err.to_string();
        assert!(msg.contains("run_id"));
        assert!(msg.contains("start run response"));
    }

    #[test]
    fn remote_classification() {
        assert!(AgentClientError::Transport("refused".into()).is_remote());
        assert!(AgentClientError::Http {
            status: 502,
            body: String::new()
        }
        .is_remote());
        assert!(!AgentClientError::NoAgentSelected.is_remote());
        assert!(!AgentClientError::missing_field("run_id", "x").is_remote());
    }

    #[test]
    fn status_only_for_http_errors() {
        let err = AgentClientError::Http {
            status: 404,
            body: "Not Found".into(),
        };
        assert_eq!(err.status(), Some(404));
        assert_eq!(AgentClientError::Timeout("slow".into()).status(), None);
    }

    #[test]
    fn serde_error_maps_to_invalid_json() {
        let err: AgentClientError = serde_json::from_str::<serde_json::Value>("{oops")
            .unwrap_err()
            .into();
        assert!(matches!(err, AgentClientError::InvalidJson(_)));
    }
}
