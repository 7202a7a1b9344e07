//! # agent-run-client: client and run driver for remote agent services
//!
//! This crate talks to an agent service over HTTP: it reads the service
//! info, invokes an agent for a single reply, streams replies as
//! Server-Sent Events (SSE), and starts background runs whose status it
//! polls.
//!
//! ## Overview
//!
//! - **Client** for the service endpoints ([`client::AgentClient`]), plus a
//!   [blocking](blocking::AgentClient) wrapper that exposes streams as
//!   iterators
//! - **Run drivers** ([`driver::RunDriver`], [`driver::BlockingRunDriver`])
//!   that render an interaction to a console
//! - **Poll policies** ([`poll::PollPolicy`]): a fixed demonstration
//!   schedule or bounded exponential backoff
//! - The `agent-run` binary
//!
//! ## Feature flags
//!
//! | Feature  | Default | Description |
//! |----------|---------|-------------|
//! | `client` | yes     | HTTP client (reqwest + SSE) and blocking wrapper |
//! | `cli`    | yes     | The `agent-run` binary |
//! | `full`   | no      | Enable all features |
//!
//! ## Quick Start
//!
//! ```no_run
//! use agent_run_client::client::AgentClient;
//! use agent_run_client::driver::{demonstration_state, RunDriver};
//! use agent_run_client::poll::PollPolicy;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = AgentClient::from_url("http://localhost:8123").await?;
//!
//!     let mut driver = RunDriver::new(&client, std::io::stdout());
//!     driver.print_info()?;
//!     let outcome = driver
//!         .start_run(demonstration_state(), &PollPolicy::default())
//!         .await?;
//!     println!("final status: {:?}", outcome.last_status);
//!     Ok(())
//! }
//! ```
//!
//! ## Wire contract
//!
//! - `GET /info`: service metadata
//! - `POST /{agent}/invoke`: single reply
//! - `POST /{agent}/stream`: SSE stream, ended by `data: [DONE]`
//! - `POST /{agent}/runs`: start a run, answers `{"run_id": ...}`
//! - `GET /{agent}/runs/{run_id}`: run status
//! - `POST /history`, `POST /feedback`

pub mod api;
pub mod config;
pub mod driver;
pub mod error;
pub mod models;
pub mod poll;
pub mod render;
pub mod types;

#[cfg(feature = "client")]
pub mod blocking;

#[cfg(feature = "client")]
pub mod builders;

#[cfg(feature = "client")]
pub mod client;

#[cfg(feature = "cli")]
pub mod cli;

/// Prelude module that re-exports commonly used types and traits.
///
/// ```
/// use agent_run_client::prelude::*;
///
/// let input = UserInput::message("hello");
/// assert!(input.state.is_none());
/// ```
pub mod prelude {
    pub use crate::api::{AgentApi, BlockingAgentApi};
    pub use crate::driver::{BlockingRunDriver, RunDriver};
    pub use crate::error::{AgentClientError, AgentResult};
    pub use crate::poll::PollPolicy;
    pub use crate::types::{
        ChatMessage, InitialState, MessageType, RunHandle, RunState, RunStatus, StreamEvent,
        StreamInput, UserInput,
    };

    #[cfg(feature = "client")]
    pub use crate::builders::AgentClientBuilder;

    #[cfg(feature = "client")]
    pub use crate::client::AgentClient;
}

// Re-export core types at crate root for convenience.
pub use config::Settings;
pub use error::{AgentClientError, AgentResult};
pub use types::*;

#[cfg(feature = "client")]
pub use builders::AgentClientBuilder;
