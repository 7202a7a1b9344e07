//! Agent service client.
//!
//! - [`AgentClient`]: high-level client with typed methods for every
//!   service endpoint (info, invoke, stream, runs, history, feedback)
//! - [`Transport`] / [`HttpTransport`]: pluggable transport layer
//! - [`SseStream`]: decoded SSE event stream for streamed responses
//!
//! # Quick Start
//!
//! ```no_run
//! use agent_run_client::client::AgentClient;
//! use agent_run_client::types::{StreamEvent, UserInput};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = AgentClient::from_url("http://localhost:8123").await?;
//!
//! let reply = client.invoke_text("Plan a launch tweet").await?;
//! reply.pretty_print();
//!
//! let mut stream = client.stream(UserInput::message("Write a haiku").into()).await?;
//! while let Some(event) = stream.next().await {
//!     if let StreamEvent::Token(text) = event? {
//!         print!("{text}");
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod agent_client;
mod sse;
mod transport;

pub use agent_client::AgentClient;
pub use sse::{SseStream, SseStreamAdapter};
pub use transport::{HttpTransport, Transport, TransportConfig};
