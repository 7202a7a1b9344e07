//! Console rendering for driver output.
//!
//! All rendered output goes to the wrapped writer (stdout in the binary).
//! Diagnostics about odd payloads are also logged through `tracing`.

use std::io::Write;

use crate::error::AgentResult;
use crate::types::{ChatMessage, RunHandle, RunStatus, ServiceMetadata, StreamEvent};

/// Writes stream events, run ids and status lines to a console.
#[derive(Debug)]
pub struct Renderer<W: Write> {
    out: W,
}

impl<W: Write> Renderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Render one stream event.
    ///
    /// Tokens are written without a newline and flushed, so fragments appear
    /// as they arrive. Unknown shapes produce a diagnostic line and do not
    /// stop the stream.
    pub fn event(&mut self, event: &StreamEvent) -> AgentResult<()> {
        match event {
            StreamEvent::Token(text) => {
                write!(self.out, "{text}")?;
                self.out.flush()?;
            }
            StreamEvent::Message(message) => {
                writeln!(self.out)?;
                self.message(message)?;
            }
            StreamEvent::StateUpdate(state) => {
                let json = serde_json::to_string(state)?;
                writeln!(self.out, "State update: {json}")?;
            }
            StreamEvent::Unknown(value) => {
                let shape = event.shape();
                tracing::warn!(shape = %shape, payload = %value, "unexpected stream event");
                writeln!(self.out, "ERROR: Unknown type - {shape}")?;
            }
        }
        Ok(())
    }

    /// Render a chat message in its pretty form.
    pub fn message(&mut self, message: &ChatMessage) -> AgentResult<()> {
        message.write_pretty(&mut self.out)?;
        Ok(())
    }

    /// A plain line of text.
    pub fn heading(&mut self, text: &str) -> AgentResult<()> {
        writeln!(self.out, "{text}")?;
        Ok(())
    }

    /// Render the service metadata.
    pub fn info(&mut self, info: &ServiceMetadata) -> AgentResult<()> {
        writeln!(self.out, "{info}")?;
        Ok(())
    }

    pub fn run_started(&mut self, handle: &RunHandle) -> AgentResult<()> {
        writeln!(self.out, "Run ID: {handle}")?;
        Ok(())
    }

    /// Render the status line of check number `attempt` (one-based):
    /// `Status: ...`, `Status2: ...`, `Status3: ...`.
    pub fn status(&mut self, attempt: u32, status: &RunStatus) -> AgentResult<()> {
        writeln!(self.out, "{}: {status}", status_label(attempt))?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

fn status_label(attempt: u32) -> String {
    if attempt <= 1 {
        "Status".to_string()
    } else {
        format!("Status{attempt}")
    }
}
