//! Run drivers: one demonstration interaction against an agent service.
//!
//! [`RunDriver`] works over the async [`AgentApi`]; [`BlockingRunDriver`]
//! does the same over [`BlockingAgentApi`] without an async runtime of its
//! own. Both render through a [`Renderer`].

use std::io::Write;

use futures::StreamExt;
use serde_json::json;

use crate::api::{AgentApi, BlockingAgentApi};
use crate::error::AgentResult;
use crate::poll::{BlockingPacer, Pacer, PollPolicy, ThreadPacer, TokioPacer};
use crate::render::Renderer;
use crate::types::{InitialState, RunHandle, RunStatus, StreamEvent, StreamInput, UserInput};

/// Initial state used by the demonstration run and stream.
pub fn demonstration_state() -> InitialState {
    let mut state = InitialState::new();
    state.insert("appUrl".into(), json!("https://www.tvfoodmaps.com"));
    state.insert("competitor_hint".into(), json!("Flavortown USA"));
    state.insert("max_personas".into(), json!(2));
    state
}

/// Counts of rendered stream events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamSummary {
    pub tokens: usize,
    pub messages: usize,
    pub state_updates: usize,
    pub unknown: usize,
}

impl StreamSummary {
    fn record(&mut self, event: &StreamEvent) {
        match event {
            StreamEvent::Token(_) => self.tokens += 1,
            StreamEvent::Message(_) => self.messages += 1,
            StreamEvent::StateUpdate(_) => self.state_updates += 1,
            StreamEvent::Unknown(_) => self.unknown += 1,
        }
    }

    /// Total number of events seen.
    pub fn total(&self) -> usize {
        self.tokens + self.messages + self.state_updates + self.unknown
    }
}

/// Result of a polled run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    pub handle: RunHandle,
    /// Status from the final check, `None` if the policy never checked.
    pub last_status: Option<RunStatus>,
    pub checks: u32,
}

/// Drives the agent through the async client interface.
pub struct RunDriver<'a, A: AgentApi + ?Sized, W: Write> {
    client: &'a A,
    renderer: Renderer<W>,
    pacer: Box<dyn Pacer + 'a>,
}

impl<'a, A: AgentApi + ?Sized, W: Write> RunDriver<'a, A, W> {
    pub fn new(client: &'a A, out: W) -> Self {
        Self {
            client,
            renderer: Renderer::new(out),
            pacer: Box::new(TokioPacer),
        }
    }

    /// Replace how the driver waits between status checks.
    pub fn with_pacer(mut self, pacer: impl Pacer + 'a) -> Self {
        self.pacer = Box::new(pacer);
        self
    }

    /// Print the service info, if the client has retrieved it.
    pub fn print_info(&mut self) -> AgentResult<()> {
        if let Some(info) = self.client.info() {
            self.renderer.heading("Agent info:")?;
            self.renderer.info(info)?;
        }
        Ok(())
    }

    /// Single request, single reply; the reply is pretty-printed.
    pub async fn invoke(&mut self, input: UserInput) -> AgentResult<()> {
        let reply = self.client.invoke(input).await?;
        self.renderer.message(&reply)
    }

    /// Stream a response and render each event in arrival order.
    ///
    /// A server-reported error ends the stream and is returned; everything
    /// rendered before it stays on the console.
    pub async fn stream(&mut self, input: StreamInput) -> AgentResult<StreamSummary> {
        self.print_info()?;
        let mut events = self.client.stream(input).await?;
        let mut summary = StreamSummary::default();
        while let Some(event) = events.next().await {
            let event = event?;
            summary.record(&event);
            self.renderer.event(&event)?;
        }
        tracing::debug!(events = summary.total(), "stream finished");
        Ok(summary)
    }

    /// Start a background run, then poll its status under `policy`.
    pub async fn start_run(
        &mut self,
        state: InitialState,
        policy: &PollPolicy,
    ) -> AgentResult<RunOutcome> {
        let response = self.client.start_agent_run(UserInput::state(state)).await?;
        let handle = RunHandle::from_response(&response)?;
        tracing::info!(run_id = %handle, "run started");
        self.renderer.run_started(&handle)?;

        let mut poll = policy.start(handle.run_id.clone());
        let mut last_status = None;
        while let Some(wait) = poll.next_wait()? {
            self.pacer.wait(wait).await;
            let status = self.client.get_run_status(&handle.run_id).await?;
            let done = poll.observe(&status);
            self.renderer.status(poll.checks(), &status)?;
            last_status = Some(status);
            if done {
                break;
            }
        }

        Ok(RunOutcome {
            handle,
            last_status,
            checks: poll.checks(),
        })
    }

    pub fn into_output(self) -> W {
        self.renderer.into_inner()
    }
}

/// Drives the agent through the blocking client interface.
pub struct BlockingRunDriver<'a, A: BlockingAgentApi + ?Sized, W: Write> {
    client: &'a A,
    renderer: Renderer<W>,
    pacer: Box<dyn BlockingPacer + 'a>,
}

impl<'a, A: BlockingAgentApi + ?Sized, W: Write> BlockingRunDriver<'a, A, W> {
    pub fn new(client: &'a A, out: W) -> Self {
        Self {
            client,
            renderer: Renderer::new(out),
            pacer: Box::new(ThreadPacer),
        }
    }

    pub fn with_pacer(mut self, pacer: impl BlockingPacer + 'a) -> Self {
        self.pacer = Box::new(pacer);
        self
    }

    pub fn print_info(&mut self) -> AgentResult<()> {
        if let Some(info) = self.client.info() {
            self.renderer.heading("Agent info:")?;
            self.renderer.info(info)?;
        }
        Ok(())
    }

    pub fn invoke(&mut self, input: UserInput) -> AgentResult<()> {
        let reply = self.client.invoke(input)?;
        self.renderer.message(&reply)
    }

    pub fn stream(&mut self, input: StreamInput) -> AgentResult<StreamSummary> {
        self.print_info()?;
        let mut summary = StreamSummary::default();
        for event in self.client.stream(input)? {
            let event = event?;
            summary.record(&event);
            self.renderer.event(&event)?;
        }
        tracing::debug!(events = summary.total(), "stream finished");
        Ok(summary)
    }

    pub fn start_run(
        &mut self,
        state: InitialState,
        policy: &PollPolicy,
    ) -> AgentResult<RunOutcome> {
        let response = self.client.start_agent_run(UserInput::state(state))?;
        let handle = RunHandle::from_response(&response)?;
        tracing::info!(run_id = %handle, "run started");
        self.renderer.run_started(&handle)?;

        let mut poll = policy.start(handle.run_id.clone());
        let mut last_status = None;
        while let Some(wait) = poll.next_wait()? {
            self.pacer.wait(wait);
            let status = self.client.get_run_status(&handle.run_id)?;
            let done = poll.observe(&status);
            self.renderer.status(poll.checks(), &status)?;
            last_status = Some(status);
            if done {
                break;
            }
        }

        Ok(RunOutcome {
            handle,
            last_status,
            checks: poll.checks(),
        })
    }

    pub fn into_output(self) -> W {
        self.renderer.into_inner()
    }
}
