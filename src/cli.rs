//! `agent-run` command-line interface.

use std::io;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use crate::blocking;
use crate::builders::AgentClientBuilder;
use crate::client::AgentClient;
use crate::config::Settings;
use crate::driver::{demonstration_state, BlockingRunDriver, RunDriver};
use crate::models::ModelName;
use crate::poll::{PollPolicy, DEMO_ATTEMPTS, DEMO_INTERVAL};
use crate::types::{InitialState, StreamInput, UserInput};

/// Initial wait of the default backoff policy, in seconds.
const BACKOFF_INITIAL_SECS: u64 = 2;
/// Default polling budget, in seconds.
const DEFAULT_MAX_ELAPSED_SECS: u64 = 600;

/// Drive an agent service: invoke, stream or start and poll a run.
#[derive(Parser, Debug)]
#[command(name = "agent-run", version, about = "Drive a remote agent service")]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Service base URL. Overrides AGENT_BASE_URL.
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Agent to address. Overrides AGENT_NAME.
    #[arg(long, global = true)]
    pub agent: Option<String>,

    /// Model to request. Overrides AGENT_MODEL.
    #[arg(long, global = true)]
    pub model: Option<String>,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the service info.
    Info,
    /// Send one message and print the reply.
    Invoke {
        /// Message content.
        message: String,
        /// Initial state as a JSON object.
        #[arg(long)]
        state: Option<String>,
        /// Thread to continue. A fresh one is generated if omitted.
        #[arg(long)]
        thread_id: Option<String>,
    },
    /// Stream a response and render events as they arrive.
    Stream(StreamArgs),
    /// Start a background run and poll its status.
    Run(RunArgs),
    /// Print the chat history of a thread.
    History {
        /// Thread identifier.
        thread_id: String,
    },
}

#[derive(Args, Debug)]
pub struct StreamArgs {
    /// Message content.
    #[arg(long)]
    pub message: Option<String>,
    /// Initial state as a JSON object. Defaults to the demonstration state.
    #[arg(long)]
    pub state: Option<String>,
    /// Only stream complete messages, not tokens.
    #[arg(long)]
    pub no_tokens: bool,
    /// Use the blocking client instead of the async one.
    #[arg(long)]
    pub blocking: bool,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Initial state as a JSON object. Defaults to the demonstration state.
    #[arg(long)]
    pub state: Option<String>,
    /// Poll exactly three times at a fixed interval, whatever the run reports.
    #[arg(long)]
    pub fixed: bool,
    /// Seconds between checks (fixed) or before the first check (backoff).
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: Option<u64>,
    /// Give up polling after this many seconds (backoff only).
    #[arg(long, default_value_t = DEFAULT_MAX_ELAPSED_SECS)]
    pub max_elapsed: u64,
}

impl RunArgs {
    /// The poll policy these flags select.
    pub fn policy(&self) -> PollPolicy {
        if self.fixed {
            let interval = self
                .interval
                .map(Duration::from_secs)
                .unwrap_or(DEMO_INTERVAL);
            PollPolicy::fixed(DEMO_ATTEMPTS, interval)
        } else {
            let initial = Duration::from_secs(self.interval.unwrap_or(BACKOFF_INITIAL_SECS));
            PollPolicy::backoff(initial, Duration::from_secs(self.max_elapsed))
        }
    }
}

impl StreamArgs {
    /// The stream request these flags select.
    pub fn input(&self) -> Result<StreamInput> {
        let mut input = UserInput::state(parse_state(self.state.as_deref())?);
        input.message = self.message.clone();
        Ok(StreamInput {
            input,
            stream_tokens: !self.no_tokens,
        })
    }
}

impl Cli {
    /// Settings from the environment (and `.env`), overridden by flags.
    pub fn settings(&self) -> Result<Settings> {
        let mut settings = Settings::from_env().context("failed to read settings")?;
        self.apply(&mut settings);
        if let Some(model) = settings.model.as_deref() {
            if model.parse::<ModelName>().is_err() {
                tracing::warn!(model, "model is not a known model name, sending it as is");
            }
        }
        Ok(settings)
    }

    fn apply(&self, settings: &mut Settings) {
        if let Some(url) = &self.base_url {
            *settings = std::mem::take(settings).with_base_url(url.clone());
        }
        if let Some(agent) = &self.agent {
            settings.agent = Some(agent.clone());
        }
        if let Some(model) = &self.model {
            settings.model = Some(model.clone());
        }
    }

    /// Run the selected command.
    ///
    /// The blocking stream runs on the blocking client's own runtime; every
    /// other command runs on a multi-threaded runtime built here.
    pub fn run(self) -> Result<()> {
        let settings = self.settings()?;
        tracing::debug!(base_url = %settings.base_url, "resolved settings");

        if let Command::Stream(args) = &self.command {
            if args.blocking {
                return stream_blocking(settings, args);
            }
        }

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .context("failed to start tokio runtime")?;
        runtime.block_on(self.command.run(settings))
    }
}

impl Command {
    async fn run(self, settings: Settings) -> Result<()> {
        let base_url = settings.base_url.clone();
        let client = AgentClientBuilder::from_settings(settings)
            .build()
            .await
            .with_context(|| format!("failed to connect to agent service at {base_url}"))?;

        match self {
            Command::Info => {
                let mut driver = RunDriver::new(&client, io::stdout());
                driver.print_info()?;
            }
            Command::Invoke {
                message,
                state,
                thread_id,
            } => invoke(&client, message, state, thread_id).await?,
            Command::Stream(args) => {
                let mut driver = RunDriver::new(&client, io::stdout());
                let summary = driver.stream(args.input()?).await.context("stream failed")?;
                println!();
                tracing::info!(?summary, "stream complete");
            }
            Command::Run(args) => {
                let state = parse_state(args.state.as_deref())?;
                let mut driver = RunDriver::new(&client, io::stdout());
                let outcome = driver
                    .start_run(state, &args.policy())
                    .await
                    .context("run failed")?;
                tracing::info!(run_id = %outcome.handle, checks = outcome.checks, "polling finished");
            }
            Command::History { thread_id } => {
                let history = client
                    .get_history(&thread_id)
                    .await
                    .with_context(|| format!("failed to fetch history of thread {thread_id}"))?;
                if history.messages.is_empty() {
                    println!("No messages.");
                }
                for message in &history.messages {
                    message.pretty_print();
                }
            }
        }
        Ok(())
    }
}

async fn invoke(
    client: &AgentClient,
    message: String,
    state: Option<String>,
    thread_id: Option<String>,
) -> Result<()> {
    let thread_id = thread_id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let mut input = UserInput::message(message).with_thread_id(thread_id.clone());
    if let Some(state) = state {
        input.state = Some(parse_state(Some(&state))?);
    }
    tracing::debug!(%thread_id, "invoking agent");
    let mut driver = RunDriver::new(client, io::stdout());
    driver.invoke(input).await.context("invoke failed")?;
    Ok(())
}

fn stream_blocking(settings: Settings, args: &StreamArgs) -> Result<()> {
    let base_url = settings.base_url.clone();
    let client = blocking::AgentClient::from_settings(settings)
        .with_context(|| format!("failed to connect to agent service at {base_url}"))?;
    let mut driver = BlockingRunDriver::new(&client, io::stdout());
    let summary = driver.stream(args.input()?).context("stream failed")?;
    println!();
    tracing::info!(?summary, "stream complete");
    Ok(())
}

/// Parse a `--state` flag; absent means the demonstration state.
pub fn parse_state(raw: Option<&str>) -> Result<InitialState> {
    match raw {
        None => Ok(demonstration_state()),
        Some(raw) => serde_json::from_str(raw)
            .with_context(|| format!("--state must be a JSON object, got {raw}")),
    }
}
