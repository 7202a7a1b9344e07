//! Run status polling policies.
//!
//! [`PollPolicy::fixed`] reproduces a fixed demonstration schedule: a set
//! number of wait-then-check rounds, whatever the run reports.
//! [`PollPolicy::backoff`] waits with bounded exponential backoff, stops at
//! the first terminal status and gives up once its time budget is spent.
//!
//! The budget counts scheduled wait time, not request latency.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::{AgentClientError, AgentResult};
use crate::types::RunStatus;

/// Attempts of the demonstration schedule.
pub const DEMO_ATTEMPTS: u32 = 3;
/// Interval of the demonstration schedule.
pub const DEMO_INTERVAL: Duration = Duration::from_secs(30);

/// Shortest wait the backoff policy schedules.
pub const MIN_BACKOFF_DELAY: Duration = Duration::from_millis(1);

/// Bounded exponential backoff parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Backoff {
    /// Wait before the first status check. Raised to [`MIN_BACKOFF_DELAY`]
    /// when shorter.
    pub initial: Duration,
    /// Multiplier applied per check.
    pub factor: f64,
    /// Upper bound for a single wait.
    pub max_interval: Duration,
    /// Total wait time after which polling fails.
    pub max_elapsed: Duration,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            initial: Duration::from_secs(2),
            factor: 2.0,
            max_interval: Duration::from_secs(30),
            max_elapsed: Duration::from_secs(600),
        }
    }
}

impl Backoff {
    /// Wait before check number `attempt` (zero-based), before budget clamping.
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = if self.factor.is_nan() || self.factor < 1.0 {
            1.0
        } else {
            self.factor
        };
        let cap = self.max_interval.max(MIN_BACKOFF_DELAY);
        let initial = self.initial.max(MIN_BACKOFF_DELAY).min(cap);
        let exp = factor.powi(attempt.min(i32::MAX as u32) as i32);
        let millis = initial.as_millis() as f64 * exp;
        if !millis.is_finite() || millis >= cap.as_millis() as f64 {
            return cap;
        }
        Duration::from_millis(millis.round() as u64).max(MIN_BACKOFF_DELAY)
    }
}

/// How a run is polled.
#[derive(Debug, Clone, PartialEq)]
pub enum PollPolicy {
    /// Exactly `attempts` rounds of wait-then-check, ignoring run state.
    Fixed { attempts: u32, interval: Duration },
    /// Backoff until a terminal status or the budget runs out.
    Backoff(Backoff),
}

impl Default for PollPolicy {
    fn default() -> Self {
        PollPolicy::Backoff(Backoff::default())
    }
}

impl PollPolicy {
    pub fn fixed(attempts: u32, interval: Duration) -> Self {
        PollPolicy::Fixed { attempts, interval }
    }

    /// Three checks, thirty seconds apart.
    pub fn demonstration() -> Self {
        Self::fixed(DEMO_ATTEMPTS, DEMO_INTERVAL)
    }

    /// Backoff from `initial`, doubling, capped at 30s per wait, failing after
    /// `max_elapsed`.
    pub fn backoff(initial: Duration, max_elapsed: Duration) -> Self {
        PollPolicy::Backoff(Backoff {
            initial,
            max_elapsed,
            ..Backoff::default()
        })
    }

    /// Begin polling `run_id`.
    pub fn start(&self, run_id: impl Into<String>) -> PollState<'_> {
        PollState {
            policy: self,
            run_id: run_id.into(),
            checks: 0,
            waited: Duration::ZERO,
            finished: false,
        }
    }
}

/// Progress of one polling loop.
///
/// ```
/// use agent_run_client::poll::PollPolicy;
/// use agent_run_client::types::{RunState, RunStatus};
/// use std::time::Duration;
///
/// let policy = PollPolicy::fixed(2, Duration::from_secs(1));
/// let mut poll = policy.start("run-1");
/// while let Some(_wait) = poll.next_wait().unwrap() {
///     poll.observe(&RunStatus::new(RunState::Running));
/// }
/// assert_eq!(poll.checks(), 2);
/// ```
#[derive(Debug)]
pub struct PollState<'a> {
    policy: &'a PollPolicy,
    run_id: String,
    checks: u32,
    waited: Duration,
    finished: bool,
}

impl PollState<'_> {
    /// The wait before the next status check, or `None` when polling is over.
    ///
    /// Fails with [`AgentClientError::PollTimeout`] when a backoff policy has
    /// spent its budget without seeing a terminal status.
    pub fn next_wait(&mut self) -> AgentResult<Option<Duration>> {
        if self.finished {
            return Ok(None);
        }
        let wait = match self.policy {
            PollPolicy::Fixed { attempts, interval } => {
                if self.checks >= *attempts {
                    self.finished = true;
                    return Ok(None);
                }
                *interval
            }
            PollPolicy::Backoff(backoff) => {
                if self.waited >= backoff.max_elapsed {
                    self.finished = true;
                    return Err(AgentClientError::PollTimeout {
                        run_id: self.run_id.clone(),
                        elapsed: self.waited,
                    });
                }
                let remaining = backoff.max_elapsed - self.waited;
                backoff.delay(self.checks).min(remaining)
            }
        };
        self.waited += wait;
        Ok(Some(wait))
    }

    /// Record a status check. Returns `true` when polling is over.
    pub fn observe(&mut self, status: &RunStatus) -> bool {
        self.checks += 1;
        self.finished = match self.policy {
            PollPolicy::Fixed { attempts, .. } => self.checks >= *attempts,
            PollPolicy::Backoff(_) => status.is_terminal(),
        };
        self.finished
    }

    /// Status checks recorded so far.
    pub fn checks(&self) -> u32 {
        self.checks
    }

    /// Total scheduled wait time so far.
    pub fn waited(&self) -> Duration {
        self.waited
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }
}

/// Waits between status checks in cooperative mode.
#[async_trait]
pub trait Pacer: Send + Sync {
    async fn wait(&self, duration: Duration);
}

/// [`Pacer`] backed by `tokio::time::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioPacer;

#[async_trait]
impl Pacer for TokioPacer {
    async fn wait(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Waits between status checks in blocking mode.
pub trait BlockingPacer {
    fn wait(&self, duration: Duration);
}

/// [`BlockingPacer`] backed by `std::thread::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadPacer;

impl BlockingPacer for ThreadPacer {
    fn wait(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}
