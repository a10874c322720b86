//! Repeating fetch loop
//!
//! A [`Poller`] runs fetch → wait → fetch cycles until its
//! [`CancellationToken`] is cancelled:
//!
//! ```text
//!   ┌──────── fetch ────────┐
//!   │                       ▼
//! sleep(delay) ◀── on_success / on_failure
//! ```
//!
//! The next sleep only starts after the previous fetch has been handled, so
//! a stream never has two requests in flight. The delay is the normal
//! interval unless the agent could not be reached at all, in which case it
//! is the backoff interval. An agent that answers with an error status is a
//! normal completion.
//!
//! Cancellation drops a pending sleep or an in-flight fetch; no callback
//! runs once the token is cancelled.

use std::{future::Future, time::Duration};

use syncpanel_core::ports::{AgentError, AgentResult};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

// ============================================================================
// PollSchedule
// ============================================================================

/// Delays between poll cycles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSchedule {
    /// Delay after a cycle that reached the agent
    pub interval: Duration,
    /// Delay after a connectivity failure
    pub backoff: Duration,
}

impl PollSchedule {
    pub fn new(interval: Duration, backoff: Duration) -> Self {
        Self { interval, backoff }
    }

    /// Delay before the cycle following `outcome`.
    pub fn next_delay<T>(&self, outcome: &AgentResult<T>) -> Duration {
        match outcome {
            Err(err) if err.is_connectivity() => self.backoff,
            _ => self.interval,
        }
    }
}

// ============================================================================
// PollHandle
// ============================================================================

/// Owner of a spawned poll loop
///
/// Dropping the handle cancels the loop.
#[derive(Debug)]
pub struct PollHandle {
    name: &'static str,
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl PollHandle {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Cancels the loop without waiting for it to exit.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Cancels the loop and waits for its task to exit.
    pub async fn stop(mut self) {
        self.token.cancel();
        if let Err(e) = (&mut self.task).await {
            if e.is_panic() {
                warn!(stream = self.name, "Poll task panicked");
            }
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

// ============================================================================
// Poller
// ============================================================================

/// A named, cancellable poll loop
#[derive(Debug, Clone)]
pub struct Poller {
    name: &'static str,
    schedule: PollSchedule,
    token: CancellationToken,
}

impl Poller {
    /// Creates a poller with its own cancellation token.
    pub fn new(name: &'static str, schedule: PollSchedule) -> Self {
        Self {
            name,
            schedule,
            token: CancellationToken::new(),
        }
    }

    /// Uses `token` instead, e.g. a child of a session-wide token.
    pub fn with_token(mut self, token: CancellationToken) -> Self {
        self.token = token;
        self
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Runs the loop on a new task.
    ///
    /// The first fetch starts immediately.
    pub fn spawn<T, F, Fut, S, E>(self, fetch: F, on_success: S, on_failure: E) -> PollHandle
    where
        T: Send + 'static,
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = AgentResult<T>> + Send + 'static,
        S: FnMut(T) + Send + 'static,
        E: FnMut(AgentError) + Send + 'static,
    {
        let name = self.name;
        let token = self.token.clone();
        let task = tokio::spawn(self.run(fetch, on_success, on_failure));
        PollHandle { name, token, task }
    }

    /// Runs the loop on the current task until cancelled.
    pub async fn run<T, F, Fut, S, E>(self, mut fetch: F, mut on_success: S, mut on_failure: E)
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = AgentResult<T>>,
        S: FnMut(T),
        E: FnMut(AgentError),
    {
        let Poller {
            name,
            schedule,
            token,
        } = self;

        info!(
            stream = name,
            interval_ms = schedule.interval.as_millis() as u64,
            backoff_ms = schedule.backoff.as_millis() as u64,
            "Poller started"
        );

        let mut cycles: u64 = 0;
        loop {
            let outcome = tokio::select! {
                biased;
                _ = token.cancelled() => break,
                outcome = fetch() => outcome,
            };
            if token.is_cancelled() {
                break;
            }
            cycles += 1;

            let delay = schedule.next_delay(&outcome);
            match outcome {
                Ok(value) => {
                    debug!(stream = name, cycle = cycles, "Poll succeeded");
                    on_success(value);
                }
                Err(err) if err.is_connectivity() => {
                    warn!(
                        stream = name,
                        cycle = cycles,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Agent unreachable, backing off"
                    );
                    on_failure(err);
                }
                Err(err) => {
                    debug!(stream = name, cycle = cycles, error = %err, "Agent returned an error");
                    on_failure(err);
                }
            }

            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }

        info!(stream = name, cycles, "Poller cancelled");
    }
}

// ============================================================================
// Unit tests
// ============================================================================
