//! Action poller: waits for an asynchronous provider action to finish.
//!
//! The loop sleeps one interval, then re-reads the action. It stops on a
//! terminal status, when the optional deadline passes, or when the
//! shutdown signal fires. Transient fetch errors count as "still in
//! progress"; the next tick is the only retry. Any other fetch error ends
//! the wait.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use dropletops_api::ComputeApi;
use dropletops_core::{Action, ActionId, ActionStatus, DropletId};

use crate::error::{SnapshotError, SnapshotResult};

/// What the poll loop does with an observed status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollStep {
    Continue,
    Succeeded,
    Failed,
}

impl PollStep {
    /// Total mapping from action status to loop transition.
    pub fn from_status(status: &ActionStatus) -> Self {
        match status {
            ActionStatus::Completed => PollStep::Succeeded,
            ActionStatus::Errored => PollStep::Failed,
            ActionStatus::InProgress(_) => PollStep::Continue,
        }
    }
}

/// Summary of a successful wait.
#[derive(Debug, Clone)]
pub struct PollReport {
    pub action: Action,
    /// Status fetches attempted, including failed ones.
    pub polls: u32,
    pub transient_errors: u32,
    pub elapsed: Duration,
}

pub struct ActionPoller<'a, A: ComputeApi + ?Sized> {
    api: &'a A,
    droplet: DropletId,
    interval: Duration,
    timeout: Option<Duration>,
}

impl<'a, A: ComputeApi + ?Sized> ActionPoller<'a, A> {
    /// Poll every `interval`, with no deadline.
    pub fn new(api: &'a A, droplet: DropletId, interval: Duration) -> Self {
        Self {
            api,
            droplet,
            interval,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Wait for `action` to reach a terminal state.
    ///
    /// Setting the `shutdown` value to `true` aborts the wait with
    /// [`SnapshotError::Cancelled`]. A dropped sender never cancels.
    pub async fn wait(
        &self,
        action: ActionId,
        mut shutdown: watch::Receiver<bool>,
    ) -> SnapshotResult<PollReport> {
        let started = Instant::now();
        let deadline = self.timeout.map(|t| started + t);
        let mut polls = 0u32;
        let mut transient_errors = 0u32;

        debug!(
            droplet = %self.droplet,
            action_id = %action,
            interval_secs = self.interval.as_secs_f64(),
            timeout_secs = self.timeout.map(|t| t.as_secs()),
            "waiting for action"
        );

        loop {
            tokio::select! {
                biased;
                _ = cancelled(&mut shutdown) => {
                    info!(action_id = %action, "wait cancelled");
                    return Err(SnapshotError::Cancelled { action_id: action });
                }
                _ = deadline_elapsed(deadline) => {
                    return Err(self.timed_out(action, started));
                }
                _ = tokio::time::sleep(self.interval) => {}
            }

            polls += 1;
            let fetch = self.api.get_action(self.droplet, action);
            let fetched = match deadline {
                Some(at) => match tokio::time::timeout_at(at, fetch).await {
                    Ok(result) => result,
                    Err(_) => return Err(self.timed_out(action, started)),
                },
                None => fetch.await,
            };

            let current = match fetched {
                Ok(current) => current,
                Err(e) if e.is_transient() => {
                    transient_errors += 1;
                    warn!(action_id = %action, poll = polls, error = %e, "failed to read action status");
                    continue;
                }
                Err(e) => {
                    warn!(action_id = %action, poll = polls, error = %e, "action status unavailable");
                    return Err(SnapshotError::Poll {
                        action_id: action,
                        source: e,
                    });
                }
            };

            match PollStep::from_status(&current.status) {
                PollStep::Continue => {
                    info!(action_id = %action, poll = polls, status = %current.status, "action in progress");
                }
                PollStep::Succeeded => {
                    let elapsed = started.elapsed();
                    info!(
                        action_id = %action,
                        polls,
                        elapsed_secs = elapsed.as_secs(),
                        "action completed"
                    );
                    return Ok(PollReport {
                        action: current,
                        polls,
                        transient_errors,
                        elapsed,
                    });
                }
                PollStep::Failed => {
                    warn!(action_id = %action, polls, "action errored");
                    return Err(SnapshotError::ActionErrored { action_id: action });
                }
            }
        }
    }

    fn timed_out(&self, action: ActionId, started: Instant) -> SnapshotError {
        let waited = started.elapsed();
        warn!(action_id = %action, waited_secs = waited.as_secs(), "action wait timed out");
        SnapshotError::Timeout {
            action_id: action,
            waited,
        }
    }
}

async fn cancelled(shutdown: &mut watch::Receiver<bool>) {
    if shutdown.wait_for(|stop| *stop).await.is_err() {
        std::future::pending::<()>().await;
    }
}

async fn deadline_elapsed(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending::<()>().await,
    }
}
