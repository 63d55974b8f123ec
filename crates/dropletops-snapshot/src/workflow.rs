//! Snapshot workflow: request, wait, then optionally prune.

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{info, warn};

use dropletops_api::ComputeApi;
use dropletops_core::config::SnapshotPlan;
use dropletops_core::naming::Stamp;
use dropletops_core::{ActionId, DropletId};

use crate::error::SnapshotResult;
use crate::poller::{ActionPoller, PollReport};
use crate::pruner::{PruneReport, RetentionPruner};
use crate::requester::SnapshotRequester;

/// What happened in the pruning stage.
#[derive(Debug, Clone)]
pub enum PruneStage {
    /// Pruning disabled for this run.
    Skipped,
    Completed(PruneReport),
    /// Listing failed after a successful snapshot; the snapshot stands.
    ListFailed(String),
}

#[derive(Debug, Clone)]
pub struct WorkflowReport {
    pub snapshot_name: String,
    pub action_id: ActionId,
    pub poll: PollReport,
    pub prune: PruneStage,
}

pub struct SnapshotWorkflow<'a, A: ComputeApi + ?Sized> {
    api: &'a A,
    droplet: DropletId,
    plan: SnapshotPlan,
    stamp: Stamp,
    prune: bool,
}

impl<'a, A: ComputeApi + ?Sized> SnapshotWorkflow<'a, A> {
    /// A workflow that names snapshots per day and prunes afterwards.
    pub fn new(api: &'a A, droplet: DropletId, plan: SnapshotPlan) -> Self {
        Self {
            api,
            droplet,
            plan,
            stamp: Stamp::Day,
            prune: true,
        }
    }

    pub fn with_stamp(mut self, stamp: Stamp) -> Self {
        self.stamp = stamp;
        self
    }

    pub fn with_pruning(mut self, prune: bool) -> Self {
        self.prune = prune;
        self
    }

    /// Run the whole lifecycle.
    ///
    /// Request and poll failures are returned as errors. A failure to list
    /// snapshots for pruning is tolerated and reported in
    /// [`WorkflowReport::prune`].
    pub async fn run(
        &self,
        name: Option<&str>,
        now: DateTime<Utc>,
        shutdown: watch::Receiver<bool>,
    ) -> SnapshotResult<WorkflowReport> {
        let snapshot_name = match name {
            Some(n) if !n.trim().is_empty() => n.to_string(),
            _ => SnapshotRequester::<A>::default_name(&self.plan.name_prefix, self.stamp, now),
        };

        let action_id = SnapshotRequester::new(self.api, self.droplet)
            .request(&snapshot_name)
            .await?;

        let poll = ActionPoller::new(self.api, self.droplet, self.plan.poll_interval)
            .with_timeout(self.plan.timeout)
            .wait(action_id, shutdown)
            .await?;

        info!(droplet = %self.droplet, name = %snapshot_name, "snapshot completed");

        let prune = if self.prune {
            let pruner = RetentionPruner::new(self.api, self.droplet, self.plan.retention);
            match pruner.prune().await {
                Ok(report) => PruneStage::Completed(report),
                Err(e) => {
                    warn!(droplet = %self.droplet, error = %e, "skipping pruning");
                    PruneStage::ListFailed(e.to_string())
                }
            }
        } else {
            PruneStage::Skipped
        };

        Ok(WorkflowReport {
            snapshot_name,
            action_id,
            poll,
            prune,
        })
    }
}
