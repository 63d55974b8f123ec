//! Retention pruner: deletes snapshots beyond the keep-last count.
//!
//! The provider lists droplet snapshots newest first, so the entries past
//! `keep_last` are the tail of the listing. Deletes are independent and
//! best-effort: every attempt yields one [`DeleteOutcome`].

use tracing::{info, warn};

use dropletops_api::ComputeApi;
use dropletops_core::{DropletId, RetentionPolicy, Snapshot};

use crate::error::{SnapshotError, SnapshotResult};

/// The snapshots a policy would delete: the tail of `snapshots` beyond
/// `keep_last`. Empty when there is nothing in excess.
pub fn select_for_deletion(snapshots: &[Snapshot], policy: RetentionPolicy) -> &[Snapshot] {
    let excess = policy.excess(snapshots.len());
    &snapshots[snapshots.len() - excess..]
}

/// Result of one attempted delete.
#[derive(Debug, Clone)]
pub enum DeleteOutcome {
    Deleted(Snapshot),
    Failed { snapshot: Snapshot, error: String },
}

impl DeleteOutcome {
    pub fn snapshot(&self) -> &Snapshot {
        match self {
            DeleteOutcome::Deleted(s) | DeleteOutcome::Failed { snapshot: s, .. } => s,
        }
    }

    pub fn is_deleted(&self) -> bool {
        matches!(self, DeleteOutcome::Deleted(_))
    }
}

#[derive(Debug, Clone, Default)]
pub struct PruneReport {
    /// Snapshots returned by the listing.
    pub listed: usize,
    /// One entry per attempted delete, oldest first.
    pub outcomes: Vec<DeleteOutcome>,
}

impl PruneReport {
    pub fn attempted(&self) -> usize {
        self.outcomes.len()
    }

    pub fn deleted(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_deleted()).count()
    }

    pub fn failed(&self) -> usize {
        self.attempted() - self.deleted()
    }

    pub fn retained(&self) -> usize {
        self.listed - self.deleted()
    }
}

pub struct RetentionPruner<'a, A: ComputeApi + ?Sized> {
    api: &'a A,
    droplet: DropletId,
    policy: RetentionPolicy,
}

impl<'a, A: ComputeApi + ?Sized> RetentionPruner<'a, A> {
    pub fn new(api: &'a A, droplet: DropletId, policy: RetentionPolicy) -> Self {
        Self {
            api,
            droplet,
            policy,
        }
    }

    /// List the droplet's snapshots and delete the excess.
    pub async fn prune(&self) -> SnapshotResult<PruneReport> {
        let snapshots = self
            .api
            .list_snapshots(self.droplet)
            .await
            .map_err(SnapshotError::List)?;
        Ok(self.prune_listed(&snapshots).await)
    }

    /// Delete the excess of an already fetched listing.
    pub async fn prune_listed(&self, snapshots: &[Snapshot]) -> PruneReport {
        let doomed = select_for_deletion(snapshots, self.policy);
        let mut report = PruneReport {
            listed: snapshots.len(),
            outcomes: Vec::with_capacity(doomed.len()),
        };

        if doomed.is_empty() {
            info!(
                droplet = %self.droplet,
                listed = snapshots.len(),
                keep_last = self.policy.keep_last,
                "nothing to prune"
            );
            return report;
        }

        info!(droplet = %self.droplet, count = doomed.len(), "pruning old snapshots");

        for snapshot in doomed.iter().rev() {
            info!(snapshot_id = %snapshot.id, name = %snapshot.name, "deleting snapshot");
            let outcome = match self.api.delete_snapshot(&snapshot.id).await {
                Ok(()) => DeleteOutcome::Deleted(snapshot.clone()),
                Err(e) => {
                    warn!(snapshot_id = %snapshot.id, error = %e, "failed to delete snapshot");
                    DeleteOutcome::Failed {
                        snapshot: snapshot.clone(),
                        error: e.to_string(),
                    }
                }
            };
            report.outcomes.push(outcome);
        }

        info!(
            droplet = %self.droplet,
            deleted = report.deleted(),
            failed = report.failed(),
            "pruning finished"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedApi, newest_first};

    const DROPLET: DropletId = DropletId(1);

    #[test]
    fn selection_for_all_small_sizes() {
        for n in 0..12 {
            let snapshots = newest_first(n);
            for k in 0..12 {
                let selected = select_for_deletion(&snapshots, RetentionPolicy::keep_last(k));
                if n <= k {
                    assert!(selected.is_empty(), "n={n} k={k}");
                } else {
                    assert_eq!(selected.len(), n - k, "n={n} k={k}");
                    assert_eq!(selected, &snapshots[k..], "n={n} k={k}");
                }
            }
        }
    }

    #[tokio::test]
    async fn keep_five_of_eight_deletes_three_oldest() {
        let api = ScriptedApi::with_snapshots(8);
        let listing = newest_first(8);

        let report = RetentionPruner::new(&api, DROPLET, RetentionPolicy::keep_last(5))
            .prune()
            .await
            .unwrap();

        assert_eq!(report.listed, 8);
        assert_eq!(report.attempted(), 3);
        assert_eq!(report.deleted(), 3);
        assert_eq!(report.retained(), 5);

        // Indices 7, 6, 5 of the listing, oldest first.
        let expected: Vec<String> = [7, 6, 5].iter().map(|&i| listing[i].id.0.clone()).collect();
        assert_eq!(api.deleted_ids(), expected);

        let remaining: Vec<String> = api
            .snapshots
            .lock()
            .unwrap()
            .iter()
            .map(|s| s.name.clone())
            .collect();
        assert_eq!(remaining, vec!["snap-0", "snap-1", "snap-2", "snap-3", "snap-4"]);
    }

    #[tokio::test]
    async fn at_or_below_retention_is_a_no_op() {
        for n in [0, 3, 5] {
            let api = ScriptedApi::with_snapshots(n);
            let report = RetentionPruner::new(&api, DROPLET, RetentionPolicy::keep_last(5))
                .prune()
                .await
                .unwrap();
            assert_eq!(report.attempted(), 0);
            assert!(api.deleted_ids().is_empty());
        }
    }

    #[tokio::test]
    async fn failed_delete_does_not_stop_the_rest() {
        let listing = newest_first(6);
        let stuck = listing[4].id.0.clone();
        let api = ScriptedApi {
            undeletable: [stuck.clone()].into_iter().collect(),
            ..ScriptedApi::with_snapshots(6)
        };

        let report = RetentionPruner::new(&api, DROPLET, RetentionPolicy::keep_last(2))
            .prune()
            .await
            .unwrap();

        assert_eq!(report.attempted(), 4);
        assert_eq!(report.deleted(), 3);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.retained(), 3);

        let failed: Vec<&DeleteOutcome> =
            report.outcomes.iter().filter(|o| !o.is_deleted()).collect();
        assert_eq!(failed[0].snapshot().id.0, stuck);
        assert!(matches!(failed[0], DeleteOutcome::Failed { error, .. } if error.contains("409")));
    }

    #[tokio::test]
    async fn listing_failure_is_returned() {
        let api = ScriptedApi {
            fail_list: true,
            ..ScriptedApi::with_snapshots(8)
        };
        let err = RetentionPruner::new(&api, DROPLET, RetentionPolicy::keep_last(5))
            .prune()
            .await
            .unwrap_err();
        assert!(matches!(err, SnapshotError::List(_)));
        assert!(api.deleted_ids().is_empty());
    }

    #[tokio::test]
    async fn keep_zero_deletes_everything() {
        let api = ScriptedApi::with_snapshots(4);
        let report = RetentionPruner::new(&api, DROPLET, RetentionPolicy::keep_last(0))
            .prune()
            .await
            .unwrap();
        assert_eq!(report.deleted(), 4);
        assert!(api.snapshots.lock().unwrap().is_empty());
    }
}
