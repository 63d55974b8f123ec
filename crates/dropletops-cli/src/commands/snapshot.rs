use chrono::Utc;
use tokio::sync::watch;

use dropletops_core::naming::Stamp;
use dropletops_core::{OpsConfig, RetentionPolicy};
use dropletops_snapshot::{
    DeleteOutcome, PruneReport, PruneStage, RetentionPruner, SnapshotWorkflow, WorkflowReport,
    write_local_snapshot,
};

use super::provider;

/// On-demand snapshot: wait for completion, no pruning.
pub async fn snapshot(
    config: &OpsConfig,
    name: Option<&str>,
    shutdown: watch::Receiver<bool>,
) -> anyhow::Result<u8> {
    let (client, droplet) = provider(config)?;
    let plan = config.snapshot.plan()?;

    let report = SnapshotWorkflow::new(&client, droplet, plan)
        .with_stamp(Stamp::Minute)
        .with_pruning(false)
        .run(name, Utc::now(), shutdown)
        .await?;
    print_workflow(&report);
    Ok(0)
}

/// Scheduled backup: daily-stamped snapshot, bounded wait, then prune.
pub async fn backup(
    config: &OpsConfig,
    keep: Option<usize>,
    shutdown: watch::Receiver<bool>,
) -> anyhow::Result<u8> {
    let (client, droplet) = provider(config)?;
    let mut plan = config.backup.plan()?;
    if let Some(keep) = keep {
        plan.retention = RetentionPolicy::keep_last(keep);
    }

    let report = SnapshotWorkflow::new(&client, droplet, plan)
        .run(None, Utc::now(), shutdown)
        .await?;
    print_workflow(&report);
    Ok(0)
}

pub async fn cleanup(config: &OpsConfig, keep: Option<usize>) -> anyhow::Result<u8> {
    let (client, droplet) = provider(config)?;
    let policy = match keep {
        Some(keep) => RetentionPolicy::keep_last(keep),
        None => config.snapshot.plan()?.retention,
    };

    let report = RetentionPruner::new(&client, droplet, policy).prune().await?;
    print_prune(&report, policy);
    Ok(0)
}

pub fn local_snapshot(config: &OpsConfig) -> anyhow::Result<u8> {
    let path = write_local_snapshot(&config.local_snapshot.dir, Utc::now())?;
    println!("Local snapshot written: {}", path.display());
    Ok(0)
}

fn print_workflow(report: &WorkflowReport) {
    println!(
        "Snapshot {} completed (action {}, {} polls, {}s)",
        report.snapshot_name,
        report.action_id,
        report.poll.polls,
        report.poll.elapsed.as_secs()
    );
    match &report.prune {
        PruneStage::Skipped => {}
        PruneStage::Completed(prune) => {
            for outcome in &prune.outcomes {
                print_outcome(outcome);
            }
            println!("Retained {} of {} snapshots", prune.retained(), prune.listed);
        }
        PruneStage::ListFailed(error) => {
            println!("Snapshot kept; pruning skipped: {error}");
        }
    }
}

fn print_prune(report: &PruneReport, policy: RetentionPolicy) {
    if report.attempted() == 0 {
        println!(
            "Only {} snapshots, keeping last {}: nothing to delete",
            report.listed, policy.keep_last
        );
        return;
    }
    println!("Deleting {} old snapshots", report.attempted());
    for outcome in &report.outcomes {
        print_outcome(outcome);
    }
    println!(
        "Cleanup finished: {} deleted, {} failed",
        report.deleted(),
        report.failed()
    );
}

fn print_outcome(outcome: &DeleteOutcome) {
    match outcome {
        DeleteOutcome::Deleted(s) => println!("  deleted {} (ID: {})", s.name, s.id),
        DeleteOutcome::Failed { snapshot, error } => {
            println!("  failed  {} (ID: {}): {error}", snapshot.name, snapshot.id)
        }
    }
}
