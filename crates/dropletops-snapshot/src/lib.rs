//! dropletops-snapshot — the snapshot lifecycle.
//!
//! A snapshot run is a short sequential workflow against a
//! [`ComputeApi`](dropletops_api::ComputeApi):
//!
//! ```text
//! SnapshotWorkflow
//!   ├── SnapshotRequester  create snapshot → ActionId
//!   ├── ActionPoller       sleep, re-read action, until terminal / deadline
//!   └── RetentionPruner    list snapshots, delete the tail beyond keep-last
//! ```
//!
//! At most one snapshot action is outstanding per workflow. The poller
//! tolerates transient status-fetch errors; every other failure is returned
//! as a [`SnapshotError`] and the caller decides what to do with it.
//!
//! [`local`] writes the plain-file snapshot used on hosts without provider
//! access.

pub mod error;
pub mod local;
pub mod poller;
pub mod pruner;
pub mod requester;
pub mod workflow;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{SnapshotError, SnapshotResult};
pub use poller::{ActionPoller, PollReport, PollStep};
pub use pruner::{DeleteOutcome, PruneReport, RetentionPruner};
pub use local::write_local_snapshot;
pub use requester::SnapshotRequester;
pub use workflow::{PruneStage, SnapshotWorkflow, WorkflowReport};
