//! Snapshot lifecycle errors.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use dropletops_api::ApiError;
use dropletops_core::{ActionId, Severity};

/// Result type alias for snapshot lifecycle operations.
pub type SnapshotResult<T> = Result<T, SnapshotError>;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to request snapshot {name:?}: {source}")]
    Request {
        name: String,
        #[source]
        source: ApiError,
    },

    #[error("snapshot action {action_id} errored")]
    ActionErrored { action_id: ActionId },

    #[error("failed to read snapshot action {action_id}: {source}")]
    Poll {
        action_id: ActionId,
        #[source]
        source: ApiError,
    },

    #[error("snapshot action {action_id} did not finish within {}s", .waited.as_secs())]
    Timeout { action_id: ActionId, waited: Duration },

    #[error("wait for snapshot action {action_id} was cancelled")]
    Cancelled { action_id: ActionId },

    #[error("failed to list snapshots: {0}")]
    List(#[source] ApiError),

    #[error("failed to write local snapshot {path}: {source}")]
    LocalWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SnapshotError {
    pub fn severity(&self) -> Severity {
        match self {
            SnapshotError::Request { source, .. }
            | SnapshotError::Poll { source, .. }
            | SnapshotError::List(source) => {
                source.severity()
            }
            _ => Severity::Fatal,
        }
    }
}
