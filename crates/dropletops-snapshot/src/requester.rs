//! Snapshot requester: starts a snapshot action for the droplet.

use chrono::{DateTime, Utc};
use tracing::info;

use dropletops_api::ComputeApi;
use dropletops_core::naming::{Stamp, snapshot_name};
use dropletops_core::{ActionId, DropletId};

use crate::error::{SnapshotError, SnapshotResult};

pub struct SnapshotRequester<'a, A: ComputeApi + ?Sized> {
    api: &'a A,
    droplet: DropletId,
}

impl<'a, A: ComputeApi + ?Sized> SnapshotRequester<'a, A> {
    pub fn new(api: &'a A, droplet: DropletId) -> Self {
        Self { api, droplet }
    }

    /// Name used when the caller does not supply one.
    pub fn default_name(prefix: &str, stamp: Stamp, now: DateTime<Utc>) -> String {
        snapshot_name(prefix, stamp, now)
    }

    /// Ask the provider to snapshot the droplet. No retry: a failed
    /// request is returned as-is.
    pub async fn request(&self, name: &str) -> SnapshotResult<ActionId> {
        info!(droplet = %self.droplet, %name, "requesting snapshot");
        let action = self
            .api
            .create_snapshot(self.droplet, name)
            .await
            .map_err(|source| SnapshotError::Request {
                name: name.to_string(),
                source,
            })?;
        info!(droplet = %self.droplet, action_id = %action.id, status = %action.status, "snapshot started");
        Ok(action.id)
    }
}
