//! dropletops-api — the compute provider seam.
//!
//! [`ComputeApi`] is the port every workflow talks to. It covers exactly
//! the provider operations the toolkit needs: read the droplet, start a
//! snapshot action, read an action, list snapshots and delete one.
//!
//! [`DigitalOceanClient`] implements it against the DigitalOcean v2 REST
//! API. Tests substitute scripted fakes.
//!
//! # Architecture
//!
//! ```text
//! ComputeApi (trait)
//!   └── DigitalOceanClient
//!         ├── reqwest::Client (bearer token, request timeout)
//!         └── wire::* → dropletops_core types
//! ```

pub mod client;
pub mod error;
pub mod wire;

use async_trait::async_trait;

use dropletops_core::{Action, ActionId, Droplet, DropletId, Snapshot, SnapshotId};

pub use client::DigitalOceanClient;
pub use error::{ApiError, ApiResult};

/// Provider operations used by the snapshot lifecycle and health report.
#[async_trait]
pub trait ComputeApi: Send + Sync {
    /// Fetch droplet metadata.
    async fn get_droplet(&self, droplet: DropletId) -> ApiResult<Droplet>;

    /// Start a snapshot of the droplet. Returns the pending action.
    async fn create_snapshot(&self, droplet: DropletId, name: &str) -> ApiResult<Action>;

    /// Re-read an action started on the droplet.
    async fn get_action(&self, droplet: DropletId, action: ActionId) -> ApiResult<Action>;

    /// Every snapshot of the droplet, in the provider's listing order.
    async fn list_snapshots(&self, droplet: DropletId) -> ApiResult<Vec<Snapshot>>;

    /// Delete a single snapshot.
    async fn delete_snapshot(&self, snapshot: &SnapshotId) -> ApiResult<()>;
}
