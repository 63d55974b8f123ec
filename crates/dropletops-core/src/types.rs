//! Domain types for droplet operations.
//!
//! These mirror the parts of the provider's resources the toolkit acts on.
//! They are provider-neutral: the API crate maps wire payloads into them.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Identifiers ────────────────────────────────────────────────────

/// Identifier of the droplet (virtual machine) being operated on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DropletId(pub u64);

impl fmt::Display for DropletId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DropletId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(DropletId)
    }
}

/// Handle of an asynchronous provider action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionId(pub u64);

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque snapshot identifier.
///
/// Droplet snapshots are numeric images, but the delete endpoint takes a
/// string, so the id is kept in its textual form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SnapshotId(pub String);

impl fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u64> for SnapshotId {
    fn from(id: u64) -> Self {
        SnapshotId(id.to_string())
    }
}

// ── Actions ────────────────────────────────────────────────────────

/// Status of a provider action.
///
/// Only `completed` and `errored` are terminal. Every other string is
/// treated as in-progress and kept verbatim for logging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActionStatus {
    InProgress(String),
    Completed,
    Errored,
}

impl ActionStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ActionStatus::InProgress(raw) => raw,
            ActionStatus::Completed => "completed",
            ActionStatus::Errored => "errored",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, ActionStatus::InProgress(_))
    }
}

impl From<&str> for ActionStatus {
    fn from(raw: &str) -> Self {
        match raw {
            "completed" => ActionStatus::Completed,
            "errored" => ActionStatus::Errored,
            other => ActionStatus::InProgress(other.to_string()),
        }
    }
}

impl From<String> for ActionStatus {
    fn from(raw: String) -> Self {
        ActionStatus::from(raw.as_str())
    }
}

impl From<ActionStatus> for String {
    fn from(status: ActionStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for ActionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An asynchronous provider operation, e.g. a snapshot in progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub id: ActionId,
    pub status: ActionStatus,
    /// Provider action type, e.g. "snapshot".
    pub kind: String,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

// ── Snapshots ──────────────────────────────────────────────────────

/// A point-in-time image of the droplet's disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub id: SnapshotId,
    pub name: String,
    pub size_gigabytes: f64,
    pub created_at: DateTime<Utc>,
    pub regions: Vec<String>,
}

/// Keep only the `keep_last` most recent snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionPolicy {
    pub keep_last: usize,
}

impl RetentionPolicy {
    pub fn keep_last(keep_last: usize) -> Self {
        Self { keep_last }
    }

    /// Number of snapshots to delete out of `listed`.
    pub fn excess(&self, listed: usize) -> usize {
        listed.saturating_sub(self.keep_last)
    }
}

// ── Droplet ────────────────────────────────────────────────────────

/// Region a droplet lives in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub slug: String,
    pub name: String,
}

/// A single IPv4 network attachment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkV4 {
    pub ip_address: String,
    /// "public" or "private".
    pub kind: String,
}

/// Read-only view of the droplet's metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Droplet {
    pub id: DropletId,
    pub name: String,
    /// Provider status: "new", "active", "off", "archive".
    pub status: String,
    pub memory_mb: u64,
    pub vcpus: u32,
    pub disk_gb: u64,
    pub region: Region,
    pub created_at: DateTime<Utc>,
    pub networks_v4: Vec<NetworkV4>,
}

impl Droplet {
    /// Public IPv4 address, falling back to the first address of any kind.
    pub fn public_ip(&self) -> Option<&str> {
        self.networks_v4
            .iter()
            .find(|n| n.kind == "public")
            .or_else(|| self.networks_v4.first())
            .map(|n| n.ip_address.as_str())
    }

    pub fn is_active(&self) -> bool {
        self.status == "active"
    }
}
