//! Scripted in-memory `ComputeApi` for lifecycle tests.

use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use dropletops_api::{ApiError, ApiResult, ComputeApi};
use dropletops_core::{
    Action, ActionId, ActionStatus, Droplet, DropletId, Region, Snapshot, SnapshotId,
};

/// One scripted answer to `get_action`.
#[derive(Debug, Clone, Copy)]
pub enum Poll {
    Status(&'static str),
    /// Transient provider failure (503).
    Unavailable,
    /// Permanent provider rejection with the given status.
    Rejected(u16),
}

#[derive(Default)]
pub struct ScriptedApi {
    pub polls: Mutex<VecDeque<Poll>>,
    pub snapshots: Mutex<Vec<Snapshot>>,
    pub undeletable: HashSet<String>,
    pub fail_create: bool,
    pub fail_list: bool,
    /// Simulated latency of every `get_action` call.
    pub action_latency: Option<Duration>,

    pub created: Mutex<Vec<String>>,
    pub deleted: Mutex<Vec<SnapshotId>>,
    pub poll_count: AtomicU32,
}

impl ScriptedApi {
    pub fn with_polls(polls: &[Poll]) -> Self {
        Self {
            polls: Mutex::new(polls.iter().copied().collect()),
            ..Self::default()
        }
    }

    pub fn with_snapshots(count: usize) -> Self {
        Self {
            snapshots: Mutex::new(newest_first(count)),
            ..Self::default()
        }
    }

    pub fn polled(&self) -> u32 {
        self.poll_count.load(Ordering::SeqCst)
    }

    pub fn deleted_ids(&self) -> Vec<String> {
        self.deleted
            .lock()
            .unwrap()
            .iter()
            .map(|id| id.0.clone())
            .collect()
    }
}

/// `count` snapshots named `snap-<i>`, newest first: index 0 is the most
/// recent and has the highest id.
pub fn newest_first(count: usize) -> Vec<Snapshot> {
    (0..count)
        .map(|i| {
            let age = i as i64;
            Snapshot {
                id: SnapshotId::from((count - i) as u64),
                name: format!("snap-{i}"),
                size_gigabytes: 2.0,
                created_at: Utc.with_ymd_and_hms(2026, 1, 31, 3, 0, 0).unwrap()
                    - chrono::Duration::days(age),
                regions: vec!["nyc3".to_string()],
            }
        })
        .collect()
}

fn unavailable(path: String) -> ApiError {
    ApiError::Status {
        method: "GET",
        path,
        status: 503,
        message: "Service Unavailable".to_string(),
    }
}

#[async_trait]
impl ComputeApi for ScriptedApi {
    async fn get_droplet(&self, droplet: DropletId) -> ApiResult<Droplet> {
        Ok(Droplet {
            id: droplet,
            name: "scripted".to_string(),
            status: "active".to_string(),
            memory_mb: 1024,
            vcpus: 1,
            disk_gb: 25,
            region: Region {
                slug: "nyc3".to_string(),
                name: "New York 3".to_string(),
            },
            created_at: Utc::now(),
            networks_v4: vec![],
        })
    }

    async fn create_snapshot(&self, droplet: DropletId, name: &str) -> ApiResult<Action> {
        if self.fail_create {
            return Err(ApiError::Status {
                method: "POST",
                path: format!("/v2/droplets/{droplet}/actions"),
                status: 422,
                message: "droplet is locked".to_string(),
            });
        }
        self.created.lock().unwrap().push(name.to_string());
        Ok(Action {
            id: ActionId(1000),
            status: ActionStatus::from("in-progress"),
            kind: "snapshot".to_string(),
            started_at: None,
            completed_at: None,
        })
    }

    async fn get_action(&self, droplet: DropletId, action: ActionId) -> ApiResult<Action> {
        if let Some(latency) = self.action_latency {
            tokio::time::sleep(latency).await;
        }
        self.poll_count.fetch_add(1, Ordering::SeqCst);
        let next = self.polls.lock().unwrap().pop_front();
        let status = match next {
            Some(Poll::Status(s)) => s,
            Some(Poll::Unavailable) => {
                return Err(unavailable(format!("/v2/droplets/{droplet}/actions/{action}")));
            }
            Some(Poll::Rejected(status)) => {
                return Err(ApiError::Status {
                    method: "GET",
                    path: format!("/v2/droplets/{droplet}/actions/{action}"),
                    status,
                    message: "rejected".to_string(),
                });
            }
            None => "in-progress",
        };
        Ok(Action {
            id: action,
            status: ActionStatus::from(status),
            kind: "snapshot".to_string(),
            started_at: None,
            completed_at: None,
        })
    }

    async fn list_snapshots(&self, droplet: DropletId) -> ApiResult<Vec<Snapshot>> {
        if self.fail_list {
            return Err(unavailable(format!("/v2/droplets/{droplet}/snapshots")));
        }
        Ok(self.snapshots.lock().unwrap().clone())
    }

    async fn delete_snapshot(&self, snapshot: &SnapshotId) -> ApiResult<()> {
        if self.undeletable.contains(&snapshot.0) {
            return Err(ApiError::Status {
                method: "DELETE",
                path: format!("/v2/snapshots/{snapshot}"),
                status: 409,
                message: "snapshot is in use".to_string(),
            });
        }
        self.deleted.lock().unwrap().push(snapshot.clone());
        self.snapshots.lock().unwrap().retain(|s| &s.id != snapshot);
        Ok(())
    }
}
