//! DigitalOcean v2 JSON payloads and their mapping to domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use dropletops_core::{
    Action, ActionId, ActionStatus, Droplet, DropletId, NetworkV4, Region, Snapshot, SnapshotId,
};

// ── Requests ───────────────────────────────────────────────────────

/// Body of `POST /v2/droplets/{id}/actions`.
#[derive(Debug, Serialize)]
pub struct DropletActionRequest<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub name: &'a str,
}

impl<'a> DropletActionRequest<'a> {
    pub fn snapshot(name: &'a str) -> Self {
        Self {
            kind: "snapshot",
            name,
        }
    }
}

// ── Responses ──────────────────────────────────────────────────────

/// Error body returned with non-2xx responses.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub id: Option<String>,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct DropletEnvelope {
    pub droplet: WireDroplet,
}

#[derive(Debug, Deserialize)]
pub struct WireDroplet {
    pub id: u64,
    pub name: String,
    pub memory: u64,
    pub vcpus: u32,
    pub disk: u64,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub region: WireRegion,
    #[serde(default)]
    pub networks: WireNetworks,
}

#[derive(Debug, Deserialize)]
pub struct WireRegion {
    pub slug: String,
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct WireNetworks {
    #[serde(default)]
    pub v4: Vec<WireNetworkV4>,
}

#[derive(Debug, Deserialize)]
pub struct WireNetworkV4 {
    pub ip_address: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl From<WireDroplet> for Droplet {
    fn from(d: WireDroplet) -> Self {
        Droplet {
            id: DropletId(d.id),
            name: d.name,
            status: d.status,
            memory_mb: d.memory,
            vcpus: d.vcpus,
            disk_gb: d.disk,
            region: Region {
                slug: d.region.slug,
                name: d.region.name,
            },
            created_at: d.created_at,
            networks_v4: d
                .networks
                .v4
                .into_iter()
                .map(|n| NetworkV4 {
                    ip_address: n.ip_address,
                    kind: n.kind,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ActionEnvelope {
    pub action: WireAction,
}

#[derive(Debug, Deserialize)]
pub struct WireAction {
    pub id: u64,
    pub status: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<WireAction> for Action {
    fn from(a: WireAction) -> Self {
        Action {
            id: ActionId(a.id),
            status: ActionStatus::from(a.status),
            kind: a.kind,
            started_at: a.started_at,
            completed_at: a.completed_at,
        }
    }
}

/// One page of `GET /v2/droplets/{id}/snapshots`.
#[derive(Debug, Deserialize)]
pub struct SnapshotsPage {
    #[serde(default)]
    pub snapshots: Vec<WireSnapshot>,
    #[serde(default)]
    pub links: Links,
    pub meta: Option<Meta>,
}

impl SnapshotsPage {
    pub fn has_next(&self) -> bool {
        self.links
            .pages
            .as_ref()
            .and_then(|p| p.next.as_ref())
            .is_some()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct Links {
    pub pages: Option<Pages>,
}

#[derive(Debug, Deserialize)]
pub struct Pages {
    pub next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Meta {
    pub total: usize,
}

/// Snapshot ids are numeric for droplet images and strings for volume
/// snapshots.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum WireId {
    Number(u64),
    Text(String),
}

impl From<WireId> for SnapshotId {
    fn from(id: WireId) -> Self {
        match id {
            WireId::Number(n) => SnapshotId::from(n),
            WireId::Text(s) => SnapshotId(s),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct WireSnapshot {
    pub id: WireId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub regions: Vec<String>,
    #[serde(default)]
    pub size_gigabytes: f64,
}

impl From<WireSnapshot> for Snapshot {
    fn from(s: WireSnapshot) -> Self {
        Snapshot {
            id: s.id.into(),
            name: s.name,
            size_gigabytes: s.size_gigabytes,
            created_at: s.created_at,
            regions: s.regions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_droplet() {
        let json = r#"{
            "droplet": {
                "id": 547986490,
                "name": "ecotachos-prod",
                "memory": 2048,
                "vcpus": 2,
                "disk": 60,
                "locked": false,
                "status": "active",
                "created_at": "2025-11-02T17:04:11Z",
                "region": {"slug": "nyc3", "name": "New York 3", "available": true},
                "networks": {
                    "v4": [
                        {"ip_address": "10.116.0.2", "netmask": "255.255.240.0", "type": "private"},
                        {"ip_address": "203.0.113.7", "netmask": "255.255.240.0", "type": "public"}
                    ],
                    "v6": []
                }
            }
        }"#;
        let env: DropletEnvelope = serde_json::from_str(json).unwrap();
        let droplet = Droplet::from(env.droplet);
        assert_eq!(droplet.id, DropletId(547986490));
        assert_eq!(droplet.memory_mb, 2048);
        assert_eq!(droplet.region.name, "New York 3");
        assert_eq!(droplet.public_ip(), Some("203.0.113.7"));
        assert!(droplet.is_active());
    }

    #[test]
    fn decode_action() {
        let json = r#"{
            "action": {
                "id": 36804745,
                "status": "in-progress",
                "type": "snapshot",
                "started_at": "2026-10-19T03:00:02Z",
                "completed_at": null,
                "resource_id": 547986490,
                "resource_type": "droplet",
                "region_slug": "nyc3"
            }
        }"#;
        let env: ActionEnvelope = serde_json::from_str(json).unwrap();
        let action = Action::from(env.action);
        assert_eq!(action.id, ActionId(36804745));
        assert_eq!(action.status, ActionStatus::InProgress("in-progress".into()));
        assert_eq!(action.kind, "snapshot");
        assert!(action.completed_at.is_none());
    }

    #[test]
    fn decode_snapshot_page_with_mixed_ids() {
        let json = r#"{
            "snapshots": [
                {"id": 7938206, "name": "ecotachos-auto-backup-2026-10-18", "created_at": "2026-10-18T03:01:10Z",
                 "regions": ["nyc3"], "size_gigabytes": 2.36, "min_disk_size": 60, "type": "snapshot"},
                {"id": "fbe805e8-866b-11e6-96bf-000f53315a41", "name": "vol", "created_at": "2026-10-17T03:01:10Z",
                 "regions": []}
            ],
            "links": {"pages": {"next": "https://api.digitalocean.com/v2/droplets/1/snapshots?page=2"}},
            "meta": {"total": 30}
        }"#;
        let page: SnapshotsPage = serde_json::from_str(json).unwrap();
        assert!(page.has_next());
        assert_eq!(page.meta.as_ref().map(|m| m.total), Some(30));

        let snaps: Vec<Snapshot> = page.snapshots.into_iter().map(Snapshot::from).collect();
        assert_eq!(snaps[0].id, SnapshotId("7938206".into()));
        assert_eq!(snaps[0].regions, vec!["nyc3".to_string()]);
        assert_eq!(
            snaps[1].id,
            SnapshotId("fbe805e8-866b-11e6-96bf-000f53315a41".into())
        );
        assert_eq!(snaps[1].size_gigabytes, 0.0);
    }

    #[test]
    fn last_page_has_no_next() {
        let page: SnapshotsPage =
            serde_json::from_str(r#"{"snapshots": [], "links": {}, "meta": {"total": 0}}"#).unwrap();
        assert!(!page.has_next());
    }

    #[test]
    fn snapshot_request_body() {
        let body = serde_json::to_value(DropletActionRequest::snapshot("nightly")).unwrap();
        assert_eq!(body, serde_json::json!({"type": "snapshot", "name": "nightly"}));
    }
}
