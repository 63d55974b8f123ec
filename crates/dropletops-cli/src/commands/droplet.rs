use std::fmt::Write as _;

use chrono::SecondsFormat;

use dropletops_api::ComputeApi;
use dropletops_core::{Droplet, OpsConfig, Snapshot};

use super::provider;

pub async fn info(config: &OpsConfig) -> anyhow::Result<u8> {
    let (client, droplet) = provider(config)?;
    let droplet = client.get_droplet(droplet).await?;
    print!("{}", render_info(&droplet));
    Ok(0)
}

pub async fn metrics(config: &OpsConfig) -> anyhow::Result<u8> {
    let (client, droplet) = provider(config)?;
    let droplet = client.get_droplet(droplet).await?;
    print!("{}", render_metrics(&droplet));
    Ok(0)
}

pub async fn list(config: &OpsConfig) -> anyhow::Result<u8> {
    let (client, droplet) = provider(config)?;
    let snapshots = client.list_snapshots(droplet).await?;
    print!("{}", render_snapshots(&snapshots));
    Ok(0)
}

fn render_info(d: &Droplet) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== Droplet {} ===", d.id);
    let _ = writeln!(out, "Name:       {}", d.name);
    let _ = writeln!(out, "Status:     {}", d.status);
    let _ = writeln!(out, "Region:     {} ({})", d.region.name, d.region.slug);
    let _ = writeln!(out, "Memory:     {} MB", d.memory_mb);
    let _ = writeln!(out, "vCPUs:      {}", d.vcpus);
    let _ = writeln!(out, "Disk:       {} GB", d.disk_gb);
    let _ = writeln!(out, "Public IP:  {}", d.public_ip().unwrap_or("N/A"));
    let _ = writeln!(
        out,
        "Created:    {}",
        d.created_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    );
    out
}

fn render_metrics(d: &Droplet) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== Droplet metrics ===");
    let _ = writeln!(out, "The DigitalOcean API does not expose detailed metrics;");
    let _ = writeln!(out, "use the control panel or an agent such as Prometheus.");
    let _ = writeln!(out);
    let _ = writeln!(out, "Status: {}", d.status);
    let _ = writeln!(out, "Allocated resources:");
    let _ = writeln!(out, "  vCPUs: {}", d.vcpus);
    let _ = writeln!(out, "  RAM:   {} MB", d.memory_mb);
    let _ = writeln!(out, "  Disk:  {} GB", d.disk_gb);
    out
}

fn render_snapshots(snapshots: &[Snapshot]) -> String {
    if snapshots.is_empty() {
        return "No snapshots available\n".to_string();
    }
    let mut out = String::new();
    let _ = writeln!(out, "=== Snapshots ({}) ===", snapshots.len());
    for (i, s) in snapshots.iter().enumerate() {
        let _ = writeln!(out);
        let _ = writeln!(out, "[{}] {}", i + 1, s.name);
        let _ = writeln!(out, "    ID:      {}", s.id);
        let _ = writeln!(out, "    Size:    {:.2} GB", s.size_gigabytes);
        let _ = writeln!(
            out,
            "    Created: {}",
            s.created_at.to_rfc3339_opts(SecondsFormat::Secs, true)
        );
        let _ = writeln!(out, "    Regions: {}", s.regions.join(", "));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use dropletops_core::{DropletId, NetworkV4, Region, SnapshotId};

    fn droplet() -> Droplet {
        Droplet {
            id: DropletId(547986490),
            name: "ecotachos-prod".to_string(),
            status: "active".to_string(),
            memory_mb: 2048,
            vcpus: 2,
            disk_gb: 50,
            region: Region {
                slug: "nyc1".to_string(),
                name: "New York 1".to_string(),
            },
            created_at: Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
            networks_v4: vec![NetworkV4 {
                ip_address: "203.0.113.10".to_string(),
                kind: "public".to_string(),
            }],
        }
    }

    #[test]
    fn info_lists_every_field() {
        let text = render_info(&droplet());
        for needle in [
            "ecotachos-prod",
            "active",
            "New York 1",
            "2048 MB",
            "vCPUs:      2",
            "50 GB",
            "203.0.113.10",
            "2026-03-01T12:00:00Z",
        ] {
            assert!(text.contains(needle), "missing {needle:?} in:\n{text}");
        }
    }

    #[test]
    fn info_without_network() {
        let mut d = droplet();
        d.networks_v4.clear();
        assert!(render_info(&d).contains("Public IP:  N/A"));
    }

    #[test]
    fn metrics_note_and_resources() {
        let text = render_metrics(&droplet());
        assert!(text.contains("does not expose detailed metrics"));
        assert!(text.contains("RAM:   2048 MB"));
    }

    #[test]
    fn snapshot_listing() {
        assert_eq!(render_snapshots(&[]), "No snapshots available\n");

        let snapshots = vec![Snapshot {
            id: SnapshotId::from(1234_u64),
            name: "ecotachos-auto-backup-2026-10-19".to_string(),
            size_gigabytes: 3.456,
            created_at: Utc.with_ymd_and_hms(2026, 10, 19, 3, 5, 0).unwrap(),
            regions: vec!["nyc1".to_string(), "sfo3".to_string()],
        }];
        let text = render_snapshots(&snapshots);
        assert!(text.contains("[1] ecotachos-auto-backup-2026-10-19"));
        assert!(text.contains("ID:      1234"));
        assert!(text.contains("Size:    3.46 GB"));
        assert!(text.contains("Regions: nyc1, sfo3"));
    }
}
