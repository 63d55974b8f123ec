//! Droplet health report.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use dropletops_api::ComputeApi;
use dropletops_core::config::ServiceTarget;
use dropletops_core::naming::health_report_file;
use dropletops_core::{Droplet, DropletId};

use crate::checker::{HttpProber, ServiceHealth, format_uptime};
use crate::error::{HealthError, HealthResult};

/// Placeholder for a droplet without any IPv4 network.
const NO_IP: &str = "N/A";

/// Droplet section of the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropletStatus {
    pub timestamp: String,
    pub droplet_name: String,
    pub status: String,
    pub ip_address: String,
    pub memory_mb: u64,
    pub cpus: u32,
    pub disk_gb: u64,
    pub region: String,
    pub uptime: String,
    /// `true` iff the droplet status is `active`.
    pub healthy: bool,
}

impl DropletStatus {
    pub fn from_droplet(droplet: &Droplet, now: DateTime<Utc>) -> Self {
        Self {
            timestamp: now.to_rfc3339_opts(SecondsFormat::Secs, true),
            droplet_name: droplet.name.clone(),
            status: droplet.status.clone(),
            ip_address: droplet.public_ip().unwrap_or(NO_IP).to_string(),
            memory_mb: droplet.memory_mb,
            cpus: droplet.vcpus,
            disk_gb: droplet.disk_gb,
            region: droplet.region.name.clone(),
            uptime: format_uptime(now - droplet.created_at),
            healthy: droplet.is_active(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    pub droplet: DropletStatus,
    pub services: Vec<ServiceHealth>,
    /// Droplet health AND every service's health.
    pub healthy: bool,
}

impl HealthReport {
    pub fn new(droplet: DropletStatus, services: Vec<ServiceHealth>) -> Self {
        let healthy = droplet.healthy && services.iter().all(|s| s.healthy);
        Self {
            droplet,
            services,
            healthy,
        }
    }

    /// Write the report as pretty JSON to
    /// `<dir>/health-report-<YYYY-MM-DD-HH-MM>.json`.
    pub fn save(&self, dir: &Path, now: DateTime<Utc>) -> HealthResult<PathBuf> {
        let path = dir.join(health_report_file(now));
        let json = serde_json::to_string_pretty(self)?;
        std::fs::create_dir_all(dir)
            .and_then(|()| std::fs::write(&path, json))
            .map_err(|source| HealthError::Write {
                path: path.clone(),
                source,
            })?;
        info!(path = %path.display(), "health report saved");
        Ok(path)
    }

    /// Human-readable summary for the terminal.
    pub fn summary(&self) -> String {
        let d = &self.droplet;
        let mut out = String::new();
        let _ = writeln!(out, "=== Health report: {} ===", d.droplet_name);
        let _ = writeln!(out, "Timestamp:  {}", d.timestamp);
        let _ = writeln!(out, "Status:     {} ({})", d.status, health_text(d.healthy));
        let _ = writeln!(out, "Public IP:  {}", d.ip_address);
        let _ = writeln!(out, "Region:     {}", d.region);
        let _ = writeln!(out, "Uptime:     {}", d.uptime);
        let _ = writeln!(out);
        let _ = writeln!(out, "CPUs:   {} vCPUs", d.cpus);
        let _ = writeln!(out, "RAM:    {} MB", d.memory_mb);
        let _ = writeln!(out, "Disk:   {} GB", d.disk_gb);
        let _ = writeln!(out);
        let _ = writeln!(out, "Services:");
        for svc in &self.services {
            let _ = writeln!(
                out,
                "  {:<9} {} (HTTP {})",
                health_text(svc.healthy),
                svc.service,
                svc.status
            );
        }
        let _ = writeln!(out);
        if self.healthy {
            let _ = writeln!(out, "All systems operational");
        } else {
            let _ = writeln!(out, "Some services are degraded");
        }
        out
    }
}

fn health_text(healthy: bool) -> &'static str {
    if healthy { "HEALTHY" } else { "UNHEALTHY" }
}

/// Builds a [`HealthReport`] from the provider's view of the droplet and
/// a probe of each configured service.
pub struct HealthReporter<'a, A: ComputeApi + ?Sized> {
    api: &'a A,
    droplet: DropletId,
    prober: &'a HttpProber,
    services: &'a [ServiceTarget],
}

impl<'a, A: ComputeApi + ?Sized> HealthReporter<'a, A> {
    pub fn new(
        api: &'a A,
        droplet: DropletId,
        prober: &'a HttpProber,
        services: &'a [ServiceTarget],
    ) -> Self {
        Self {
            api,
            droplet,
            prober,
            services,
        }
    }

    /// Fetch the droplet, then probe `http://<public-ip><path>` for every
    /// service in order.
    pub async fn run(&self, now: DateTime<Utc>) -> HealthResult<HealthReport> {
        let droplet = self
            .api
            .get_droplet(self.droplet)
            .await
            .map_err(|source| HealthError::Droplet {
                droplet: self.droplet,
                source,
            })?;
        let status = DropletStatus::from_droplet(&droplet, now);

        let mut services = Vec::with_capacity(self.services.len());
        for target in self.services {
            let url = format!("http://{}{}", status.ip_address, target.path);
            let health = self.prober.probe(&target.name, &url).await;
            if !health.healthy {
                warn!(service = %health.service, url = %health.url, status = health.status, "service unhealthy");
            }
            services.push(health);
        }

        let report = HealthReport::new(status, services);
        info!(
            droplet = %self.droplet,
            healthy = report.healthy,
            services = report.services.len(),
            "health report built"
        );
        Ok(report)
    }
}
