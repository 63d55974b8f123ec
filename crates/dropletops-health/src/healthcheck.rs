//! Single-URL health check with a JSON status log.

use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::UNHEALTHY_EXIT;
use crate::checker::{HttpProber, classify};
use crate::error::{HealthError, HealthResult};

/// File name of the status log inside the log directory.
pub const LOG_FILE: &str = "health.json";

/// One entry of `health.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthLog {
    pub status: String,
    pub code: u16,
    /// RFC 3339, UTC.
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// No URL configured; treated as healthy.
    Skipped,
    /// `status` is the full status line, e.g. `200 OK`.
    Healthy { code: u16, status: String },
    Unhealthy { code: u16, status: String },
    /// No response at all.
    Unreachable { error: String },
}

impl CheckOutcome {
    /// Line printed to stdout.
    pub fn message(&self) -> String {
        match self {
            CheckOutcome::Skipped => "OK".to_string(),
            CheckOutcome::Healthy { status, .. } => format!("OK: {status}"),
            CheckOutcome::Unhealthy { status, .. } => format!("UNHEALTHY: {status}"),
            CheckOutcome::Unreachable { error } => format!("ERROR: {error}"),
        }
    }

    pub fn log_entry(&self, now: DateTime<Utc>) -> HealthLog {
        let (status, code) = match self {
            CheckOutcome::Skipped => ("OK".to_string(), 200),
            CheckOutcome::Healthy { code, .. } => ("OK".to_string(), *code),
            CheckOutcome::Unhealthy { code, .. } => ("UNHEALTHY".to_string(), *code),
            CheckOutcome::Unreachable { error } => (error.clone(), 0),
        };
        HealthLog {
            status,
            code,
            timestamp: now.to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }

    /// 0 when healthy or skipped, 1 when unreachable, 2 when unhealthy.
    pub fn exit_code(&self) -> u8 {
        match self {
            CheckOutcome::Skipped | CheckOutcome::Healthy { .. } => 0,
            CheckOutcome::Unreachable { .. } => 1,
            CheckOutcome::Unhealthy { .. } => UNHEALTHY_EXIT,
        }
    }
}

/// Probe `url`, or skip when it is absent or blank.
pub async fn check(prober: &HttpProber, url: Option<&str>) -> CheckOutcome {
    let Some(url) = url.map(str::trim).filter(|u| !u.is_empty()) else {
        info!("no health URL configured");
        return CheckOutcome::Skipped;
    };

    match prober.status(url).await {
        Ok(status) => {
            let code = status.as_u16();
            let line = status.to_string();
            if classify(code) {
                info!(%url, code, "health check passed");
                CheckOutcome::Healthy { code, status: line }
            } else {
                warn!(%url, code, "health check failed");
                CheckOutcome::Unhealthy { code, status: line }
            }
        }
        Err(e) => {
            warn!(%url, error = %e, "health endpoint unreachable");
            CheckOutcome::Unreachable {
                error: e.to_string(),
            }
        }
    }
}

/// Overwrite `<dir>/health.json` with `entry`, creating `dir` if needed.
pub fn write_log(dir: &Path, entry: &HealthLog) -> HealthResult<PathBuf> {
    let path = dir.join(LOG_FILE);
    let json = serde_json::to_string_pretty(entry)?;
    std::fs::create_dir_all(dir)
        .and_then(|()| std::fs::write(&path, json))
        .map_err(|source| HealthError::Write {
            path: path.clone(),
            source,
        })?;
    Ok(path)
}
