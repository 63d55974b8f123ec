//! `dropletops.toml` configuration with environment overrides.
//!
//! Every section is optional. Values are resolved in three layers:
//! built-in defaults, then the TOML file, then environment variables.
//! The API token is only ever read from the environment.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::duration::parse_duration;
use crate::error::{ConfigError, ConfigResult};
use crate::types::{DropletId, RetentionPolicy};

/// File looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "dropletops.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OpsConfig {
    pub api: ApiConfig,
    pub droplet: DropletConfig,
    pub backup: BackupConfig,
    pub snapshot: SnapshotConfig,
    pub health: HealthConfig,
    pub healthcheck: HealthcheckConfig,
    pub local_snapshot: LocalSnapshotConfig,
    pub deploy: DeployConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout: String,
    /// Populated from `DO_TOKEN` only.
    #[serde(skip)]
    pub token: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.digitalocean.com".to_string(),
            timeout: "30s".to_string(),
            token: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DropletConfig {
    pub id: Option<u64>,
}

/// Resolved snapshot settings: name prefix, retention and poll timing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotPlan {
    pub name_prefix: String,
    pub retention: RetentionPolicy,
    pub poll_interval: Duration,
    /// Overall deadline; `None` waits until a terminal state.
    pub timeout: Option<Duration>,
}

/// `[backup]`: the unattended daily backup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackupConfig {
    pub name_prefix: String,
    pub keep_last: usize,
    pub poll_interval: String,
    pub timeout: Option<String>,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            name_prefix: "ecotachos-auto-backup".to_string(),
            keep_last: 5,
            poll_interval: "15s".to_string(),
            timeout: Some("30m".to_string()),
        }
    }
}

impl BackupConfig {
    pub fn plan(&self) -> ConfigResult<SnapshotPlan> {
        plan(
            &self.name_prefix,
            self.keep_last,
            &self.poll_interval,
            self.timeout.as_deref(),
        )
    }
}

/// `[snapshot]`: on-demand snapshots and `cleanup`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    pub name_prefix: String,
    pub keep_last: usize,
    pub poll_interval: String,
    pub timeout: Option<String>,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            name_prefix: "ecotachos-backup".to_string(),
            keep_last: 3,
            poll_interval: "10s".to_string(),
            timeout: None,
        }
    }
}

impl SnapshotConfig {
    pub fn plan(&self) -> ConfigResult<SnapshotPlan> {
        plan(
            &self.name_prefix,
            self.keep_last,
            &self.poll_interval,
            self.timeout.as_deref(),
        )
    }
}

fn plan(
    name_prefix: &str,
    keep_last: usize,
    poll_interval: &str,
    timeout: Option<&str>,
) -> ConfigResult<SnapshotPlan> {
    let interval = duration_value("poll_interval", poll_interval)?;
    if interval.is_zero() {
        return Err(ConfigError::InvalidValue {
            key: "poll_interval",
            value: poll_interval.to_string(),
        });
    }
    Ok(SnapshotPlan {
        name_prefix: name_prefix.to_string(),
        retention: RetentionPolicy::keep_last(keep_last),
        poll_interval: interval,
        timeout: timeout.map(|t| duration_value("timeout", t)).transpose()?,
    })
}

/// A service endpoint probed by the health report, relative to the
/// droplet's public IP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceTarget {
    pub name: String,
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    pub timeout: String,
    pub report_dir: PathBuf,
    pub services: Vec<ServiceTarget>,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            timeout: "10s".to_string(),
            report_dir: PathBuf::from("."),
            services: vec![
                ServiceTarget {
                    name: "Frontend".to_string(),
                    path: "/".to_string(),
                },
                ServiceTarget {
                    name: "Backend API".to_string(),
                    path: "/api/ia/health/".to_string(),
                },
            ],
        }
    }
}

impl HealthConfig {
    pub fn timeout(&self) -> ConfigResult<Duration> {
        duration_value("health.timeout", &self.timeout)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthcheckConfig {
    pub url: Option<String>,
    pub timeout: String,
    pub log_dir: PathBuf,
}

impl Default for HealthcheckConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout: "5s".to_string(),
            log_dir: PathBuf::from("logs"),
        }
    }
}

impl HealthcheckConfig {
    pub fn timeout(&self) -> ConfigResult<Duration> {
        duration_value("healthcheck.timeout", &self.timeout)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalSnapshotConfig {
    pub dir: PathBuf,
}

impl Default for LocalSnapshotConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("snapshots"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    pub env: String,
    pub app: String,
    pub version: String,
    pub host: Option<String>,
    pub user: String,
    pub key_path: Option<PathBuf>,
    pub port: u16,
    pub app_dir: String,
    pub connect_timeout: String,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            env: "dev".to_string(),
            app: "ecotachos".to_string(),
            version: "v0.1.0".to_string(),
            host: None,
            user: "root".to_string(),
            key_path: None,
            port: 22,
            app_dir: "/var/www/ecotachostec-backend".to_string(),
            connect_timeout: "10s".to_string(),
        }
    }
}

impl DeployConfig {
    pub fn connect_timeout(&self) -> ConfigResult<Duration> {
        duration_value("deploy.connect_timeout", &self.connect_timeout)
    }
}

impl OpsConfig {
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration for a process.
    ///
    /// An explicit `path` must exist. Without one, `dropletops.toml` in the
    /// working directory is used when present. Environment overrides are
    /// applied last.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::from_file(default_path)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Override values from environment variables.
    ///
    /// Empty variables count as unset.
    pub fn apply_env<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(token) = get("DO_TOKEN") {
            self.api.token = Some(token);
        }
        if let Some(url) = get("DO_API_URL") {
            self.api.base_url = url;
        }
        if let Some(id) = get("DROPLET_ID") {
            let parsed = id
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidValue {
                    key: "DROPLET_ID",
                    value: id.clone(),
                })?;
            self.droplet.id = Some(parsed);
        }
        if let Some(dir) = get("SNAPSHOT_DIR") {
            self.local_snapshot.dir = PathBuf::from(dir);
        }
        if let Some(url) = get("HEALTH_URL") {
            self.healthcheck.url = Some(url);
        }
        if let Some(dir) = get("HEALTH_LOG_DIR") {
            self.healthcheck.log_dir = PathBuf::from(dir);
        }
        if let Some(dir) = get("HEALTH_REPORT_DIR") {
            self.health.report_dir = PathBuf::from(dir);
        }

        let deploy = &mut self.deploy;
        if let Some(v) = get("ENV") {
            deploy.env = v;
        }
        if let Some(v) = get("APP") {
            deploy.app = v;
        }
        if let Some(v) = get("VERSION") {
            deploy.version = v;
        }
        if let Some(v) = get("HOST") {
            deploy.host = Some(v);
        }
        if let Some(v) = get("USER") {
            deploy.user = v;
        }
        if let Some(v) = get("KEY_PATH") {
            deploy.key_path = Some(PathBuf::from(v));
        }
        if let Some(v) = get("PORT") {
            deploy.port = v.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "PORT",
                value: v.clone(),
            })?;
        }
        if let Some(v) = get("APP_DIR") {
            deploy.app_dir = v;
        }

        debug!(
            droplet_id = ?self.droplet.id,
            api = %self.api.base_url,
            token_set = self.api.token.is_some(),
            "configuration resolved"
        );
        Ok(())
    }

    /// The API token, required by every provider-facing command.
    pub fn token(&self) -> ConfigResult<&str> {
        self.api
            .token
            .as_deref()
            .ok_or(ConfigError::MissingEnv("DO_TOKEN"))
    }

    pub fn droplet_id(&self) -> ConfigResult<DropletId> {
        self.droplet
            .id
            .map(DropletId)
            .ok_or(ConfigError::MissingDropletId)
    }

    pub fn api_timeout(&self) -> ConfigResult<Duration> {
        duration_value("api.timeout", &self.api.timeout)
    }
}

fn duration_value(key: &'static str, raw: &str) -> ConfigResult<Duration> {
    parse_duration(raw).ok_or_else(|| ConfigError::InvalidValue {
        key,
        value: raw.to_string(),
    })
}
