//! Deployment plan and remote script.

use std::path::PathBuf;
use std::time::Duration;

use dropletops_core::config::DeployConfig;

use crate::error::{DeployError, DeployResult};

/// Steps printed in simulation mode.
pub const SIMULATED_STEPS: [&str; 4] = [
    "Connect to server",
    "Update repos",
    "Restart services",
    "Validate state",
];

/// Post-deploy probes, run best-effort on the host.
const HEALTH_PROBES: [&str; 2] = [
    "http://localhost:8000/api/ia/health/",
    "http://localhost/api/ia/health/",
];

/// Where and as whom to connect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployTarget {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub key_path: PathBuf,
}

impl DeployTarget {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone)]
pub struct DeployPlan {
    pub env: String,
    pub app: String,
    pub version: String,
    pub app_dir: String,
    pub connect_timeout: Duration,
    /// `None` when HOST or KEY_PATH is missing; only simulation is possible.
    pub target: Option<DeployTarget>,
    missing: &'static str,
}

impl DeployPlan {
    pub fn from_config(config: &DeployConfig, connect_timeout: Duration) -> Self {
        let host = config.host.as_deref().map(str::trim).filter(|h| !h.is_empty());
        let (target, missing) = match (host, &config.key_path) {
            (Some(host), Some(key_path)) => (
                Some(DeployTarget {
                    host: host.to_string(),
                    port: config.port,
                    user: config.user.clone(),
                    key_path: key_path.clone(),
                }),
                "",
            ),
            (None, _) => (None, "HOST"),
            (Some(_), None) => (None, "KEY_PATH"),
        };
        Self {
            env: config.env.clone(),
            app: config.app.clone(),
            version: config.version.clone(),
            app_dir: config.app_dir.clone(),
            connect_timeout,
            target,
            missing,
        }
    }

    /// The connection target, or the name of the first missing setting.
    pub fn require_target(&self) -> DeployResult<&DeployTarget> {
        self.target
            .as_ref()
            .ok_or(DeployError::MissingTarget(self.missing))
    }

    /// `Deploying <app> <version> to <env>`.
    pub fn banner(&self) -> String {
        format!("Deploying {} {} to {}", self.app, self.version, self.env)
    }

    /// Shell script executed on the host.
    pub fn script(&self) -> String {
        let dir = shell_quote(&self.app_dir);
        let compose_dir = shell_quote(&format!("{}/docker", self.app_dir.trim_end_matches('/')));
        let backup = shell_quote(&format!("{}.backup.", self.app_dir.trim_end_matches('/')));

        let mut script = format!(
            "set -e\n\
             if [ -d {dir} ]; then\n\
             \x20 sudo cp -r {dir} {backup}$(date +%Y%m%d_%H%M%S)\n\
             fi\n\
             cd {dir}\n\
             git fetch origin\n\
             git reset --hard origin/main || git reset --hard origin/master\n\
             \n\
             cd {compose_dir}\n\
             sudo docker-compose down\n\
             sudo docker-compose build --no-cache\n\
             sudo docker-compose up -d\n\
             sleep 10\n\
             sudo docker-compose ps\n"
        );
        for url in HEALTH_PROBES {
            script.push_str(&format!("curl -f {url} || true\n"));
        }
        script
    }
}

/// Single-quote `s` for sh unless it is made of path-safe characters only.
fn shell_quote(s: &str) -> String {
    let safe = !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '.' | '_' | '-'));
    if safe {
        s.to_string()
    } else {
        format!("'{}'", s.replace('\'', r"'\''"))
    }
}
