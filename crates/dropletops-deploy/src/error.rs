//! Deployment errors.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use dropletops_core::Severity;

/// Result type alias for deployment operations.
pub type DeployResult<T> = Result<T, DeployError>;

#[derive(Debug, Error)]
pub enum DeployError {
    #[error("{0} is not set; pass --simulate to only print the steps")]
    MissingTarget(&'static str),

    #[error("failed to read SSH key {path}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode SSH key {path}: {source}")]
    KeyDecode {
        path: PathBuf,
        #[source]
        source: russh_keys::Error,
    },

    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("connection to {addr} timed out after {}s", after.as_secs())]
    ConnectTimeout { addr: String, after: Duration },

    #[error("public key authentication rejected for user {user}")]
    AuthRejected { user: String },

    #[error("ssh error: {0}")]
    Ssh(#[from] russh::Error),

    #[error("remote script failed with exit code {}: {stderr}", exit_label(*.code))]
    RemoteFailed {
        code: Option<u32>,
        /// Output up to the failing step of the `set -e` script.
        stdout: String,
        stderr: String,
    },
}

fn exit_label(code: Option<u32>) -> String {
    code.map_or_else(|| "unknown".to_string(), |c| c.to_string())
}

impl DeployError {
    pub fn severity(&self) -> Severity {
        match self {
            DeployError::MissingTarget(_)
            | DeployError::KeyRead { .. }
            | DeployError::KeyDecode { .. }
            | DeployError::AuthRejected { .. } => Severity::Misconfiguration,
            DeployError::Connect { .. }
            | DeployError::ConnectTimeout { .. }
            | DeployError::Ssh(_)
            | DeployError::RemoteFailed { .. } => Severity::Fatal,
        }
    }
}
