//! Health reporting errors.

use std::path::PathBuf;

use thiserror::Error;

use dropletops_api::ApiError;
use dropletops_core::{DropletId, Severity};

/// Result type alias for health operations.
pub type HealthResult<T> = Result<T, HealthError>;

/// Errors from health reporting.
///
/// Probe failures are not errors: they are recorded as unhealthy
/// services with status 0.
#[derive(Debug, Error)]
pub enum HealthError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("failed to fetch droplet {droplet}: {source}")]
    Droplet {
        droplet: DropletId,
        #[source]
        source: ApiError,
    },

    #[error("failed to encode health report: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl HealthError {
    pub fn severity(&self) -> Severity {
        match self {
            HealthError::Client(_) => Severity::Misconfiguration,
            HealthError::Droplet { source, .. } => source.severity(),
            HealthError::Encode(_) => Severity::Fatal,
            HealthError::Write { .. } => Severity::Tolerated,
        }
    }
}
