//! Error types for provider API calls.

use dropletops_core::Severity;
use thiserror::Error;

/// Result type alias for provider API calls.
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors returned by a [`ComputeApi`](crate::ComputeApi) implementation.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("failed to build http client: {0}")]
    Client(String),

    #[error("request {method} {path} failed: {source}")]
    Transport {
        method: &'static str,
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{method} {path} returned {status}: {message}")]
    Status {
        method: &'static str,
        path: String,
        status: u16,
        message: String,
    },

    #[error("failed to decode response from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ApiError {
    /// Whether the failure is likely to clear up on its own (network
    /// trouble, throttling, provider-side 5xx).
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::Transport { .. } => true,
            ApiError::Status { status, .. } => *status == 429 || *status >= 500,
            ApiError::Client(_) | ApiError::Decode { .. } => false,
        }
    }

    /// HTTP status of a provider rejection, if that is what this is.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            ApiError::Status {
                status: 401 | 403, ..
            }
            | ApiError::Client(_) => Severity::Misconfiguration,
            _ => Severity::Fatal,
        }
    }
}
