//! Error severity and configuration errors.

use std::path::PathBuf;

use thiserror::Error;

/// How bad a failure is, independent of which crate raised it.
///
/// Callers decide the policy: the CLI aborts on anything but
/// `Tolerated`, tests simply assert on the class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Missing credential, host, key or otherwise unusable configuration.
    Misconfiguration,
    /// An operation that the workflow cannot continue past.
    Fatal,
    /// Logged and folded into the final result; the workflow continues.
    Tolerated,
}

impl Severity {
    /// Process exit code for an invocation that ended with this severity.
    pub fn exit_code(self) -> u8 {
        match self {
            Severity::Misconfiguration | Severity::Fatal => 1,
            Severity::Tolerated => 0,
        }
    }
}

/// Result type alias for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while loading or resolving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("environment variable {0} is not set")]
    MissingEnv(&'static str),

    #[error("droplet id is not configured (set DROPLET_ID or [droplet].id)")]
    MissingDropletId,

    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

impl ConfigError {
    pub fn severity(&self) -> Severity {
        Severity::Misconfiguration
    }
}
