//! dropletops-core — shared types for the droplet operations toolkit.
//!
//! Holds the domain model (droplets, snapshots, snapshot actions), the
//! `dropletops.toml` + environment configuration layer, and the
//! [`Severity`] classification every error type in the workspace maps to.

pub mod config;
pub mod duration;
pub mod error;
pub mod naming;
pub mod types;

pub use config::OpsConfig;
pub use duration::parse_duration;
pub use error::{ConfigError, ConfigResult, Severity};
pub use types::*;
