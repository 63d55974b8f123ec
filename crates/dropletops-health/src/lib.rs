//! dropletops-health — droplet health reporting.
//!
//! Two entry points share one HTTP prober:
//!
//! ```text
//! HealthReporter                         check()
//!   ├── ComputeApi::get_droplet            └── HttpProber::status(HEALTH_URL)
//!   ├── HttpProber::probe per service          → CheckOutcome → HealthLog
//!   └── HealthReport → health-report-*.json
//! ```
//!
//! Classification is a pure function of the HTTP status: anything in
//! `[200, 400)` is healthy, everything else (including a network error,
//! recorded as status 0) is not.

pub mod checker;
pub mod error;
pub mod healthcheck;
pub mod report;

pub use checker::{HttpProber, ServiceHealth, classify, format_uptime};
pub use error::{HealthError, HealthResult};
pub use healthcheck::{CheckOutcome, HealthLog, check, write_log};
pub use report::{DropletStatus, HealthReport, HealthReporter};

/// Process exit code for an invocation that found something unhealthy.
pub const UNHEALTHY_EXIT: u8 = 2;
