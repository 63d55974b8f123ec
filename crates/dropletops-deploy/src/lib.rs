//! dropletops-deploy — redeploy the application stack over SSH.
//!
//! A [`DeployPlan`] is resolved from configuration, rendered into a single
//! `set -e` shell script, and handed to a [`RemoteExecutor`]. The
//! production executor is [`SshExecutor`] (russh, public-key auth); tests
//! substitute a recording fake.
//!
//! ```text
//! Deployer
//!   ├── simulate → print SIMULATED_STEPS, touch nothing
//!   └── deploy   → DeployPlan::script() → RemoteExecutor::run()
//!                    └── non-zero exit → DeployError::RemoteFailed
//! ```

pub mod deployer;
pub mod error;
pub mod executor;
pub mod plan;
pub mod ssh;

pub use deployer::{DeployOutcome, Deployer};
pub use error::{DeployError, DeployResult};
pub use executor::{CommandOutput, RemoteExecutor};
pub use plan::{DeployPlan, DeployTarget, SIMULATED_STEPS};
pub use ssh::SshExecutor;
