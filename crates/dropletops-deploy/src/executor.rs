//! Remote execution seam.

use async_trait::async_trait;

use crate::error::DeployResult;
use crate::plan::DeployTarget;

/// Collected output of one remote command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    /// `None` when the server closed the channel without an exit status.
    pub exit_code: Option<u32>,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runs a script on a remote host and closes the connection afterwards.
#[async_trait]
pub trait RemoteExecutor: Send + Sync {
    async fn run(&self, target: &DeployTarget, script: &str) -> DeployResult<CommandOutput>;
}
