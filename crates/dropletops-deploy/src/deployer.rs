//! Deployment driver.

use tracing::{error, info};

use crate::error::{DeployError, DeployResult};
use crate::executor::{CommandOutput, RemoteExecutor};
use crate::plan::{DeployPlan, SIMULATED_STEPS};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployOutcome {
    /// Nothing was contacted; these are the steps a real run performs.
    Simulated { steps: Vec<&'static str> },
    /// The remote script exited 0.
    Completed { output: CommandOutput },
}

pub struct Deployer<'a, E: RemoteExecutor + ?Sized> {
    executor: &'a E,
}

impl<'a, E: RemoteExecutor + ?Sized> Deployer<'a, E> {
    pub fn new(executor: &'a E) -> Self {
        Self { executor }
    }

    /// Deploy `plan`, or only describe it when `simulate` is set.
    ///
    /// Without `simulate`, a plan lacking HOST or KEY_PATH is a
    /// [`DeployError::MissingTarget`]. A non-zero remote exit is
    /// [`DeployError::RemoteFailed`].
    pub async fn run(&self, plan: &DeployPlan, simulate: bool) -> DeployResult<DeployOutcome> {
        if simulate {
            info!(app = %plan.app, version = %plan.version, env = %plan.env, "simulating deploy");
            return Ok(DeployOutcome::Simulated {
                steps: SIMULATED_STEPS.to_vec(),
            });
        }

        let target = plan.require_target()?;
        info!(
            app = %plan.app,
            version = %plan.version,
            env = %plan.env,
            host = %target.host,
            "deploying"
        );

        let output = self.executor.run(target, &plan.script()).await?;
        if !output.success() {
            error!(exit_code = ?output.exit_code, host = %target.host, "deploy script failed");
            return Err(DeployError::RemoteFailed {
                code: output.exit_code,
                stdout: output.stdout,
                stderr: output.stderr.trim_end().to_string(),
            });
        }

        info!(host = %target.host, "deploy completed");
        Ok(DeployOutcome::Completed { output })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use dropletops_core::Severity;
    use dropletops_core::config::DeployConfig;

    use crate::plan::DeployTarget;

    struct Recording {
        reply: CommandOutput,
        runs: Mutex<Vec<(String, String)>>,
    }

    impl Recording {
        fn replying(exit_code: u32, stderr: &str) -> Self {
            Self::with_output(exit_code, "Up 10 seconds\n", stderr)
        }

        fn with_output(exit_code: u32, stdout: &str, stderr: &str) -> Self {
            Self {
                reply: CommandOutput {
                    stdout: stdout.to_string(),
                    stderr: stderr.to_string(),
                    exit_code: Some(exit_code),
                },
                runs: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl RemoteExecutor for Recording {
        async fn run(&self, target: &DeployTarget, script: &str) -> DeployResult<CommandOutput> {
            self.runs
                .lock()
                .unwrap()
                .push((target.addr(), script.to_string()));
            Ok(self.reply.clone())
        }
    }

    fn plan(host: Option<&str>) -> DeployPlan {
        let config = DeployConfig {
            host: host.map(str::to_string),
            key_path: Some(PathBuf::from("/keys/deploy")),
            port: 2222,
            ..DeployConfig::default()
        };
        DeployPlan::from_config(&config, Duration::from_secs(10))
    }

    #[tokio::test]
    async fn runs_script_on_target() {
        let executor = Recording::replying(0, "");
        let outcome = Deployer::new(&executor)
            .run(&plan(Some("203.0.113.10")), false)
            .await
            .unwrap();

        assert!(matches!(outcome, DeployOutcome::Completed { ref output } if output.success()));
        let runs = executor.runs.lock().unwrap();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].0, "203.0.113.10:2222");
        assert!(runs[0].1.starts_with("set -e\n"));
    }

    #[tokio::test]
    async fn non_zero_exit_is_fatal() {
        let executor = Recording::with_output(
            1,
            "Backing up current state\nPulling latest code\n",
            "fatal: couldn't find remote ref main\n",
        );
        let err = Deployer::new(&executor)
            .run(&plan(Some("203.0.113.10")), false)
            .await
            .unwrap_err();

        match &err {
            DeployError::RemoteFailed {
                code,
                stdout,
                stderr,
            } => {
                assert_eq!(*code, Some(1));
                assert!(stdout.ends_with("Pulling latest code\n"));
                assert_eq!(stderr, "fatal: couldn't find remote ref main");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(err.severity(), Severity::Fatal);
    }

    #[tokio::test]
    async fn missing_host_without_simulate_is_misconfiguration() {
        let executor = Recording::replying(0, "");
        let err = Deployer::new(&executor)
            .run(&plan(None), false)
            .await
            .unwrap_err();
        assert!(matches!(err, DeployError::MissingTarget("HOST")));
        assert!(executor.runs.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn simulate_never_contacts_the_host() {
        let executor = Recording::replying(0, "");
        for host in [None, Some("203.0.113.10")] {
            let outcome = Deployer::new(&executor).run(&plan(host), true).await.unwrap();
            assert_eq!(
                outcome,
                DeployOutcome::Simulated {
                    steps: SIMULATED_STEPS.to_vec()
                }
            );
        }
        assert!(executor.runs.lock().unwrap().is_empty());
    }
}
