use dropletops_core::OpsConfig;
use dropletops_deploy::{DeployError, DeployOutcome, DeployPlan, Deployer, SshExecutor};

pub async fn deploy(config: &OpsConfig, simulate: bool) -> anyhow::Result<u8> {
    let plan = DeployPlan::from_config(&config.deploy, config.deploy.connect_timeout()?);
    println!("{}...", plan.banner());

    let executor = SshExecutor::new(plan.connect_timeout);
    let outcome = match Deployer::new(&executor).run(&plan, simulate).await {
        Ok(outcome) => outcome,
        Err(e) => {
            print_partial_output(&e);
            return Err(e.into());
        }
    };
    match outcome {
        DeployOutcome::Simulated { steps } => {
            println!("Simulation mode: nothing is contacted.");
            for step in steps {
                println!("- {step}");
            }
        }
        DeployOutcome::Completed { output } => {
            print!("{}", output.stdout);
            if !output.stderr.is_empty() {
                eprint!("{}", output.stderr);
            }
            println!("Remote deploy completed.");
        }
    }
    Ok(0)
}

/// Show how far the remote script got before it stopped.
fn print_partial_output(err: &DeployError) {
    if let DeployError::RemoteFailed { stdout, .. } = err {
        print!("{stdout}");
    }
}
