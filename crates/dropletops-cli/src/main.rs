//! dropctl — operations CLI for a single DigitalOcean droplet.
//!
//! ```text
//! dropctl info | list | metrics
//! dropctl snapshot --name before-migration
//! dropctl backup --keep 5
//! dropctl health
//! DO_TOKEN=... DROPLET_ID=... dropctl cleanup --keep 3
//! ```
//!
//! Exit codes: 0 success, 1 failure or misconfiguration, 2 unhealthy.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use dropletops_core::{OpsConfig, Severity};

mod commands;

const DEFAULT_LOG_FILTER: &str = "info,dropletops=debug";

#[derive(Parser)]
#[command(
    name = "dropctl",
    about = "Droplet operations: snapshots, health reports, deployment",
    version,
    propagate_version = true
)]
struct Cli {
    /// Config file (default: ./dropletops.toml if present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Droplet id, overriding DROPLET_ID and [droplet].id.
    #[arg(long, global = true)]
    droplet_id: Option<u64>,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show droplet details
    Info,
    /// Create a snapshot and wait for it to finish
    Snapshot {
        /// Snapshot name (default: <prefix>-<YYYY-MM-DD-HH-MM>)
        #[arg(long)]
        name: Option<String>,
    },
    /// List the droplet's snapshots, newest first
    List,
    /// Show status and allocated resources
    Metrics,
    /// Delete snapshots beyond the newest N
    Cleanup {
        /// Snapshots to keep (default: [snapshot].keep_last)
        #[arg(long)]
        keep: Option<usize>,
    },
    /// Daily backup: snapshot, wait with a deadline, then prune
    Backup {
        /// Snapshots to keep (default: [backup].keep_last)
        #[arg(long)]
        keep: Option<usize>,
    },
    /// Write a local snapshot marker file
    LocalSnapshot,
    /// Droplet and service health report
    Health,
    /// Probe HEALTH_URL and record the result in health.json
    Healthcheck,
    /// Redeploy the application over SSH
    Deploy {
        /// Print the steps without connecting
        #[arg(long)]
        simulate: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    match run(cli).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            let severity = severity_of(&e);
            error!(?severity, error = %format!("{e:#}"), "command failed");
            eprintln!("Error: {e:#}");
            ExitCode::from(failure_code(severity))
        }
    }
}

fn init_tracing(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run(cli: Cli) -> anyhow::Result<u8> {
    let mut config = OpsConfig::load(cli.config.as_deref())?;
    if let Some(id) = cli.droplet_id {
        config.droplet.id = Some(id);
    }

    match cli.command {
        Commands::Info => commands::droplet::info(&config).await,
        Commands::List => commands::droplet::list(&config).await,
        Commands::Metrics => commands::droplet::metrics(&config).await,
        Commands::Snapshot { name } => {
            commands::snapshot::snapshot(&config, name.as_deref(), shutdown_signal()).await
        }
        Commands::Backup { keep } => {
            commands::snapshot::backup(&config, keep, shutdown_signal()).await
        }
        Commands::Cleanup { keep } => commands::snapshot::cleanup(&config, keep).await,
        Commands::LocalSnapshot => commands::snapshot::local_snapshot(&config),
        Commands::Health => commands::health::health(&config).await,
        Commands::Healthcheck => commands::health::healthcheck(&config).await,
        Commands::Deploy { simulate } => commands::deploy::deploy(&config, simulate).await,
    }
}

/// Flips to `true` on Ctrl-C. Only installed for commands that wait on the
/// provider, so every other command keeps the default interrupt behavior.
fn shutdown_signal() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
            let _ = tx.send(true);
        }
    });
    rx
}

/// Severity of the first typed error in the chain; untyped errors are fatal.
fn severity_of(err: &anyhow::Error) -> Severity {
    for cause in err.chain() {
        if let Some(e) = cause.downcast_ref::<dropletops_core::ConfigError>() {
            return e.severity();
        }
        if let Some(e) = cause.downcast_ref::<dropletops_api::ApiError>() {
            return e.severity();
        }
        if let Some(e) = cause.downcast_ref::<dropletops_snapshot::SnapshotError>() {
            return e.severity();
        }
        if let Some(e) = cause.downcast_ref::<dropletops_health::HealthError>() {
            return e.severity();
        }
        if let Some(e) = cause.downcast_ref::<dropletops_deploy::DeployError>() {
            return e.severity();
        }
    }
    Severity::Fatal
}

/// An error always exits non-zero, even one classed as tolerated.
fn failure_code(severity: Severity) -> u8 {
    severity.exit_code().max(1)
}
