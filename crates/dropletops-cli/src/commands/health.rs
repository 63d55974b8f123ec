use chrono::Utc;
use tracing::warn;

use dropletops_core::OpsConfig;
use dropletops_health::{
    HealthReport, HealthReporter, HttpProber, UNHEALTHY_EXIT, check, write_log,
};

use super::provider;

pub async fn health(config: &OpsConfig) -> anyhow::Result<u8> {
    let (client, droplet) = provider(config)?;
    let prober = HttpProber::new(config.health.timeout()?)?;
    let now = Utc::now();

    let report = HealthReporter::new(&client, droplet, &prober, &config.health.services)
        .run(now)
        .await?;
    print!("{}", report.summary());

    match report.save(&config.health.report_dir, now) {
        Ok(path) => println!("Report saved: {}", path.display()),
        Err(e) => warn!(error = %e, "health report not saved"),
    }

    Ok(report_exit_code(&report))
}

fn report_exit_code(report: &HealthReport) -> u8 {
    if report.healthy { 0 } else { UNHEALTHY_EXIT }
}

pub async fn healthcheck(config: &OpsConfig) -> anyhow::Result<u8> {
    let prober = HttpProber::new(config.healthcheck.timeout()?)?;
    let outcome = check(&prober, config.healthcheck.url.as_deref()).await;
    println!("{}", outcome.message());

    if let Err(e) = write_log(&config.healthcheck.log_dir, &outcome.log_entry(Utc::now())) {
        warn!(error = %e, "health log not written");
    }
    Ok(outcome.exit_code())
}
