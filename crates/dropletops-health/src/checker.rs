//! HTTP probe logic.
//!
//! A probe is a single GET with a fixed timeout. Redirects are followed;
//! the final status decides the outcome.

use std::time::Duration;

use chrono::TimeDelta;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{HealthError, HealthResult};

/// `true` for statuses in `[200, 400)`.
pub fn classify(status: u16) -> bool {
    (200..400).contains(&status)
}

/// Result of probing one service endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceHealth {
    pub service: String,
    pub url: String,
    /// HTTP status, or 0 when the request never got a response.
    pub status: u16,
    pub healthy: bool,
}

/// Issues health probes with a shared client and timeout.
#[derive(Debug, Clone)]
pub struct HttpProber {
    client: reqwest::Client,
}

impl HttpProber {
    pub fn new(timeout: Duration) -> HealthResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("dropletops-health/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(HealthError::Client)?;
        Ok(Self { client })
    }

    /// GET `url` and return the response status.
    pub async fn status(&self, url: &str) -> Result<StatusCode, reqwest::Error> {
        let resp = self.client.get(url).send().await?;
        Ok(resp.status())
    }

    /// Probe a named service. Never fails: a network error is an
    /// unhealthy result with status 0.
    pub async fn probe(&self, service: &str, url: &str) -> ServiceHealth {
        let status = match self.status(url).await {
            Ok(status) => status.as_u16(),
            Err(e) => {
                debug!(error = %e, %url, service, "health probe failed");
                0
            }
        };
        let healthy = classify(status);
        if !healthy && status != 0 {
            debug!(status, %url, service, "health probe returned unhealthy status");
        }
        ServiceHealth {
            service: service.to_string(),
            url: url.to_string(),
            status,
            healthy,
        }
    }
}

/// Format an uptime as `"<d>d <h>h <m>m"`, or `"<h>h <m>m"` under a day.
/// Negative spans (clock skew) read as zero.
pub fn format_uptime(uptime: TimeDelta) -> String {
    let minutes_total = uptime.num_minutes().max(0);
    let days = minutes_total / (24 * 60);
    let hours = (minutes_total / 60) % 24;
    let minutes = minutes_total % 60;

    if days > 0 {
        format!("{days}d {hours}h {minutes}m")
    } else {
        format!("{hours}h {minutes}m")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_boundaries() {
        for status in [200, 204, 301, 302, 399] {
            assert!(classify(status), "{status} should be healthy");
        }
        for status in [0, 100, 199, 400, 404, 500, 503] {
            assert!(!classify(status), "{status} should be unhealthy");
        }
    }

    #[test]
    fn uptime_with_days() {
        let uptime = TimeDelta::days(3) + TimeDelta::hours(4) + TimeDelta::minutes(5);
        assert_eq!(format_uptime(uptime), "3d 4h 5m");
    }

    #[test]
    fn uptime_under_a_day() {
        assert_eq!(format_uptime(TimeDelta::minutes(125)), "2h 5m");
        assert_eq!(format_uptime(TimeDelta::seconds(59)), "0h 0m");
    }

    #[test]
    fn negative_uptime_is_zero() {
        assert_eq!(format_uptime(TimeDelta::minutes(-10)), "0h 0m");
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_status_zero() {
        let prober = HttpProber::new(Duration::from_secs(2)).unwrap();
        // Port 1 on loopback refuses connections.
        let health = prober.probe("Frontend", "http://127.0.0.1:1/").await;
        assert_eq!(health.status, 0);
        assert!(!health.healthy);
        assert_eq!(health.service, "Frontend");
    }
}
