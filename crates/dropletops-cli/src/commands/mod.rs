pub mod deploy;
pub mod droplet;
pub mod health;
pub mod snapshot;

use dropletops_api::DigitalOceanClient;
use dropletops_core::{DropletId, OpsConfig};

/// API client and droplet id for commands that talk to the provider.
/// Fails on a missing DO_TOKEN or droplet id before any request is made.
pub fn provider(config: &OpsConfig) -> anyhow::Result<(DigitalOceanClient, DropletId)> {
    let token = config.token()?;
    let droplet = config.droplet_id()?;
    let client = DigitalOceanClient::new(&config.api.base_url, token, config.api_timeout()?)?;
    Ok((client, droplet))
}
