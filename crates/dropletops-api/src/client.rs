//! DigitalOcean v2 REST client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use dropletops_core::{Action, ActionId, Droplet, DropletId, Snapshot, SnapshotId};

use crate::error::{ApiError, ApiResult};
use crate::wire::{
    ActionEnvelope, DropletActionRequest, DropletEnvelope, ErrorBody, SnapshotsPage,
};
use crate::ComputeApi;

/// Page size for snapshot listing. The provider caps it at 200.
const PER_PAGE: usize = 100;

/// Hard stop for pagination in case the provider keeps returning `next`.
const MAX_PAGES: usize = 100;

/// Client for the DigitalOcean API, authenticated with a bearer token.
#[derive(Clone)]
pub struct DigitalOceanClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl DigitalOceanClient {
    /// Create a client against `base_url` (normally
    /// `https://api.digitalocean.com`).
    pub fn new(base_url: &str, token: &str, timeout: Duration) -> ApiResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("dropletops/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Client(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> ApiResult<Response> {
        let method_name = method_str(&method);
        let url = format!("{}{path}", self.base_url);
        debug!(method = method_name, %path, "provider request");

        let mut req = self.http.request(method, &url).bearer_auth(&self.token);
        if let Some(body) = body {
            req = req.json(&body);
        }

        let resp = req.send().await.map_err(|source| ApiError::Transport {
            method: method_name,
            path: path.to_string(),
            source,
        })?;

        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let text = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .map(|b| b.message)
            .unwrap_or_else(|_| status.canonical_reason().unwrap_or("error").to_string());
        warn!(method = method_name, %path, status = status.as_u16(), %message, "provider rejected request");
        Err(ApiError::Status {
            method: method_name,
            path: path.to_string(),
            status: status.as_u16(),
            message,
        })
    }

    async fn decode<T: DeserializeOwned>(
        resp: Response,
        method: &'static str,
        path: &str,
    ) -> ApiResult<T> {
        let text = resp.text().await.map_err(|source| ApiError::Transport {
            method,
            path: path.to_string(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ApiError::Decode {
            path: path.to_string(),
            source,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let resp = self.send(Method::GET, path, None).await?;
        Self::decode(resp, "GET", path).await
    }
}

#[async_trait]
impl ComputeApi for DigitalOceanClient {
    async fn get_droplet(&self, droplet: DropletId) -> ApiResult<Droplet> {
        let env: DropletEnvelope = self.get_json(&format!("/v2/droplets/{droplet}")).await?;
        Ok(env.droplet.into())
    }

    async fn create_snapshot(&self, droplet: DropletId, name: &str) -> ApiResult<Action> {
        let path = format!("/v2/droplets/{droplet}/actions");
        let body = serde_json::to_value(DropletActionRequest::snapshot(name)).map_err(|source| {
            ApiError::Decode {
                path: path.clone(),
                source,
            }
        })?;
        let resp = self.send(Method::POST, &path, Some(body)).await?;
        let env: ActionEnvelope = Self::decode(resp, "POST", &path).await?;
        Ok(env.action.into())
    }

    async fn get_action(&self, droplet: DropletId, action: ActionId) -> ApiResult<Action> {
        let env: ActionEnvelope = self
            .get_json(&format!("/v2/droplets/{droplet}/actions/{action}"))
            .await?;
        Ok(env.action.into())
    }

    async fn list_snapshots(&self, droplet: DropletId) -> ApiResult<Vec<Snapshot>> {
        let mut snapshots = Vec::new();

        for page in 1..=MAX_PAGES {
            let path = format!("/v2/droplets/{droplet}/snapshots?page={page}&per_page={PER_PAGE}");
            let body: SnapshotsPage = self.get_json(&path).await?;
            let fetched = body.snapshots.len();
            let more = body.has_next();
            snapshots.extend(body.snapshots.into_iter().map(Snapshot::from));

            if !more || fetched == 0 {
                break;
            }
            if page == MAX_PAGES {
                warn!(%droplet, pages = MAX_PAGES, "snapshot listing truncated");
            }
        }

        debug!(%droplet, count = snapshots.len(), "listed snapshots");
        Ok(snapshots)
    }

    async fn delete_snapshot(&self, snapshot: &SnapshotId) -> ApiResult<()> {
        self.send(Method::DELETE, &format!("/v2/snapshots/{snapshot}"), None)
            .await?;
        Ok(())
    }
}

fn method_str(method: &Method) -> &'static str {
    if *method == Method::GET {
        "GET"
    } else if *method == Method::POST {
        "POST"
    } else if *method == Method::DELETE {
        "DELETE"
    } else if *method == Method::PUT {
        "PUT"
    } else {
        "REQUEST"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_normalized() {
        let client =
            DigitalOceanClient::new("https://api.example.test/", "t", Duration::from_secs(1))
                .unwrap();
        assert_eq!(client.base_url(), "https://api.example.test");
    }

    #[test]
    fn method_names() {
        assert_eq!(method_str(&Method::GET), "GET");
        assert_eq!(method_str(&Method::DELETE), "DELETE");
        assert_eq!(method_str(&Method::PATCH), "REQUEST");
    }
}
