//! SSH executor built on russh.
//!
//! Authenticates with a single private key and runs the script on one
//! session channel. Server host keys are accepted without verification.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use russh::client;
use russh_keys::key::{KeyPair, PublicKey};
use tokio::net::TcpStream;
use tracing::{debug, info, warn};

use crate::error::{DeployError, DeployResult};
use crate::executor::{CommandOutput, RemoteExecutor};
use crate::plan::DeployTarget;

struct AcceptingHandler;

#[async_trait]
impl client::Handler for AcceptingHandler {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        _server_public_key: &PublicKey,
    ) -> Result<bool, Self::Error> {
        Ok(true)
    }
}

/// [`RemoteExecutor`] over SSH with public-key authentication.
#[derive(Debug, Clone)]
pub struct SshExecutor {
    connect_timeout: Duration,
}

impl SshExecutor {
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }

    async fn connect(
        &self,
        target: &DeployTarget,
        key: KeyPair,
    ) -> DeployResult<client::Handle<AcceptingHandler>> {
        let addr = target.addr();
        let stream = tokio::time::timeout(
            self.connect_timeout,
            TcpStream::connect((target.host.as_str(), target.port)),
        )
        .await
        .map_err(|_| DeployError::ConnectTimeout {
            addr: addr.clone(),
            after: self.connect_timeout,
        })?
        .map_err(|source| DeployError::Connect {
            addr: addr.clone(),
            source,
        })?;

        let config = Arc::new(client::Config::default());
        let mut session = client::connect_stream(config, stream, AcceptingHandler).await?;

        let authenticated = session
            .authenticate_publickey(&target.user, Arc::new(key))
            .await?;
        if !authenticated {
            return Err(DeployError::AuthRejected {
                user: target.user.clone(),
            });
        }

        debug!(%addr, user = %target.user, "ssh session established");
        Ok(session)
    }
}

#[async_trait]
impl RemoteExecutor for SshExecutor {
    async fn run(&self, target: &DeployTarget, script: &str) -> DeployResult<CommandOutput> {
        let key = load_private_key(&target.key_path).await?;
        let session = self.connect(target, key).await?;

        info!(addr = %target.addr(), "running deploy script");
        let output = exec(&session, script).await;

        if let Err(e) = session
            .disconnect(russh::Disconnect::ByApplication, "", "en")
            .await
        {
            warn!(error = %e, "ssh disconnect failed");
        }
        output
    }
}

async fn exec(
    session: &client::Handle<AcceptingHandler>,
    script: &str,
) -> DeployResult<CommandOutput> {
    let mut channel = session.channel_open_session().await?;
    channel.exec(true, script).await?;

    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let mut exit_code = None;

    loop {
        match channel.wait().await {
            Some(russh::ChannelMsg::Data { data }) => stdout.extend_from_slice(&data),
            Some(russh::ChannelMsg::ExtendedData { data, ext }) => {
                // ext 1 is stderr
                if ext == 1 {
                    stderr.extend_from_slice(&data);
                }
            }
            Some(russh::ChannelMsg::ExitStatus { exit_status }) => exit_code = Some(exit_status),
            Some(russh::ChannelMsg::Close) | None => break,
            _ => {}
        }
    }

    Ok(CommandOutput {
        stdout: String::from_utf8_lossy(&stdout).into_owned(),
        stderr: String::from_utf8_lossy(&stderr).into_owned(),
        exit_code,
    })
}

async fn load_private_key(path: &Path) -> DeployResult<KeyPair> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| DeployError::KeyRead {
            path: path.to_path_buf(),
            source,
        })?;
    russh_keys::decode_secret_key(&content, None).map_err(|source| DeployError::KeyDecode {
        path: path.to_path_buf(),
        source,
    })
}
