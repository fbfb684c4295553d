//! Client side of the status provider contract.
//!
//! `GET /status` returns the full agent snapshot; `POST /start` and
//! `POST /stop` need no body and report success through the HTTP status.

use crate::config::Config;
use async_trait::async_trait;
use kairos_core::{AgentAction, AgentState};
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("provider returned http {status}")]
    Status { status: u16 },
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("provider rejected command: {0}")]
    Rejected(String),
    #[error("request task failed: {0}")]
    TaskFailed(String),
}

#[async_trait]
pub trait StatusProvider: Send + Sync {
    async fn fetch_status(&self) -> Result<AgentState, ProviderError>;

    async fn send_command(&self, action: AgentAction) -> Result<(), ProviderError>;
}

/// Optional body of a start/stop reply.
#[derive(Debug, Default, Deserialize)]
struct CommandReply {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

pub struct HttpStatusProvider {
    client: Client,
    status_url: String,
    start_url: String,
    stop_url: String,
}

impl HttpStatusProvider {
    pub fn new(config: &Config) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            client,
            status_url: config.endpoint("/status"),
            start_url: config.endpoint(AgentAction::Start.path()),
            stop_url: config.endpoint(AgentAction::Stop.path()),
        })
    }

    fn command_url(&self, action: AgentAction) -> &str {
        match action {
            AgentAction::Start => &self.start_url,
            AgentAction::Stop => &self.stop_url,
        }
    }
}

#[async_trait]
impl StatusProvider for HttpStatusProvider {
    async fn fetch_status(&self) -> Result<AgentState, ProviderError> {
        let resp = self.client.get(&self.status_url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
            });
        }
        let body = resp.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn send_command(&self, action: AgentAction) -> Result<(), ProviderError> {
        let resp = self.client.post(self.command_url(action)).send().await?;
        let status = resp.status();
        let body = resp.bytes().await?;
        if !status.is_success() {
            if let Some(reason) = parse_command_reply(&body).and_then(|reply| reply.error) {
                debug!("command_error_body: action={action} error={reason}");
            }
            return Err(ProviderError::Status {
                status: status.as_u16(),
            });
        }
        check_command_reply(&body)
    }
}

fn parse_command_reply(body: &[u8]) -> Option<CommandReply> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return None;
    }
    serde_json::from_slice(body).ok()
}

/// A 2xx reply carrying `"success": false` still counts as a failure.
fn check_command_reply(body: &[u8]) -> Result<(), ProviderError> {
    let Some(reply) = parse_command_reply(body) else {
        return Ok(());
    };
    if reply.success == Some(false) {
        let reason = reply
            .error
            .or(reply.message)
            .unwrap_or_else(|| "command rejected".to_string());
        return Err(ProviderError::Rejected(reason));
    }
    Ok(())
}
