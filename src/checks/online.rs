// src/checks/online.rs
use super::{Check, CheckContext};
use crate::config::OnlineCheckConfig;
use crate::error::{Result, SensorError};
use crate::payload::Payload;
use async_trait::async_trait;
use reqwest::header::USER_AGENT;
use reqwest::{Client, StatusCode};
use std::fmt;
use std::process::{ExitStatus, Stdio};
use std::str::FromStr;
use tokio::process::Command;
use tokio::time::Instant;
use tracing::{debug, warn};
use url::Url;

/// Echo requests sent per ping probe.
pub const PING_COUNT: u32 = 2;
/// Overall ping deadline in seconds.
pub const PING_WAIT_SECS: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnlineMode {
    Ping,
    Http,
}

impl FromStr for OnlineMode {
    type Err = SensorError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ping" => Ok(OnlineMode::Ping),
            "http" => Ok(OnlineMode::Http),
            other => Err(SensorError::UnknownMode(other.to_string())),
        }
    }
}

impl fmt::Display for OnlineMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OnlineMode::Ping => f.write_str("ping"),
            OnlineMode::Http => f.write_str("http"),
        }
    }
}

/// Reachability sensor: one ping or HTTP GET per run.
///
/// An unreachable target is reported as `state: false` with an `err`
/// attribute. Errors are returned only for bad configuration.
pub struct OnlineCheck {
    mode: String,
    target: String,
    user_agent: String,
    ping_command: String,
    client: Client,
}

impl OnlineCheck {
    pub fn new(config: OnlineCheckConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(SensorError::Client)?;

        let mode = config
            .mode
            .filter(|mode| !mode.is_empty())
            .unwrap_or_else(|| OnlineMode::Ping.to_string());

        Ok(Self {
            mode,
            target: config.target.unwrap_or_default(),
            user_agent: config.user_agent,
            ping_command: config.ping_command,
            client,
        })
    }

    pub fn mode(&self) -> &str {
        &self.mode
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    async fn check_http(&self, ctx: &CheckContext) -> Result<Payload> {
        let invalid = |reason: String| SensorError::InvalidRequest {
            target: self.target.clone(),
            reason,
        };

        // Scheme problems surface when the request is sent, so they report
        // the target as offline. Only unparseable targets are errors.
        let url = match Url::parse(&self.target) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => url,
            Ok(url) => return Ok(self.unsupported_scheme(url.scheme())),
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                return Ok(self.unsupported_scheme(""));
            }
            Err(e) => return Err(invalid(e.to_string())),
        };

        let request = self
            .client
            .get(url)
            .header(USER_AGENT, self.user_agent.as_str())
            .build()
            .map_err(|e| invalid(e.to_string()))?;

        if let Some(reason) = ctx.err() {
            return Ok(self.unreachable(reason.to_string()));
        }

        let start = Instant::now();
        let outcome = tokio::select! {
            response = self.client.execute(request) => response.map_err(|e| e.to_string()),
            reason = ctx.done() => Err(reason.to_string()),
        };

        match outcome {
            Ok(response) => {
                let status = status_line(response.status());
                debug!(
                    host = %self.target,
                    %status,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "HTTP online check got a response"
                );
                Ok(Payload::new(true).with_attribute("status", status))
            }
            Err(err) => Ok(self.unreachable(err)),
        }
    }

    async fn check_ping(&self, ctx: &CheckContext) -> Result<Payload> {
        if let Some(reason) = ctx.err() {
            return Ok(self.ping_failed(reason));
        }

        let mut command = Command::new(&self.ping_command);
        command
            .arg("-c")
            .arg(PING_COUNT.to_string())
            .arg("-w")
            .arg(PING_WAIT_SECS.to_string())
            .arg(&self.target)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(e) => return Ok(self.ping_failed(e)),
        };

        let outcome = tokio::select! {
            status = child.wait() => status.map_err(|e| e.to_string()),
            reason = ctx.done() => {
                if let Err(e) = child.kill().await {
                    debug!(error = %e, "Failed to kill ping process");
                }
                Err(reason.to_string())
            }
        };

        match outcome {
            Ok(status) if status.success() => {
                debug!(host = %self.target, "Ping online check succeeded");
                Ok(Payload::new(true))
            }
            // iputils and BSD ping exit with 1 when no reply was received.
            Ok(status) if status.code() == Some(1) => {
                Ok(self.unreachable(format!("could not reach {}", self.target)))
            }
            Ok(status) => Ok(self.ping_failed(exit_description(status))),
            Err(err) => Ok(self.ping_failed(err)),
        }
    }

    fn unsupported_scheme(&self, scheme: &str) -> Payload {
        self.unreachable(format!(
            "Get \"{}\": unsupported protocol scheme \"{}\"",
            self.target, scheme
        ))
    }

    fn ping_failed(&self, cause: impl fmt::Display) -> Payload {
        self.unreachable(format!("failed to execute {}: {}", self.ping_command, cause))
    }

    fn unreachable(&self, err: String) -> Payload {
        warn!(host = %self.target, mode = %self.mode, error = %err, "Target is not reachable");
        Payload::new(false).with_attribute("err", err)
    }
}

fn exit_description(status: ExitStatus) -> String {
    match status.code() {
        Some(code) => format!("exit status {}", code),
        None => status.to_string(),
    }
}

fn status_line(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {}", status.as_u16(), reason),
        None => status.as_u16().to_string(),
    }
}

#[async_trait]
impl Check for OnlineCheck {
    async fn run(&self, ctx: &CheckContext) -> Result<Payload> {
        if self.target.is_empty() {
            return Err(SensorError::MissingTarget);
        }

        match self.mode.parse::<OnlineMode>()? {
            OnlineMode::Http => self.check_http(ctx).await,
            OnlineMode::Ping => self.check_ping(ctx).await,
        }
    }

    fn name(&self) -> &'static str {
        "online"
    }
}
