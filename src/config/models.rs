// src/config/models.rs
use crate::error::SensorError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_MEMINFO_PATH: &str = "/proc/meminfo";
pub const DEFAULT_USER_AGENT: &str = "HomeAssistant-Companion/Online-Check";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Deadline applied to each check run by the runner.
    #[serde(default = "default_check_timeout_secs")]
    pub check_timeout_secs: u64,
    pub sensors: Vec<SensorConfig>,
}

impl Config {
    pub fn check_timeout(&self) -> Duration {
        Duration::from_secs(self.check_timeout_secs)
    }

    pub fn validate(&self) -> Result<(), SensorError> {
        if self.sensors.is_empty() {
            return Err(SensorError::Config("at least one sensor must be configured".into()));
        }
        if self.check_timeout_secs == 0 {
            return Err(SensorError::Config("check_timeout_secs must be greater than 0".into()));
        }

        let mut seen = HashSet::new();
        for sensor in &self.sensors {
            if sensor.name.trim().is_empty() {
                return Err(SensorError::Config("sensor name must not be empty".into()));
            }
            if !seen.insert(sensor.name.as_str()) {
                return Err(SensorError::Config(format!(
                    "duplicate sensor name: {}",
                    sensor.name
                )));
            }
            if let SensorKind::Online(online) = &sensor.kind {
                if online.timeout_secs == 0 {
                    return Err(SensorError::Config(format!(
                        "sensor {}: timeout_secs must be greater than 0",
                        sensor.name
                    )));
                }
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorConfig {
    pub name: String,
    #[serde(flatten)]
    pub kind: SensorKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SensorKind {
    Memory(MemoryCheckConfig),
    Online(OnlineCheckConfig),
}

impl SensorKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            SensorKind::Memory(_) => "memory",
            SensorKind::Online(_) => "online",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryCheckConfig {
    #[serde(default = "default_meminfo_path")]
    pub path: PathBuf,
}

impl Default for MemoryCheckConfig {
    fn default() -> Self {
        Self {
            path: default_meminfo_path(),
        }
    }
}

/// Settings for an online check.
///
/// `mode` and `target` stay free-form strings; they are checked when the
/// sensor runs. Missing or empty `mode` means `ping`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnlineCheckConfig {
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default = "default_online_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_ping_command")]
    pub ping_command: String,
}

impl OnlineCheckConfig {
    pub fn new(mode: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            mode: Some(mode.into()),
            target: Some(target.into()),
            ..Self::default()
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for OnlineCheckConfig {
    fn default() -> Self {
        Self {
            mode: None,
            target: None,
            timeout_secs: default_online_timeout_secs(),
            user_agent: default_user_agent(),
            ping_command: default_ping_command(),
        }
    }
}

fn default_check_timeout_secs() -> u64 {
    10
}

fn default_meminfo_path() -> PathBuf {
    PathBuf::from(DEFAULT_MEMINFO_PATH)
}

fn default_online_timeout_secs() -> u64 {
    5
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_ping_command() -> String {
    "ping".to_string()
}
