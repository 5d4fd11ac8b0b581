// src/checks/memory.rs
use super::{Check, CheckContext};
use crate::config::MemoryCheckConfig;
use crate::error::{Result, SensorError};
use crate::payload::{to_snake_case, Payload};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Fields of `/proc/meminfo` the memory sensor reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MemInfoField {
    MemFree,
    MemAvailable,
    MemTotal,
    SwapFree,
    SwapTotal,
}

/// Where a recognised field ends up in the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Destination {
    State,
    Attribute(String),
}

impl MemInfoField {
    const ALL: [MemInfoField; 5] = [
        MemInfoField::MemFree,
        MemInfoField::MemAvailable,
        MemInfoField::MemTotal,
        MemInfoField::SwapFree,
        MemInfoField::SwapTotal,
    ];

    fn name(self) -> &'static str {
        match self {
            MemInfoField::MemFree => "MemFree",
            MemInfoField::MemAvailable => "MemAvailable",
            MemInfoField::MemTotal => "MemTotal",
            MemInfoField::SwapFree => "SwapFree",
            MemInfoField::SwapTotal => "SwapTotal",
        }
    }

    fn lookup(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|field| field.name().eq_ignore_ascii_case(name))
    }

    fn destination(self) -> Destination {
        match self {
            MemInfoField::MemFree => Destination::State,
            other => Destination::Attribute(to_snake_case(other.name())),
        }
    }
}

/// Split a `Key:   1234 kB` line into its name and digit run.
///
/// Requires a non-empty name, at least one whitespace character after the
/// colon and at least one ASCII digit. Anything after the digits is ignored.
fn scan_line(line: &str) -> Option<(&str, &str)> {
    let (name, rest) = line.trim_start().split_once(':')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }

    let value = rest.trim_start();
    if value.len() == rest.len() {
        return None;
    }

    let digits = value.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }

    Some((name, &value[..digits]))
}

/// Reports free memory (kB) as state, with totals and swap as attributes.
pub struct MemoryCheck {
    path: PathBuf,
}

impl MemoryCheck {
    pub fn new(config: MemoryCheckConfig) -> Self {
        Self { path: config.path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Turn meminfo text into a payload. Fails when no `MemFree` line exists.
    pub fn process(&self, output: &str) -> Result<Payload> {
        let mut state = None;
        let mut attributes = Vec::new();

        for (name, value) in output.lines().filter_map(scan_line) {
            let Some(field) = MemInfoField::lookup(name) else {
                continue;
            };
            match field.destination() {
                Destination::State => state = Some(value.to_string()),
                Destination::Attribute(key) => attributes.push((key, value.to_string())),
            }
        }

        let Some(state) = state else {
            return Err(SensorError::MemoryState {
                path: self.path.clone(),
                raw: output.to_string(),
            });
        };

        let mut payload = Payload::new(state);
        for (key, value) in attributes {
            payload.insert(key, value);
        }

        debug!(
            path = %self.path.display(),
            attributes = payload.attributes.len(),
            "Parsed memory state"
        );
        Ok(payload)
    }
}

impl Default for MemoryCheck {
    fn default() -> Self {
        Self::new(MemoryCheckConfig::default())
    }
}

#[async_trait]
impl Check for MemoryCheck {
    async fn run(&self, ctx: &CheckContext) -> Result<Payload> {
        let bytes = tokio::select! {
            read = tokio::fs::read(&self.path) => read?,
            reason = ctx.done() => return Err(reason.into()),
        };
        self.process(&String::from_utf8_lossy(&bytes))
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
