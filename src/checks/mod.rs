// src/checks/mod.rs
mod context;
mod memory;
mod online;

pub use context::{CancelHandle, CheckContext, ContextError};
pub use memory::MemoryCheck;
pub use online::{OnlineCheck, OnlineMode, PING_COUNT, PING_WAIT_SECS};

use crate::config::{SensorConfig, SensorKind};
use crate::error::Result;
use crate::payload::Payload;
use async_trait::async_trait;

/// A sensor that can be run on demand.
///
/// Implementations keep no state between runs, so `run` may be called
/// concurrently from several tasks.
#[async_trait]
pub trait Check: Send + Sync {
    async fn run(&self, ctx: &CheckContext) -> Result<Payload>;

    fn name(&self) -> &'static str;
}

pub fn build_check(config: &SensorConfig) -> Result<Box<dyn Check>> {
    let check: Box<dyn Check> = match &config.kind {
        SensorKind::Memory(memory) => Box::new(MemoryCheck::new(memory.clone())),
        SensorKind::Online(online) => Box::new(OnlineCheck::new(online.clone())?),
    };
    tracing::debug!(sensor = %config.name, kind = check.name(), "Built sensor check");
    Ok(check)
}
