// src/lib.rs
pub mod checks;
pub mod config;
pub mod error;
pub mod payload;

pub use checks::{build_check, Check, CheckContext, MemoryCheck, OnlineCheck};
pub use error::{Result, SensorError};
pub use payload::{Payload, State};
