// src/error.rs
use std::path::PathBuf;

/// Errors returned by sensor checks.
///
/// A host that cannot be reached is not an error: online checks report it as
/// a `false` state with an `err` attribute. Only usage and parse failures end
/// up here.
#[derive(Debug, thiserror::Error)]
pub enum SensorError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("could not determine memory state based on {}: {}", .path.display(), .raw)]
    MemoryState { path: PathBuf, raw: String },

    #[error("online check requires target to be specified")]
    MissingTarget,

    #[error("unknown mode for online check: {0}")]
    UnknownMode(String),

    #[error("invalid request for {target}: {reason}")]
    InvalidRequest { target: String, reason: String },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("check aborted: {0}")]
    Cancelled(#[from] crate::checks::ContextError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl SensorError {
    /// True for errors caused by how the sensor was configured rather than
    /// by the host it inspects.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            SensorError::MissingTarget
                | SensorError::UnknownMode(_)
                | SensorError::InvalidRequest { .. }
                | SensorError::Config(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, SensorError>;
