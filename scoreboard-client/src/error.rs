//! Error types for the client.

use crate::config::ConfigError;
use scoreboard_core::{BackendError, ScoreboardError};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("HTTP client setup failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error(transparent)]
    Scoreboard(#[from] ScoreboardError),
    #[error("Logging setup failed: {0}")]
    Telemetry(String),
}
