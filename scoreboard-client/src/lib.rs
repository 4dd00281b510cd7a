//! REST backend, configuration and reporting for the scoreboard client.

pub mod api_client;
pub mod config;
pub mod error;
pub mod report;
pub mod rows;
pub mod telemetry;

pub use api_client::RestBackend;
pub use config::{ClientConfig, ConfigError};
pub use error::ClientError;
