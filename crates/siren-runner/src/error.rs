//! Runner errors.

use thiserror::Error;

/// Errors that can stop a run.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// Settings or state could not be loaded or saved.
    #[error("Driver error: {0}")]
    Driver(#[from] siren_driver::DriverError),

    /// An injected report was not valid hex.
    #[error("Protocol error: {0}")]
    Protocol(#[from] siren_protocol::ProtocolError),

    /// The timeline could not be serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// `--start` is not an RFC 3339 timestamp.
    #[error("Invalid start time '{0}': {1}")]
    StartTime(String, chrono::ParseError),

    /// The log filter was rejected or a subscriber was already installed.
    #[error("Logging setup failed: {0}")]
    Logging(String),
}
