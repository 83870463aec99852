//! Error types for the siren driver.
//!
//! Driver actions never fail; these errors only come from the edges
//! (settings files and persisted state).

use thiserror::Error;

/// Errors raised while loading settings or persisting driver state.
#[derive(Debug, Error)]
pub enum DriverError {
    /// Filesystem error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML decoding error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type alias for driver edge operations.
pub type DriverResult<T> = Result<T, DriverError>;
