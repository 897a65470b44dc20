//! Error types for the portmedic-core library.

use thiserror::Error;

/// Result type alias for portmedic operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during scanning, remediation and configuration.
#[derive(Error, Debug)]
pub enum Error {
    /// An external command exited non-zero in strict mode.
    #[error("Command failed: {command}: {stderr}")]
    CommandFailed { command: String, stderr: String },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}
