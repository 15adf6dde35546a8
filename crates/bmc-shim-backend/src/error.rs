//! Error types for backend operations

use thiserror::Error;

/// Error type for backend operations
#[derive(Debug, Error)]
pub enum BackendError {
    /// Backend could not be built from the supplied parameters
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Shell command could not be spawned or exited unsuccessfully
    #[error("command failed: {0}")]
    CommandFailed(String),

    /// Remote service answered with an unexpected HTTP status
    #[error("homeassistant {operation}: http {status}")]
    HttpStatus { operation: String, status: u16 },

    /// Transport or decoding failure talking to a remote service
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Result type for backend operations
pub type Result<T> = std::result::Result<T, BackendError>;
