//! Error types for the HTTP client.

use thiserror::Error;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur talking to the host API.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request could not be sent or its body could not be read.
    #[error("network error: {0}")]
    Network(String),

    /// The host answered with a non-success status.
    #[error("{method} request to {url} returned status {status}")]
    Status {
        method: String,
        url: String,
        status: u16,
    },

    /// Acquiring a session token failed.
    #[error("authentication failed: {message}")]
    Auth {
        status: Option<u16>,
        message: String,
    },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The client was configured or called with unusable settings.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ClientError {
    /// The HTTP status behind this error, if the host answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Auth { status, .. } => *status,
            _ => None,
        }
    }
}
