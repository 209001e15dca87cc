//! Error types for the pipe transport.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for pipe operations.
pub type PipeResult<T> = Result<T, PipeError>;

/// Errors that can occur while exchanging a message with the host.
#[derive(Debug, Error)]
pub enum PipeError {
    /// Opening, reading or writing the pipe failed.
    #[error("pipe I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The inbound document is not valid JSON, or does not have the expected shape.
    #[error("invalid message on {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The outbound value could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PipeError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
