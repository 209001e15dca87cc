//! Error types for the entity graph.

use thiserror::Error;

/// Result type for graph operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised while building or parsing a result graph.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Different objects with equal keys were registered.
    #[error("{}", describe_duplicates(.keys))]
    DuplicateKey { keys: Vec<String> },

    /// A relationship names an object that is not registered.
    #[error("no object with key {0} in the result")]
    UnknownObject(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

fn describe_duplicates(keys: &[String]) -> String {
    match keys {
        [key] => format!("a different object with key {key} already exists in the result"),
        keys => format!(
            "different objects with keys [{}] already exist in the result",
            keys.join(", ")
        ),
    }
}
