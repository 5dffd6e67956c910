//! Error types for calview.

use std::sync::Arc;

use thiserror::Error;

/// Errors that can occur in calview operations.
///
/// Cloneable so a single failure can be handed to every caller waiting on
/// the same in-flight fetch.
#[derive(Error, Debug, Clone)]
pub enum CalViewError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Event source error: {0}")]
    Source(Arc<anyhow::Error>),

    #[error("Recurrence error: {0}")]
    Recurrence(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(Arc<std::io::Error>),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for CalViewError {
    fn from(err: std::io::Error) -> Self {
        CalViewError::Io(Arc::new(err))
    }
}

/// Result type alias for calview operations.
pub type CalViewResult<T> = Result<T, CalViewError>;
