//! Error types for the Mevzuat Assistant.
//!
//! This module defines a unified error enum that covers all error
//! categories in the application: configuration, I/O, generation
//! service, retrieval, feedback, and serialization errors.

use thiserror::Error;

/// Unified error type for the Mevzuat Assistant.
///
/// All fallible functions in the application return `Result<T, AppError>`.
/// We never panic — errors must be represented and propagated.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generation-service errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Retrieval and vector-store errors
    #[error("Retrieval error: {0}")]
    Retrieval(String),

    /// Feedback-sink errors
    #[error("Feedback error: {0}")]
    Feedback(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
