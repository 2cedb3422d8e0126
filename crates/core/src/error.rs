//! Error types for AgroDoc.
//!
//! This module defines a unified error enum that covers every error category
//! in the workspace: configuration, I/O, completion, knowledge, weather,
//! translation, prompt rendering and input validation.

use thiserror::Error;

/// Unified error type for AgroDoc.
///
/// All fallible functions in the workspace return `Result<T, AppError>`.
/// Components that degrade gracefully still use it internally and decide
/// at their boundary whether an error is absorbed or propagated.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Completion service errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Embedding, index and ingestion errors
    #[error("Knowledge error: {0}")]
    Knowledge(String),

    /// Weather provider errors
    #[error("Weather error: {0}")]
    Weather(String),

    /// Translation provider errors
    #[error("Translation error: {0}")]
    Translation(String),

    /// Prompt template errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Rejected request input. The message is safe to show to callers.
    #[error("{0}")]
    InvalidInput(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// HTTP server errors
    #[error("Server error: {0}")]
    Server(String),

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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_message_is_bare() {
        let err = AppError::InvalidInput("Query is required".to_string());
        assert_eq!(err.to_string(), "Query is required");
    }

    #[test]
    fn test_serde_json_conversion() {
        let parse: Result<serde_json::Value, _> = serde_json::from_str("{not json");
        let err: AppError = parse.unwrap_err().into();
        assert!(matches!(err, AppError::Serialization(_)));
    }
}
