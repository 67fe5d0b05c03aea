//! Error types for kbchat-rs
//!
//! This module provides error handling for all kbchat operations, including
//! query normalization, knowledgebase loading and ranking, and calls to the
//! generation service.

use thiserror::Error;

/// Main error type for kbchat operations
#[derive(Error, Debug)]
pub enum KbChatError {
    /// Query normalization errors
    #[error("Text processing error: {0}")]
    TextProcessing(String),

    /// Knowledgebase table errors
    #[error("Knowledgebase error: {0}")]
    Table(String),

    /// Ranking over a table with no rows is undefined
    #[error("Knowledgebase has no rows to rank")]
    EmptyTable,

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generation service errors
    #[error("Generation service error: {0}")]
    Generation(#[from] crate::generation::GenerationError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV parsing errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Generic errors
    #[error("Generic error: {0}")]
    Generic(String),
}

/// Result type alias for kbchat operations
pub type Result<T> = std::result::Result<T, KbChatError>;

impl From<anyhow::Error> for KbChatError {
    fn from(err: anyhow::Error) -> Self {
        KbChatError::Generic(err.to_string())
    }
}
