//! Error types for the console core

use thiserror::Error;

/// Main error type for the console core
#[derive(Error, Debug)]
pub enum ConsoleError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("API error: {status} - {body}")]
    ApiError { status: u16, body: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Index {index} out of range for {collection} of length {len}")]
    IndexOutOfRange {
        collection: &'static str,
        index: usize,
        len: usize,
    },

    #[error("Unknown card: {0}")]
    UnknownCard(String),

    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("Invalid selection: {0}")]
    InvalidSelection(String),

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

impl ConsoleError {
    /// Bounds check used by the splice helpers
    pub fn check_index(
        collection: &'static str,
        index: usize,
        len: usize,
    ) -> Result<(), ConsoleError> {
        if index < len {
            Ok(())
        } else {
            Err(ConsoleError::IndexOutOfRange {
                collection,
                index,
                len,
            })
        }
    }
}
