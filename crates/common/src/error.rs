//! Error types shared across SaniTrack crates.

use std::path::PathBuf;

/// Top-level error type for SaniTrack operations.
#[derive(Debug, thiserror::Error)]
pub enum SanitrackError {
    #[error("Detection error: {message}")]
    Detection { message: String },

    #[error("Alert delivery error: {message}")]
    AlertDelivery { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Trace error at line {line}: {message}")]
    Trace { line: usize, message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using SanitrackError.
pub type SanitrackResult<T> = Result<T, SanitrackError>;

impl SanitrackError {
    pub fn detection(msg: impl Into<String>) -> Self {
        Self::Detection {
            message: msg.into(),
        }
    }

    pub fn alert_delivery(msg: impl Into<String>) -> Self {
        Self::AlertDelivery {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn trace(line: usize, msg: impl Into<String>) -> Self {
        Self::Trace {
            line,
            message: msg.into(),
        }
    }
}
