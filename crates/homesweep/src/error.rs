use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HomesweepError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Home directory not found or not readable: {0}")]
    HomeNotFound(PathBuf),

    #[error("Invalid glob pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("External tool error: {tool} failed: {message}")]
    ExternalTool { tool: String, message: String },

    #[error("Scan results not found: {0}")]
    SnapshotNotFound(PathBuf),
}

impl From<globset::Error> for HomesweepError {
    fn from(err: globset::Error) -> Self {
        HomesweepError::InvalidPattern {
            pattern: err.glob().unwrap_or_default().to_string(),
            message: err.kind().to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, HomesweepError>;
