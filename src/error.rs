//! Error types for Autocast.

use thiserror::Error;

/// Library-level error type for Autocast operations.
#[derive(Error, Debug)]
pub enum AutocastError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Topic pool exhausted: all {pool_size} topics have been used. Add topics to the pool to continue.")]
    ExhaustedPool { pool_size: usize },

    #[error("Remote service error: {0}")]
    RemoteService(String),

    #[error("Speech synthesis failed for chunk {chunk}: {message}")]
    Synthesis { chunk: usize, message: String },

    #[error("Audio format error: {0}")]
    AudioFormat(String),

    #[error("Feed parse error: {0}")]
    FeedParse(String),

    #[error("Feed write error: {0}")]
    FeedWrite(String),

    #[error("Episode already published: {0}")]
    EpisodeExists(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("External tool failed: {0}")]
    ToolFailed(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for Autocast operations.
pub type Result<T> = std::result::Result<T, AutocastError>;
