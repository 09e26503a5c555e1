//! Error types for Samtal.

use thiserror::Error;

/// Library-level error type for Samtal operations.
#[derive(Error, Debug)]
pub enum SamtalError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unsupported or invalid audio: {0}")]
    Audio(String),

    #[error("Transcription failed: {0}")]
    Transcription(String),

    #[error("Analysis provider error [{code}]: {message}")]
    AnalysisProvider { code: String, message: String },

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Vector store error: {0}")]
    VectorStore(String),

    #[error("Search failed: {0}")]
    Search(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for Samtal operations.
pub type Result<T> = std::result::Result<T, SamtalError>;
