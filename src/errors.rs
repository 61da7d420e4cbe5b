use thiserror::Error;
use std::io;
use std::path::PathBuf;

/// Custom error types for GLCM Haralick analysis
#[derive(Error, Debug)]
pub enum HaralickError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to load configuration from {path}: {source}")]
    ConfigLoad {
        source: toml::de::Error,
        path: PathBuf,
    },

    #[error("Invalid co-occurrence parameters: {0}")]
    InvalidParams(String),

    #[error("Co-occurrence matrix has no counts (no valid pixel pairs for the configured offset)")]
    EmptyMatrix,

    #[error("Invalid co-occurrence table: {0}")]
    Shape(String),

    #[error("CSV output error: {0}")]
    CsvOutput(#[from] csv::Error),

    #[error("JSON output error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid input path: {0}")]
    InvalidPath(PathBuf),

    #[error("Unexpected error: {0}")]
    Other(String),
}

/// Type alias for Result with our custom error type
pub type Result<T> = std::result::Result<T, HaralickError>;
