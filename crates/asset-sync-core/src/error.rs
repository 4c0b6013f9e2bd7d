use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors. Anything returned as `Err` from an engine entry point aborts
/// the tool; per-item problems are recorded in the run report instead.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Root not found: {}", .0.display())]
    RootNotFound(PathBuf),

    #[error("Catalog unavailable: {0}")]
    CatalogUnavailable(String),

    #[error("{0}")]
    Other(String),
}

/// Failure reported by an image conversion delegate for a single file.
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("failed to launch converter '{program}': {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("converter exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("converter reported success but {} is missing", .0.display())]
    MissingOutput(PathBuf),

    #[error("{0}")]
    Other(String),
}
