//! Error types for balrog-submit

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while preparing or executing a submission
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or invalid configuration or task fields
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Manifest entry carries neither or both submission style markers
    #[error("unknown Balrog submission style: {0}. Check manifest.json")]
    UnknownSubmissionStyle(String),

    /// Malformed `<version>build<N>` token in the partial versions list
    #[error("malformed partial version {0:?}: expected <version>build<number>")]
    PartialVersionFormat(String),

    /// Registry rejected a call or answered with an unexpected status
    #[error("registry error: {0}")]
    Registry(String),

    /// Transport-level HTTP failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON (de)serialization failure
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Failed to read a file from disk
    #[error("cannot read {}: {source}", path.display())]
    Io {
        /// File that could not be read
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },
}

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;
