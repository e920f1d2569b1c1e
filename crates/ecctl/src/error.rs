//! CLI error types.

use std::path::PathBuf;

use ece_client::ApiError;
use thiserror::Error;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid or incomplete configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Invalid argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A requested item does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The API rejected the request or could not be reached.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    File {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A file is not a valid document.
    #[error("failed to parse {}: {message}", path.display())]
    Parse {
        /// File path.
        path: PathBuf,
        /// Parser message.
        message: String,
    },

    /// Output formatting error.
    #[error("format error: {0}")]
    Format(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
