//! Output error types.

use std::path::PathBuf;

use thiserror::Error;

/// Output operation error.
#[derive(Debug, Error)]
pub enum OutputError {
    /// File I/O error.
    #[error("failed to {operation} {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The table could not be serialized as CSV.
    #[error("failed to write CSV to {path}: {message}")]
    Csv { path: PathBuf, message: String },

    /// The finished temporary file could not replace the destination.
    #[error("failed to move {temp_path} into place at {target_path}")]
    AtomicWriteFailed {
        temp_path: PathBuf,
        target_path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for output operations.
pub type Result<T> = std::result::Result<T, OutputError>;
