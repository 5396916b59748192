//! Error types for locked / durable file operations

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while locking or durably writing a file.
#[derive(Error, Debug)]
pub enum IoError {
    /// Failed to acquire file lock after multiple retries
    #[error("failed to acquire lock on {path} after {retries} retries")]
    LockTimeout { path: PathBuf, retries: u32 },

    /// File I/O error
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to parse JSON
    #[error("JSON parse error in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Invalid path (missing parent directory, empty components, etc.)
    #[error("invalid path: {path}")]
    InvalidPath { path: PathBuf },
}
