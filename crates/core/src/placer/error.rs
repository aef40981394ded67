//! Error types for the placer module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during file placement.
///
/// A destination that already exists is never an error: it is either reused
/// (identical content) or skipped in favour of the next free name.
#[derive(Debug, Error)]
pub enum PlacerError {
    /// Source file not found or not a regular file.
    #[error("Source file not found: {path}")]
    SourceNotFound { path: PathBuf },

    /// Failed to create destination directory.
    #[error("Failed to create directory: {path}")]
    DirectoryCreationFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to copy file.
    #[error("Failed to copy file from {source} to {destination}")]
    CopyFailed {
        source: PathBuf,
        destination: PathBuf,
        #[source]
        error: std::io::Error,
    },

    /// Failed to compare the source against an existing namesake.
    #[error("Failed to compare {source} with {destination}")]
    CompareFailed {
        source: PathBuf,
        destination: PathBuf,
        #[source]
        error: std::io::Error,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PlacerError {
    /// Creates a copy failed error.
    pub fn copy_failed(source: PathBuf, destination: PathBuf, error: std::io::Error) -> Self {
        Self::CopyFailed {
            source,
            destination,
            error,
        }
    }

    /// Creates a compare failed error.
    pub fn compare_failed(source: PathBuf, destination: PathBuf, error: std::io::Error) -> Self {
        Self::CompareFailed {
            source,
            destination,
            error,
        }
    }
}
