//! Error types for dispatching.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that abort a whole group pass.
///
/// Per-candidate problems (undecodable files, full targets, failed moves) are
/// reported in the `MoveReport` instead.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A configured source is missing or is not a file or directory.
    #[error("Cannot read file or directory {path}: {reason}")]
    InvalidSource { path: PathBuf, reason: String },

    /// The group configuration cannot be used.
    #[error("Invalid group configuration: {0}")]
    InvalidGroup(String),
}

impl DispatchError {
    pub fn invalid_source(path: &Path, reason: impl Into<String>) -> Self {
        Self::InvalidSource {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }
}
