//! Types for the placer module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Whether the source is removed once placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceMode {
    Move,
    Copy,
}

/// How the destination came to hold the source's bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementOutcome {
    /// A new file was created.
    Written,
    /// A byte-identical file was already there; nothing was written.
    AlreadyPresent,
}

/// Information about a placed file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedFile {
    /// Original source path.
    pub source: PathBuf,
    /// Final destination path, possibly renamed.
    pub destination: PathBuf,
    pub outcome: PlacementOutcome,
    /// File size in bytes.
    pub size_bytes: u64,
    /// Whether the source no longer exists.
    pub source_removed: bool,
}

impl PlacedFile {
    /// True when the destination name differs from the source name.
    pub fn was_renamed(&self) -> bool {
        self.source.file_name() != self.destination.file_name()
    }
}
