//! Types for the dispatcher module.

use serde::Serialize;
use std::path::PathBuf;

use crate::duplicates::DuplicateMatch;
use crate::placer::PlacedFile;

/// A move a dry run would have performed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedMove {
    pub candidate: PathBuf,
    pub target: PathBuf,
}

/// A candidate whose move failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveFailure {
    pub candidate: PathBuf,
    pub target: PathBuf,
    pub reason: String,
}

/// Outcome of one pass over a group.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MoveReport {
    /// Candidates moved into a target.
    pub moved: Vec<PlacedFile>,
    /// Moves a dry run would have performed.
    pub planned: Vec<PlannedMove>,
    /// Candidates already present in a target, first location only.
    pub already_dispatched: Vec<DuplicateMatch>,
    /// Staging copies of already dispatched candidates that were deleted.
    pub cleaned: Vec<PathBuf>,
    /// Candidates left in place because every target is full.
    pub left_unplaced: Vec<PathBuf>,
    pub failures: Vec<MoveFailure>,
}

impl MoveReport {
    /// Number of candidates actually moved; always 0 for a dry run.
    pub fn moved_count(&self) -> usize {
        self.moved.len()
    }
}
