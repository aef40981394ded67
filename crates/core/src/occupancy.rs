//! Target occupancy tracking for a single dispatch pass.

use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::watchdir::count_managed;

/// Number of managed files directly inside a target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetOccupancy {
    pub target: PathBuf,
    /// `None` if the target could not be read.
    pub count: Option<usize>,
}

impl TargetOccupancy {
    /// Whether one more file fits under `limit` (0 = unlimited).
    pub fn is_eligible(&self, limit: usize) -> bool {
        match self.count {
            Some(count) => limit == 0 || count < limit,
            None => false,
        }
    }
}

/// Occupancy of every target, observed once and then updated in memory.
#[derive(Debug, Clone)]
pub struct OccupancyTable {
    entries: Vec<TargetOccupancy>,
}

impl OccupancyTable {
    /// Counts managed files in each target.
    ///
    /// A missing target counts as empty since the placer creates it; a target
    /// that cannot be listed for another reason is excluded from selection.
    pub async fn observe(targets: &[PathBuf], extension: &str) -> Self {
        let mut entries = Vec::with_capacity(targets.len());
        for target in targets {
            let count = match count_managed(target, extension).await {
                Ok(count) => Some(count),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    warn!("Target {} does not exist yet", target.display());
                    Some(0)
                }
                Err(e) => {
                    warn!("Cannot count torrents in {}: {}", target.display(), e);
                    None
                }
            };
            debug!("{} holds {:?} torrent(s)", target.display(), count);
            entries.push(TargetOccupancy {
                target: target.clone(),
                count,
            });
        }
        Self { entries }
    }

    pub fn from_entries(entries: Vec<TargetOccupancy>) -> Self {
        Self { entries }
    }

    /// Index of the least occupied eligible target; ties go to the first one.
    pub fn select(&self, limit: usize) -> Option<usize> {
        let mut best: Option<(usize, usize)> = None;
        for (idx, entry) in self.entries.iter().enumerate() {
            if !entry.is_eligible(limit) {
                continue;
            }
            let count = entry.count.unwrap_or_default();
            if best.is_none_or(|(_, best_count)| count < best_count) {
                best = Some((idx, count));
            }
        }
        best.map(|(idx, _)| idx)
    }

    pub fn record_placement(&mut self, idx: usize) {
        if let Some(count) = self.entries.get_mut(idx).and_then(|e| e.count.as_mut()) {
            *count += 1;
        }
    }

    pub fn target(&self, idx: usize) -> Option<&Path> {
        self.entries.get(idx).map(|e| e.target.as_path())
    }

    pub fn entries(&self) -> &[TargetOccupancy] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<TargetOccupancy> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn table(counts: &[Option<usize>]) -> OccupancyTable {
        OccupancyTable::from_entries(
            counts
                .iter()
                .enumerate()
                .map(|(i, count)| TargetOccupancy {
                    target: PathBuf::from(format!("/watch/{}", i)),
                    count: *count,
                })
                .collect(),
        )
    }

    #[test]
    fn test_select_least_occupied_under_limit() {
        let t = table(&[Some(2), Some(1)]);
        assert_eq!(t.select(2), Some(1));
    }

    #[test]
    fn test_select_ties_go_to_first() {
        let t = table(&[Some(3), Some(1), Some(1)]);
        assert_eq!(t.select(0), Some(1));
    }

    #[test]
    fn test_select_none_when_full() {
        let t = table(&[Some(1), Some(1)]);
        assert_eq!(t.select(1), None);
    }

    #[test]
    fn test_unlimited_is_always_eligible() {
        let t = table(&[Some(5000), Some(7000)]);
        assert_eq!(t.select(0), Some(0));
    }

    #[test]
    fn test_unreadable_target_is_skipped() {
        let t = table(&[None, Some(4)]);
        assert_eq!(t.select(0), Some(1));
        assert_eq!(table(&[None]).select(0), None);
    }

    #[test]
    fn test_record_placement_updates_selection() {
        let mut t = table(&[Some(1), Some(1)]);
        assert_eq!(t.select(2), Some(0));
        t.record_placement(0);
        assert_eq!(t.entries()[0].count, Some(2));
        assert_eq!(t.select(2), Some(1));
        t.record_placement(1);
        assert_eq!(t.select(2), None);
    }

    #[tokio::test]
    async fn test_observe_counts_and_missing_target() {
        let temp = TempDir::new().unwrap();
        let full = temp.path().join("full");
        std::fs::create_dir(&full).unwrap();
        std::fs::write(full.join("a.torrent"), "a").unwrap();
        std::fs::write(full.join("b.torrent"), "b").unwrap();
        let missing = temp.path().join("missing");

        let t = OccupancyTable::observe(&[full, missing], "torrent").await;
        assert_eq!(t.entries()[0].count, Some(2));
        assert_eq!(t.entries()[1].count, Some(0));
        assert_eq!(t.select(0), Some(1));
    }
}
