//! Mock placer for testing.

use async_trait::async_trait;
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::placer::{PlaceMode, PlacedFile, PlacementOutcome, Placer, PlacerError};

/// A recorded placement for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedPlacement {
    pub source: PathBuf,
    pub destination_dir: PathBuf,
    pub mode: PlaceMode,
    /// Whether the placement succeeded.
    pub success: bool,
}

/// Mock implementation of the Placer trait.
///
/// Never touches the filesystem. Every call is recorded and reported as
/// written under its original name, unless a failure was injected for it.
///
/// # Example
///
/// ```rust,ignore
/// use torrdispatch_core::testing::MockPlacer;
///
/// let placer = MockPlacer::new();
/// placer.fail_for("/hole/b.torrent").await;
///
/// let dispatcher = Dispatcher::new(group, "torrent", placer.clone())?;
/// dispatcher.dispatch(None, false).await?;
///
/// assert_eq!(placer.placement_count().await, 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockPlacer {
    placements: Arc<RwLock<Vec<RecordedPlacement>>>,
    /// Sources whose placement always fails.
    failing: Arc<RwLock<HashSet<PathBuf>>>,
    /// Sources placed without being removed, like a move whose cleanup failed.
    kept: Arc<RwLock<HashSet<PathBuf>>>,
    /// If set, the next operation will fail with this error.
    next_error: Arc<RwLock<Option<PlacerError>>>,
}

impl MockPlacer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded placements.
    pub async fn recorded_placements(&self) -> Vec<RecordedPlacement> {
        self.placements.read().await.clone()
    }

    pub async fn placement_count(&self) -> usize {
        self.placements.read().await.len()
    }

    /// Make every placement of `source` fail.
    pub async fn fail_for(&self, source: impl Into<PathBuf>) {
        self.failing.write().await.insert(source.into());
    }

    /// Report every move of `source` as written but with the source left behind.
    pub async fn keep_source_for(&self, source: impl Into<PathBuf>) {
        self.kept.write().await.insert(source.into());
    }

    /// Configure the next operation to fail with the given error.
    pub async fn set_next_error(&self, error: PlacerError) {
        *self.next_error.write().await = Some(error);
    }

    async fn take_error(&self, source: &Path) -> Option<PlacerError> {
        if let Some(err) = self.next_error.write().await.take() {
            return Some(err);
        }
        self.failing.read().await.contains(source).then(|| {
            PlacerError::Io(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "simulated placement failure",
            ))
        })
    }
}

#[async_trait]
impl Placer for MockPlacer {
    fn name(&self) -> &str {
        "mock"
    }

    async fn place(
        &self,
        source: &Path,
        destination_dir: &Path,
        mode: PlaceMode,
    ) -> Result<PlacedFile, PlacerError> {
        let error = self.take_error(source).await;
        self.placements.write().await.push(RecordedPlacement {
            source: source.to_path_buf(),
            destination_dir: destination_dir.to_path_buf(),
            mode,
            success: error.is_none(),
        });
        if let Some(err) = error {
            return Err(err);
        }

        let destination = match source.file_name() {
            Some(name) => destination_dir.join(name),
            None => {
                return Err(PlacerError::SourceNotFound {
                    path: source.to_path_buf(),
                })
            }
        };
        let kept = self.kept.read().await.contains(source);
        Ok(PlacedFile {
            source: source.to_path_buf(),
            destination,
            outcome: PlacementOutcome::Written,
            size_bytes: 0,
            source_removed: mode == PlaceMode::Move && !kept,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_placements() {
        let placer = MockPlacer::new();

        let placed = placer
            .safe_move(Path::new("/hole/a.torrent"), Path::new("/rt1"))
            .await
            .unwrap();
        assert_eq!(placed.destination, PathBuf::from("/rt1/a.torrent"));
        assert!(placed.source_removed);

        placer
            .safe_copy(Path::new("/hole/b.torrent"), Path::new("/rt2"))
            .await
            .unwrap();

        let placements = placer.recorded_placements().await;
        assert_eq!(placements.len(), 2);
        assert_eq!(placements[0].mode, PlaceMode::Move);
        assert_eq!(placements[1].mode, PlaceMode::Copy);
        assert!(placements.iter().all(|p| p.success));
    }

    #[tokio::test]
    async fn test_fail_for_source() {
        let placer = MockPlacer::new();
        placer.fail_for("/hole/bad.torrent").await;

        assert!(placer
            .safe_move(Path::new("/hole/bad.torrent"), Path::new("/rt1"))
            .await
            .is_err());
        assert!(placer
            .safe_move(Path::new("/hole/good.torrent"), Path::new("/rt1"))
            .await
            .is_ok());

        let placements = placer.recorded_placements().await;
        assert!(!placements[0].success);
        assert!(placements[1].success);
    }

    #[tokio::test]
    async fn test_keep_source_for() {
        let placer = MockPlacer::new();
        placer.keep_source_for("/hole/stuck.torrent").await;

        let placed = placer
            .safe_move(Path::new("/hole/stuck.torrent"), Path::new("/rt1"))
            .await
            .unwrap();
        assert_eq!(placed.outcome, PlacementOutcome::Written);
        assert!(!placed.source_removed);
    }

    #[tokio::test]
    async fn test_error_injection_is_consumed() {
        let placer = MockPlacer::new();
        placer
            .set_next_error(PlacerError::SourceNotFound {
                path: PathBuf::from("/hole/a.torrent"),
            })
            .await;

        let source = Path::new("/hole/a.torrent");
        assert!(placer.safe_move(source, Path::new("/rt1")).await.is_err());
        assert!(placer.safe_move(source, Path::new("/rt1")).await.is_ok());
        assert_eq!(placer.placement_count().await, 2);
    }
}
