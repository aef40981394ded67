//! Trait definitions for the placer module.

use async_trait::async_trait;
use std::path::Path;

use super::error::PlacerError;
use super::types::{PlaceMode, PlacedFile};

/// A placer that can put files into a directory without overwriting anything.
#[async_trait]
pub trait Placer: Send + Sync {
    /// Returns the name of this placer implementation.
    fn name(&self) -> &str;

    /// Places `source` into `destination_dir` under its own name, or the next
    /// free counter-suffixed name if a different file already uses it.
    async fn place(
        &self,
        source: &Path,
        destination_dir: &Path,
        mode: PlaceMode,
    ) -> Result<PlacedFile, PlacerError>;

    /// Moves `source` into `destination_dir`.
    ///
    /// When the destination already holds identical bytes the source is still
    /// removed and the existing path is returned.
    async fn safe_move(
        &self,
        source: &Path,
        destination_dir: &Path,
    ) -> Result<PlacedFile, PlacerError> {
        self.place(source, destination_dir, PlaceMode::Move).await
    }

    /// Copies `source` into `destination_dir`, leaving the source in place.
    async fn safe_copy(
        &self,
        source: &Path,
        destination_dir: &Path,
    ) -> Result<PlacedFile, PlacerError> {
        self.place(source, destination_dir, PlaceMode::Copy).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placer::PlacementOutcome;
    use std::path::PathBuf;
    use std::sync::Mutex;

    struct RecordingPlacer {
        modes: Mutex<Vec<PlaceMode>>,
    }

    #[async_trait]
    impl Placer for RecordingPlacer {
        fn name(&self) -> &str {
            "recording"
        }

        async fn place(
            &self,
            source: &Path,
            destination_dir: &Path,
            mode: PlaceMode,
        ) -> Result<PlacedFile, PlacerError> {
            self.modes.lock().unwrap().push(mode);
            Ok(PlacedFile {
                source: source.to_path_buf(),
                destination: destination_dir.join("x.torrent"),
                outcome: PlacementOutcome::Written,
                size_bytes: 0,
                source_removed: mode == PlaceMode::Move,
            })
        }
    }

    #[tokio::test]
    async fn test_default_methods_pick_mode() {
        let placer = RecordingPlacer {
            modes: Mutex::new(Vec::new()),
        };
        let src = PathBuf::from("/blackhole/x.torrent");
        let dir = PathBuf::from("/watch");

        let moved = placer.safe_move(&src, &dir).await.unwrap();
        let copied = placer.safe_copy(&src, &dir).await.unwrap();

        assert!(moved.source_removed);
        assert!(!copied.source_removed);
        assert_eq!(
            *placer.modes.lock().unwrap(),
            vec![PlaceMode::Move, PlaceMode::Copy]
        );
    }
}
