//! Detection of candidates already present in a watch directory.

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, error, info, warn};

use crate::metainfo::{decode_file, ContentHash};
use crate::watchdir::{is_managed_name, list_entries};

/// A candidate whose content hash was found at `located_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateMatch {
    pub candidate: PathBuf,
    pub located_at: PathBuf,
}

/// Looks for every candidate in `targets`, walking them recursively.
///
/// Candidates that cannot be decoded are reported and treated as new. Every
/// location holding a candidate's content hash is returned, in walk order.
/// A candidate never matches its own path.
pub async fn find_duplicates(
    candidates: &[PathBuf],
    targets: &[PathBuf],
    extension: &str,
) -> Vec<DuplicateMatch> {
    let index = hash_candidates(candidates).await;
    if index.is_empty() {
        return Vec::new();
    }
    debug!(
        "Searching watchdirs for {} candidate hash(es)…",
        index.len()
    );

    let mut matches = Vec::new();
    for target in targets {
        walk_target(target, extension, &index, &mut matches).await;
    }
    matches
}

async fn hash_candidates(candidates: &[PathBuf]) -> HashMap<ContentHash, Vec<PathBuf>> {
    let mut index: HashMap<ContentHash, Vec<PathBuf>> = HashMap::new();
    for candidate in candidates {
        match decode_file(candidate).await {
            Ok(meta) => {
                let paths = index.entry(meta.content_hash).or_default();
                if !paths.contains(candidate) {
                    paths.push(candidate.clone());
                }
            }
            Err(e) => {
                info!(
                    "Cannot read the hash of {}, considering it new",
                    candidate.display()
                );
                debug!("{}", e);
            }
        }
    }
    index
}

/// Depth-first walk over `target`, comparing every managed file with the index.
async fn walk_target(
    target: &Path,
    extension: &str,
    index: &HashMap<ContentHash, Vec<PathBuf>>,
    matches: &mut Vec<DuplicateMatch>,
) {
    let mut pending = vec![target.to_path_buf()];
    let mut visited = HashSet::new();

    while let Some(dir) = pending.pop() {
        // Symlinked directories are followed, but each real directory once.
        if let Ok(real) = fs::canonicalize(&dir).await {
            if !visited.insert(real) {
                continue;
            }
        }
        debug!("Scanning all torrents into {}", dir.display());
        let entries = match list_entries(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound && dir == target => {
                warn!("Target {} does not exist", target.display());
                continue;
            }
            Err(e) => {
                warn!("Cannot list {}: {}", dir.display(), e);
                continue;
            }
        };

        let mut subdirs = Vec::new();
        for path in entries {
            let meta = match fs::metadata(&path).await {
                Ok(meta) => meta,
                Err(_) => continue,
            };
            if meta.is_dir() {
                subdirs.push(path);
                continue;
            }
            let managed = path
                .file_name()
                .is_some_and(|name| is_managed_name(name, extension));
            if !meta.is_file() || !managed {
                continue;
            }

            match decode_file(&path).await {
                Ok(found) => {
                    if let Some(candidates) = index.get(&found.content_hash) {
                        for candidate in candidates {
                            if *candidate == path {
                                continue;
                            }
                            debug!("Hash matches for {}", path.display());
                            matches.push(DuplicateMatch {
                                candidate: candidate.clone(),
                                located_at: path.clone(),
                            });
                        }
                    }
                }
                Err(e) => {
                    error!("Error when opening the torrent {}", path.display());
                    error!("{}", e);
                }
            }
        }

        // Reversed so subdirectories pop in sorted order.
        pending.extend(subdirs.into_iter().rev());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures::{pieces, write_torrent};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_no_candidates_no_matches() {
        let temp = TempDir::new().unwrap();
        let matches = find_duplicates(&[], &[temp.path().to_path_buf()], "torrent").await;
        assert!(matches.is_empty());
    }

    #[tokio::test]
    async fn test_matches_by_hash_not_name() {
        let temp = TempDir::new().unwrap();
        let hole = temp.path().join("hole");
        let watch = temp.path().join("watch");
        std::fs::create_dir_all(&hole).unwrap();
        std::fs::create_dir_all(&watch).unwrap();

        let dup = write_torrent(&hole, "new-name.torrent", Some("http://t/a"), &pieces(1));
        let fresh = write_torrent(&hole, "fresh.torrent", Some("http://t/a"), &pieces(2));
        let existing = write_torrent(&watch, "old-name.torrent", Some("http://x/a"), &pieces(1));
        write_torrent(&watch, "fresh.torrent", Some("http://t/a"), &pieces(3));

        let matches = find_duplicates(&[dup.clone(), fresh], &[watch], "torrent").await;
        assert_eq!(
            matches,
            vec![DuplicateMatch {
                candidate: dup,
                located_at: existing,
            }]
        );
    }

    #[tokio::test]
    async fn test_walks_nested_directories_and_reports_all_locations() {
        let temp = TempDir::new().unwrap();
        let hole = temp.path().join("hole");
        let watch1 = temp.path().join("watch1");
        let watch2 = temp.path().join("watch2");
        std::fs::create_dir_all(&hole).unwrap();
        std::fs::create_dir_all(watch1.join("done/2024")).unwrap();
        std::fs::create_dir_all(&watch2).unwrap();

        let candidate = write_torrent(&hole, "a.torrent", None, &pieces(9));
        let deep = write_torrent(&watch1.join("done/2024"), "a.torrent", None, &pieces(9));
        let flat = write_torrent(&watch2, "renamed.torrent", None, &pieces(9));

        let matches = find_duplicates(
            std::slice::from_ref(&candidate),
            &[watch1, watch2],
            "torrent",
        )
        .await;
        let located: Vec<_> = matches.iter().map(|m| m.located_at.clone()).collect();
        assert_eq!(located, vec![deep, flat]);
        assert!(matches.iter().all(|m| m.candidate == candidate));
    }

    #[tokio::test]
    async fn test_undecodable_files_are_skipped() {
        let temp = TempDir::new().unwrap();
        let hole = temp.path().join("hole");
        let watch = temp.path().join("watch");
        std::fs::create_dir_all(&hole).unwrap();
        std::fs::create_dir_all(&watch).unwrap();

        let junk = hole.join("junk.torrent");
        std::fs::write(&junk, "garbage").unwrap();
        std::fs::write(watch.join("junk.torrent"), "garbage").unwrap();
        let good = write_torrent(&hole, "good.torrent", None, &pieces(4));
        let placed = write_torrent(&watch, "good.torrent", None, &pieces(4));

        let matches = find_duplicates(&[junk, good.clone()], &[watch], "torrent").await;
        assert_eq!(
            matches,
            vec![DuplicateMatch {
                candidate: good,
                located_at: placed,
            }]
        );
    }

    #[tokio::test]
    async fn test_missing_target_and_self_match() {
        let temp = TempDir::new().unwrap();
        let watch = temp.path().join("watch");
        std::fs::create_dir_all(&watch).unwrap();
        let inside = write_torrent(&watch, "a.torrent", None, &pieces(5));

        let matches = find_duplicates(
            std::slice::from_ref(&inside),
            &[temp.path().join("missing"), watch],
            "torrent",
        )
        .await;
        assert!(matches.is_empty());
    }
}
