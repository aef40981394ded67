//! Blackhole scanning.

use std::collections::HashSet;
use std::path::PathBuf;
use tokio::fs;
use tracing::debug;

use crate::dispatcher::DispatchError;
use crate::filter::TrackerFilter;
use crate::watchdir::list_managed;

/// Candidates found in `sources` that pass `filter`.
///
/// Directories contribute their managed files (sorted, non-recursive); plain
/// files are taken as-is. Order follows `sources`, duplicates are dropped.
/// A source that is neither a directory nor a regular file is a configuration
/// error and aborts the scan.
pub async fn scan(
    sources: &[PathBuf],
    filter: &TrackerFilter,
    extension: &str,
) -> Result<Vec<PathBuf>, DispatchError> {
    let mut seen = HashSet::new();
    let mut candidates = Vec::new();

    for source in sources {
        debug!("Scanning {}…", source.display());
        let meta = fs::metadata(source)
            .await
            .map_err(|e| DispatchError::invalid_source(source, e.to_string()))?;

        let found = if meta.is_dir() {
            list_managed(source, extension)
                .await
                .map_err(|e| DispatchError::invalid_source(source, e.to_string()))?
        } else if meta.is_file() {
            vec![source.clone()]
        } else {
            return Err(DispatchError::invalid_source(
                source,
                "not a regular file or directory",
            ));
        };

        for path in found {
            if seen.contains(&path) {
                continue;
            }
            if filter.matches(&path).await {
                seen.insert(path.clone());
                candidates.push(path);
            }
        }
    }

    debug!("Found {} candidate(s) in {:?}", candidates.len(), sources);
    Ok(candidates)
}
