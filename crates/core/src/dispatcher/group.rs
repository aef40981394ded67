//! The dispatcher of a single group.

use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, error, info, warn};

use super::error::DispatchError;
use super::types::{MoveFailure, MoveReport, PlannedMove};
use crate::config::GroupConfig;
use crate::duplicates::{find_duplicates, DuplicateMatch};
use crate::filter::TrackerFilter;
use crate::occupancy::{OccupancyTable, TargetOccupancy};
use crate::placer::{PlacementOutcome, Placer};
use crate::scanner;
use crate::watchdir::list_entries;

/// Dispatches the torrents of one group.
///
/// The group configuration is owned and never changes after construction.
pub struct Dispatcher<P: Placer> {
    group: GroupConfig,
    filter: TrackerFilter,
    extension: String,
    placer: P,
}

impl<P: Placer> Dispatcher<P> {
    /// Creates a dispatcher for `group`, managing files ending in `.extension`.
    pub fn new(
        group: GroupConfig,
        extension: impl Into<String>,
        placer: P,
    ) -> Result<Self, DispatchError> {
        if group.targets.is_empty() {
            return Err(DispatchError::InvalidGroup(format!(
                "group {} has no targets",
                group.label()
            )));
        }
        let filter = TrackerFilter::new(&group.filters.trackers)
            .map_err(|e| DispatchError::InvalidGroup(e.to_string()))?;
        let extension = extension.into().trim_start_matches('.').to_string();

        Ok(Self {
            group,
            filter,
            extension,
            placer,
        })
    }

    pub fn name(&self) -> Option<&str> {
        self.group.name.as_deref()
    }

    pub fn label(&self) -> &str {
        self.group.label()
    }

    pub fn group(&self) -> &GroupConfig {
        &self.group
    }

    pub fn placer(&self) -> &P {
        &self.placer
    }

    /// Human readable description of the group.
    pub fn describe(&self) -> String {
        let trackers = if self.group.filters.trackers.is_empty() {
            "any".to_string()
        } else {
            self.group.filters.trackers.join(", ")
        };
        let limit = match self.group.limit {
            0 => "unlimited".to_string(),
            n => n.to_string(),
        };
        format!(
            "Name: {}\n\
             Blackholes to watch: {}\n\
             Watchdirs to target: {}\n\
             Downloads directories: {}\n\
             Trackers: {}\n\
             Limit per watchdir: {}",
            self.name().unwrap_or("undefined"),
            join_paths(&self.group.sources),
            join_paths(&self.group.targets),
            join_paths(&self.group.download_dirs),
            trackers,
            limit
        )
    }

    /// Current number of torrents in each target.
    pub async fn count(&self) -> Vec<TargetOccupancy> {
        OccupancyTable::observe(&self.group.targets, &self.extension)
            .await
            .into_entries()
    }

    /// Candidates in `sources` (or the configured sources) that pass the filters.
    pub async fn scan(&self, sources: Option<&[PathBuf]>) -> Result<Vec<PathBuf>, DispatchError> {
        let sources = sources.unwrap_or(&self.group.sources);
        scanner::scan(sources, &self.filter, &self.extension).await
    }

    /// Where the content of each of `torrents` already sits in the targets.
    pub async fn have(&self, torrents: &[PathBuf]) -> Vec<DuplicateMatch> {
        find_duplicates(torrents, &self.group.targets, &self.extension).await
    }

    /// Entries of the download directories whose name contains every term,
    /// ignoring case.
    pub async fn search<S: AsRef<str>>(&self, terms: &[S]) -> Vec<PathBuf> {
        let terms: Vec<String> = terms.iter().map(|t| t.as_ref().to_lowercase()).collect();
        let mut results = Vec::new();
        for dir in &self.group.download_dirs {
            match list_entries(dir).await {
                Ok(entries) => results.extend(entries.into_iter().filter(|path| {
                    let name = file_name_lowercase(path);
                    terms.iter().all(|term| name.contains(term.as_str()))
                })),
                Err(e) => warn!("Cannot search in {}: {}", dir.display(), e),
            }
        }
        results
    }

    /// Entries of the targets named exactly `name`.
    pub async fn search_in_watchlist(&self, name: &str) -> Vec<PathBuf> {
        let mut results = Vec::new();
        for target in &self.group.targets {
            match list_entries(target).await {
                Ok(entries) => results.extend(
                    entries
                        .into_iter()
                        .filter(|path| path.file_name().is_some_and(|n| n == name)),
                ),
                Err(e) => warn!("Cannot search in {}: {}", target.display(), e),
            }
        }
        results
    }

    /// Runs one dispatch pass.
    ///
    /// Scans `sources` (or the configured ones), deletes candidates already
    /// present in a target, then moves each remaining candidate into the least
    /// occupied target under the limit. Occupancy is read once and tracked in
    /// memory for the rest of the pass. Candidates that do not fit or fail to
    /// move stay where they are for the next pass.
    ///
    /// With `dryrun` the filesystem is left untouched and the intended moves
    /// are only logged and reported as `planned`.
    pub async fn dispatch(
        &self,
        sources: Option<&[PathBuf]>,
        dryrun: bool,
    ) -> Result<MoveReport, DispatchError> {
        let mut report = MoveReport::default();

        let mut candidates = self.scan(sources).await?;
        if candidates.is_empty() {
            debug!("Group {}: nothing to dispatch", self.label());
            return Ok(report);
        }

        for found in self.have(&candidates).await {
            let Some(pos) = candidates.iter().position(|c| *c == found.candidate) else {
                continue;
            };
            candidates.remove(pos);
            info!(
                "Torrent \"{}\" already in a watchdir ({}), pass…",
                found.candidate.display(),
                found.located_at.display()
            );
            if !dryrun {
                match fs::remove_file(&found.candidate).await {
                    Ok(()) => report.cleaned.push(found.candidate.clone()),
                    Err(e) => warn!(
                        "Error when deleting \"{}\": {}",
                        found.candidate.display(),
                        e
                    ),
                }
            }
            report.already_dispatched.push(found);
        }

        let mut occupancy = OccupancyTable::observe(&self.group.targets, &self.extension).await;

        for candidate in candidates {
            let Some((idx, target)) = occupancy
                .select(self.group.limit)
                .and_then(|idx| occupancy.target(idx).map(|t| (idx, t.to_path_buf())))
            else {
                warn!(
                    "{} cannot be moved, all targets are full.",
                    candidate.display()
                );
                report.left_unplaced.push(candidate);
                continue;
            };

            if dryrun {
                info!(
                    "[dry run] Moving {} in {}",
                    candidate.display(),
                    target.display()
                );
                occupancy.record_placement(idx);
                report.planned.push(PlannedMove { candidate, target });
                continue;
            }

            info!("Moving {} in {}", candidate.display(), target.display());
            match self.placer.safe_move(&candidate, &target).await {
                Ok(placed) => {
                    if placed.outcome == PlacementOutcome::Written {
                        occupancy.record_placement(idx);
                    }
                    if !placed.source_removed && placed.outcome == PlacementOutcome::Written {
                        warn!(
                            "{} is still in the blackhole, it will be cleaned up next pass",
                            candidate.display()
                        );
                    }
                    if placed.was_renamed() {
                        info!(
                            "{} placed as {} to avoid overwriting",
                            candidate.display(),
                            placed.destination.display()
                        );
                    }
                    report.moved.push(placed);
                }
                Err(e) => {
                    error!(
                        "Failed to move {} in {}: {}",
                        candidate.display(),
                        target.display(),
                        e
                    );
                    report.failures.push(MoveFailure {
                        candidate,
                        target,
                        reason: e.to_string(),
                    });
                }
            }
        }

        debug!(
            "Group {}: {} moved, {} already dispatched, {} left, {} failed",
            self.label(),
            report.moved_count(),
            report.already_dispatched.len(),
            report.left_unplaced.len(),
            report.failures.len()
        );
        Ok(report)
    }
}

fn join_paths(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return "none".to_string();
    }
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn file_name_lowercase(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}
