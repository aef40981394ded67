//! File system placer implementation.

use async_trait::async_trait;
use std::collections::HashSet;
use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tokio::fs::{self, File, OpenOptions};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::config::PlacerConfig;
use super::error::PlacerError;
use super::naming::IncrementedNames;
use super::traits::Placer;
use super::types::{PlaceMode, PlacedFile, PlacementOutcome};

/// Attempts at finding a free staging file name before giving up on staging.
const STAGING_ATTEMPTS: u32 = 16;

/// How bytes get published under a candidate name.
///
/// Every strategy fails with `AlreadyExists` rather than replacing a file.
#[derive(Debug)]
enum Publish {
    /// Hard link the source itself (same filesystem, move only).
    LinkSource,
    /// Hard link a fully written staging copy inside the destination directory.
    LinkStaged(PathBuf),
    /// Exclusive-create the destination and copy into it.
    Exclusive,
}

/// `.{file_name}.{pid}-{attempt}.part`
fn staging_name(file_name: &OsStr, pid: u32, attempt: u32) -> String {
    format!(".{}.{}-{}.part", file_name.to_string_lossy(), pid, attempt)
}

/// Whether `name` looks like a file written by [`staging_name`].
fn is_staging_name(name: &str) -> bool {
    let Some(inner) = name
        .strip_prefix('.')
        .and_then(|n| n.strip_suffix(".part"))
    else {
        return false;
    };
    let Some((stem, tag)) = inner.rsplit_once('.') else {
        return false;
    };
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    !stem.is_empty()
        && tag
            .split_once('-')
            .is_some_and(|(pid, attempt)| all_digits(pid) && all_digits(attempt))
}

/// File system based placer implementation.
pub struct FsPlacer {
    config: PlacerConfig,
    /// Directories already swept for stale staging files.
    swept: Mutex<HashSet<PathBuf>>,
}

impl FsPlacer {
    /// Creates a new file system placer with the given configuration.
    pub fn new(config: PlacerConfig) -> Self {
        Self {
            config,
            swept: Mutex::new(HashSet::new()),
        }
    }

    /// Creates a placer with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(PlacerConfig::default())
    }

    async fn ensure_dir(&self, dir: &Path) -> Result<(), PlacerError> {
        match fs::metadata(dir).await {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(PlacerError::DirectoryCreationFailed {
                path: dir.to_path_buf(),
                source: io::Error::other("exists and is not a directory"),
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound && self.config.create_parents => {
                debug!("Creating destination directory {}", dir.display());
                fs::create_dir_all(dir)
                    .await
                    .map_err(|e| PlacerError::DirectoryCreationFailed {
                        path: dir.to_path_buf(),
                        source: e,
                    })
            }
            Err(e) => Err(PlacerError::Io(e)),
        }
    }

    /// Removes staging files left in `dir` by an interrupted run, once per
    /// directory and placer. Only files older than the configured age are
    /// touched so a concurrent run keeps its own.
    async fn sweep_staging(&self, dir: &Path) {
        if !self.swept.lock().await.insert(dir.to_path_buf()) {
            return;
        }

        let mut entries = match fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(e) => {
                debug!("Cannot look for staging files in {}: {}", dir.display(), e);
                return;
            }
        };
        let max_age = self.config.staging_max_age();
        let now = SystemTime::now();

        while let Ok(Some(entry)) = entries.next_entry().await {
            if !is_staging_name(&entry.file_name().to_string_lossy()) {
                continue;
            }
            let stale = entry
                .metadata()
                .await
                .and_then(|m| {
                    let modified = m.modified()?;
                    Ok(m.is_file() && now.duration_since(modified).unwrap_or_default() >= max_age)
                })
                .unwrap_or(false);
            if !stale {
                continue;
            }
            let path = entry.path();
            match fs::remove_file(&path).await {
                Ok(()) => info!("Removed stale staging file {}", path.display()),
                Err(e) => warn!("Failed to remove stale staging file {}: {}", path.display(), e),
            }
        }
    }

    /// Copies `source` into a new file at `destination`, failing with
    /// `AlreadyExists` if anything is there. A partial copy is removed.
    async fn copy_exclusive(&self, source: &Path, destination: &Path) -> io::Result<u64> {
        let source_file = File::open(source).await?;
        let dest_file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(destination)
            .await?;

        let result = self.copy_contents(source_file, dest_file).await;
        if result.is_err() {
            let _ = fs::remove_file(destination).await;
        }
        result
    }

    async fn copy_contents(&self, source: File, destination: File) -> io::Result<u64> {
        let mut reader = BufReader::with_capacity(self.config.buffer_size, source);
        let mut writer = BufWriter::with_capacity(self.config.buffer_size, destination);
        let mut buffer = vec![0u8; self.config.buffer_size];
        let mut total_bytes = 0u64;

        loop {
            let bytes_read = reader.read(&mut buffer).await?;
            if bytes_read == 0 {
                break;
            }
            writer.write_all(&buffer[..bytes_read]).await?;
            total_bytes += bytes_read as u64;
        }

        writer.flush().await?;
        writer.into_inner().sync_all().await?;
        Ok(total_bytes)
    }

    /// Writes a complete hidden copy of `source` into `dir`.
    async fn stage(&self, source: &Path, dir: &Path, file_name: &OsStr) -> io::Result<PathBuf> {
        let pid = std::process::id();
        let mut last_error = None;

        for attempt in 0..STAGING_ATTEMPTS {
            let staging = dir.join(staging_name(file_name, pid, attempt));
            match self.copy_exclusive(source, &staging).await {
                Ok(_) => return Ok(staging),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => last_error = Some(e),
                Err(e) => return Err(e),
            }
        }
        Err(last_error.unwrap_or_else(|| io::Error::other("no free staging name")))
    }

    /// Staged publication if a staging copy can be written, exclusive copy otherwise.
    async fn staged_or_exclusive(
        &self,
        source: &Path,
        dir: &Path,
        file_name: &OsStr,
        staged: &mut Option<PathBuf>,
    ) -> Publish {
        match self.stage(source, dir, file_name).await {
            Ok(path) => {
                *staged = Some(path.clone());
                Publish::LinkStaged(path)
            }
            Err(e) => {
                debug!(
                    "Cannot stage {} in {} ({}), copying in place",
                    source.display(),
                    dir.display(),
                    e
                );
                Publish::Exclusive
            }
        }
    }

    /// Whether `existing` is a regular file with the same bytes as `source`.
    ///
    /// Anything at `existing` that cannot be read as a file (a directory, a
    /// dangling link, an unreadable file) only makes the name taken. Failing to
    /// read `source` is an error.
    async fn identical(&self, source: &Path, existing: &Path) -> Result<bool, PlacerError> {
        let failed = |e: io::Error| {
            PlacerError::compare_failed(source.to_path_buf(), existing.to_path_buf(), e)
        };

        let (existing_file, existing_len) = match fs::metadata(existing).await {
            Ok(meta) if meta.is_file() => match File::open(existing).await {
                Ok(file) => (file, meta.len()),
                Err(e) => {
                    debug!("Cannot read {} ({}), name taken", existing.display(), e);
                    return Ok(false);
                }
            },
            Ok(_) => return Ok(false),
            Err(e) => {
                debug!("Cannot inspect {} ({}), name taken", existing.display(), e);
                return Ok(false);
            }
        };

        let source_file = File::open(source).await.map_err(failed)?;
        let source_len = source_file.metadata().await.map_err(failed)?.len();
        if source_len != existing_len {
            return Ok(false);
        }

        let mut reader_a = BufReader::with_capacity(self.config.buffer_size, source_file);
        let mut reader_b = BufReader::with_capacity(self.config.buffer_size, existing_file);
        let mut buf_a = vec![0u8; self.config.buffer_size];
        let mut buf_b = vec![0u8; self.config.buffer_size];

        loop {
            let read_a = read_full(&mut reader_a, &mut buf_a).await.map_err(failed)?;
            let read_b = match read_full(&mut reader_b, &mut buf_b).await {
                Ok(n) => n,
                Err(e) => {
                    debug!("Cannot read {} ({}), name taken", existing.display(), e);
                    return Ok(false);
                }
            };
            if read_a != read_b || buf_a[..read_a] != buf_b[..read_b] {
                return Ok(false);
            }
            if read_a == 0 {
                return Ok(true);
            }
        }
    }

    /// Finds the final name for `source` in `dir` and publishes it there.
    async fn publish(
        &self,
        source: &Path,
        dir: &Path,
        file_name: &OsStr,
        mut strategy: Publish,
        staged: &mut Option<PathBuf>,
    ) -> Result<(PathBuf, PlacementOutcome), PlacerError> {
        let mut names = IncrementedNames::new(file_name, &self.config.counter_separator);
        let mut candidate = names
            .next()
            .ok_or_else(|| PlacerError::SourceNotFound {
                path: source.to_path_buf(),
            })?;

        loop {
            let destination = dir.join(&candidate);
            let attempt = match &strategy {
                Publish::LinkSource => fs::hard_link(source, &destination).await,
                Publish::LinkStaged(staging) => fs::hard_link(staging, &destination).await,
                Publish::Exclusive => self
                    .copy_exclusive(source, &destination)
                    .await
                    .map(|_| ()),
            };

            match attempt {
                Ok(()) => return Ok((destination, PlacementOutcome::Written)),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    if self.identical(source, &destination).await? {
                        debug!(
                            "{} already holds the content of {}",
                            destination.display(),
                            source.display()
                        );
                        return Ok((destination, PlacementOutcome::AlreadyPresent));
                    }
                    debug!(
                        "{} exists with different content, trying the next name",
                        destination.display()
                    );
                    candidate = names.next().ok_or_else(|| {
                        PlacerError::copy_failed(
                            source.to_path_buf(),
                            destination.clone(),
                            io::Error::other("no free destination name"),
                        )
                    })?;
                }
                Err(e) => {
                    strategy = match strategy {
                        Publish::LinkSource => {
                            debug!(
                                "Cannot link {} to {} ({}), falling back to copy",
                                source.display(),
                                destination.display(),
                                e
                            );
                            self.staged_or_exclusive(source, dir, file_name, staged)
                                .await
                        }
                        Publish::LinkStaged(_) => {
                            debug!(
                                "Cannot link staged copy to {} ({}), copying in place",
                                destination.display(),
                                e
                            );
                            Publish::Exclusive
                        }
                        Publish::Exclusive => {
                            return Err(PlacerError::copy_failed(
                                source.to_path_buf(),
                                destination,
                                e,
                            ))
                        }
                    };
                }
            }
        }
    }
}

#[async_trait]
impl Placer for FsPlacer {
    fn name(&self) -> &str {
        "fs"
    }

    async fn place(
        &self,
        source: &Path,
        destination_dir: &Path,
        mode: PlaceMode,
    ) -> Result<PlacedFile, PlacerError> {
        let not_found = || PlacerError::SourceNotFound {
            path: source.to_path_buf(),
        };

        let link_meta = match fs::symlink_metadata(source).await {
            Ok(meta) => meta,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(not_found()),
            Err(e) => return Err(PlacerError::Io(e)),
        };
        let meta = match fs::metadata(source).await {
            Ok(meta) => meta,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(not_found()),
            Err(e) => return Err(PlacerError::Io(e)),
        };
        if !meta.is_file() {
            return Err(not_found());
        }
        let file_name = source.file_name().ok_or_else(not_found)?;

        self.ensure_dir(destination_dir).await?;
        self.sweep_staging(destination_dir).await;

        let mut staged = None;
        let strategy = if mode == PlaceMode::Move
            && self.config.prefer_links
            && !link_meta.file_type().is_symlink()
        {
            Publish::LinkSource
        } else {
            self.staged_or_exclusive(source, destination_dir, file_name, &mut staged)
                .await
        };

        let published = self
            .publish(source, destination_dir, file_name, strategy, &mut staged)
            .await;

        if let Some(staging) = staged {
            if let Err(e) = fs::remove_file(&staging).await {
                warn!(
                    "Failed to remove staging file {}: {}",
                    staging.display(),
                    e
                );
            }
        }

        let (destination, outcome) = published?;

        // The source may already be the destination itself.
        let is_self = outcome == PlacementOutcome::AlreadyPresent
            && same_path(source, &destination).await;

        // The destination is published at this point: a source that cannot be
        // removed is reported, not turned into a failed placement.
        let source_removed = if mode == PlaceMode::Move && !is_self {
            match fs::remove_file(source).await {
                Ok(()) => true,
                Err(e) => {
                    warn!(
                        "{} placed as {} but the source could not be removed: {}",
                        source.display(),
                        destination.display(),
                        e
                    );
                    false
                }
            }
        } else {
            false
        };

        Ok(PlacedFile {
            source: source.to_path_buf(),
            destination,
            outcome,
            size_bytes: meta.len(),
            source_removed,
        })
    }
}

/// Reads until `buf` is full or EOF.
async fn read_full<R: AsyncRead + Unpin>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader.read(&mut buf[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}

async fn same_path(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a).await, fs::canonicalize(b).await) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
