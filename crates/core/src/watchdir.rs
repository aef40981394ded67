//! Listing of managed metainfo files inside a directory.

use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Whether `name` is a visible file name ending in `.extension`.
///
/// Hidden files are skipped, which also hides in-flight staging copies.
pub fn is_managed_name(name: &OsStr, extension: &str) -> bool {
    let extension = extension.trim_start_matches('.');
    let path = Path::new(name);
    let visible = !name.to_string_lossy().starts_with('.');
    visible && path.extension() == Some(OsStr::new(extension))
}

/// Managed files directly inside `dir`, sorted by path. Non-recursive.
pub async fn list_managed(dir: &Path, extension: &str) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut entries = fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        if !is_managed_name(&entry.file_name(), extension) {
            continue;
        }
        let path = entry.path();
        // Follow symlinks, like a shell glob would.
        match fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => files.push(path),
            _ => {}
        }
    }
    files.sort();
    Ok(files)
}

/// Number of managed files directly inside `dir`.
pub async fn count_managed(dir: &Path, extension: &str) -> io::Result<usize> {
    Ok(list_managed(dir, extension).await?.len())
}

/// Every entry of `dir`, files and directories alike, sorted by path.
pub async fn list_entries(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    let mut entries = fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        paths.push(entry.path());
    }
    paths.sort();
    Ok(paths)
}
