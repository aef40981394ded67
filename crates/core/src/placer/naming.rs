//! Counter-suffixed file name generation.

use std::ffi::{OsStr, OsString};
use std::path::Path;

/// Yields a file name followed by counter-suffixed variants.
///
/// `a.torrent` gives `a.torrent`, `a-1.torrent`, `a-2.torrent`, … while a name
/// that already carries a counter keeps counting from it: `a-3.torrent` gives
/// `a-3.torrent`, `a-4.torrent`, …
#[derive(Debug, Clone)]
pub struct IncrementedNames {
    original: Option<OsString>,
    base: OsString,
    extension: Option<OsString>,
    separator: String,
    next_counter: u64,
}

impl IncrementedNames {
    pub fn new(file_name: &OsStr, separator: &str) -> Self {
        let path = Path::new(file_name);
        let stem = path.file_stem().unwrap_or(file_name);
        let extension = path.extension().map(OsStr::to_os_string);

        let (base, counter) = match stem.to_str().and_then(|s| split_counter(s, separator)) {
            Some((base, counter)) => (OsString::from(base), counter),
            None => (stem.to_os_string(), 0),
        };

        Self {
            original: Some(file_name.to_os_string()),
            base,
            extension,
            separator: separator.to_string(),
            next_counter: counter.saturating_add(1),
        }
    }
}

fn split_counter<'a>(stem: &'a str, separator: &str) -> Option<(&'a str, u64)> {
    if separator.is_empty() {
        return None;
    }
    let (base, counter) = stem.rsplit_once(separator)?;
    if counter.is_empty() || !counter.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    counter.parse().ok().map(|n| (base, n))
}

impl Iterator for IncrementedNames {
    type Item = OsString;

    fn next(&mut self) -> Option<OsString> {
        if let Some(original) = self.original.take() {
            return Some(original);
        }
        if self.next_counter == u64::MAX {
            return None;
        }
        let counter = self.next_counter;
        self.next_counter += 1;

        let mut name = self.base.clone();
        name.push(&self.separator);
        name.push(counter.to_string());
        if let Some(ext) = &self.extension {
            name.push(".");
            name.push(ext);
        }
        Some(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first(name: &str, separator: &str, n: usize) -> Vec<String> {
        IncrementedNames::new(OsStr::new(name), separator)
            .take(n)
            .map(|s| s.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_starts_with_original_then_counts_from_one() {
        assert_eq!(
            first("a.torrent", "-", 4),
            vec!["a.torrent", "a-1.torrent", "a-2.torrent", "a-3.torrent"]
        );
    }

    #[test]
    fn test_continues_existing_counter() {
        assert_eq!(
            first("myfile-3.doc", "-", 3),
            vec!["myfile-3.doc", "myfile-4.doc", "myfile-5.doc"]
        );
    }

    #[test]
    fn test_non_numeric_suffix_is_not_a_counter() {
        assert_eq!(
            first("some-album.torrent", "-", 2),
            vec!["some-album.torrent", "some-album-1.torrent"]
        );
    }

    #[test]
    fn test_without_extension() {
        assert_eq!(first("noext", "-", 2), vec!["noext", "noext-1"]);
    }

    #[test]
    fn test_only_last_extension_moves() {
        assert_eq!(
            first("a.tar.gz", "-", 2),
            vec!["a.tar.gz", "a.tar-1.gz"]
        );
    }

    #[test]
    fn test_custom_separator() {
        assert_eq!(
            first("mymovie_7.mp4", "_", 2),
            vec!["mymovie_7.mp4", "mymovie_8.mp4"]
        );
        assert_eq!(first("a-7.mp4", "_", 2), vec!["a-7.mp4", "a-7_1.mp4"]);
    }
}
