//! Types for the metainfo module.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Concatenated piece hashes of a torrent.
///
/// Two metainfo files describe the same content iff their content hashes are
/// byte-equal, whatever their file names or trackers.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ContentHash(Vec<u8>);

impl ContentHash {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({})", self)
    }
}

impl fmt::Display for ContentHash {
    /// Hex of the first piece hash, enough to tell torrents apart in logs.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0.iter().take(20) {
            write!(f, "{:02x}", byte)?;
        }
        if self.0.len() > 20 {
            write!(f, "…")?;
        }
        Ok(())
    }
}

/// The subset of a decoded metainfo file used for dispatching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metainfo {
    /// Primary tracker URL, absent for trackerless torrents.
    pub announce: Option<String>,
    /// Suggested file or directory name.
    pub name: Option<String>,
    pub content_hash: ContentHash,
}

/// Errors that can occur when decoding a metainfo file.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Failed to read metainfo file {path}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed metainfo file {path}: {reason}")]
    Malformed { path: PathBuf, reason: String },
}

impl DecodeError {
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Unreadable { path, .. } | Self::Malformed { path, .. } => path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_hash_equality_is_bytewise() {
        let a = ContentHash::new(vec![1u8; 20]);
        let b = ContentHash::new(vec![1u8; 20]);
        let c = ContentHash::new(vec![2u8; 20]);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_content_hash_display_truncates() {
        let hash = ContentHash::new(vec![0xabu8; 40]);
        let shown = hash.to_string();
        assert!(shown.starts_with("abab"));
        assert!(shown.ends_with('…'));
    }
}
