//! Tracker filters applied to metainfo files found in blackholes.

use regex_lite::Regex;
use std::path::Path;
use tracing::{debug, info};

use crate::metainfo::{decode_file, DecodeError};

/// Result of evaluating a candidate against a tracker filter.
#[derive(Debug)]
pub enum FilterVerdict {
    /// No tracker pattern configured: everything passes.
    Unfiltered,
    /// The announce URL matched one of the patterns.
    Matched(String),
    /// The announce URL matched none of the patterns.
    Rejected(String),
    /// The file has no announce URL.
    NoAnnounce,
    /// The file could not be decoded.
    Undecodable(DecodeError),
}

impl FilterVerdict {
    pub fn is_match(&self) -> bool {
        matches!(self, Self::Unfiltered | Self::Matched(_))
    }
}

/// Matches announce URLs whose host is one of a set of tracker hosts.
///
/// `tracker.example.com` matches `udp://tracker.example.com:80/announce` and
/// `https://tracker.example.com/announce`, not `http://other.example.com/`.
#[derive(Debug, Clone)]
pub struct TrackerFilter {
    patterns: Vec<(String, Regex)>,
}

impl TrackerFilter {
    pub fn new<S: AsRef<str>>(hosts: &[S]) -> Result<Self, regex_lite::Error> {
        let patterns = hosts
            .iter()
            .map(|host| {
                let host = host.as_ref().trim();
                let regex = Regex::new(&format!(
                    r"(?i)^[a-z][a-z0-9+.\-]*://{}(:\d*)?(/.*)?$",
                    regex_lite::escape(host)
                ))?;
                Ok((host.to_string(), regex))
            })
            .collect::<Result<Vec<_>, regex_lite::Error>>()?;
        Ok(Self { patterns })
    }

    /// A filter that lets everything through.
    pub fn unfiltered() -> Self {
        Self {
            patterns: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Whether `announce` matches any configured host.
    pub fn matches_announce(&self, announce: &str) -> bool {
        self.patterns
            .iter()
            .any(|(_, regex)| regex.is_match(announce))
    }

    /// Decodes `path` if needed and evaluates it.
    pub async fn evaluate(&self, path: &Path) -> FilterVerdict {
        if self.is_empty() {
            return FilterVerdict::Unfiltered;
        }
        match decode_file(path).await {
            Ok(meta) => match meta.announce {
                Some(announce) => {
                    debug!("Tracker of {}: {}", path.display(), announce);
                    if self.matches_announce(&announce) {
                        FilterVerdict::Matched(announce)
                    } else {
                        FilterVerdict::Rejected(announce)
                    }
                }
                None => FilterVerdict::NoAnnounce,
            },
            Err(e) => FilterVerdict::Undecodable(e),
        }
    }

    /// Evaluates `path` and logs why it was skipped, if it was.
    ///
    /// Files without a usable announce URL never match a tracker filter.
    pub async fn matches(&self, path: &Path) -> bool {
        let verdict = self.evaluate(path).await;
        match &verdict {
            FilterVerdict::Unfiltered => debug!("{} matches (no filter)", path.display()),
            FilterVerdict::Matched(announce) => {
                debug!("{} matches tracker {}", path.display(), announce)
            }
            FilterVerdict::Rejected(announce) => {
                debug!("{} does not match ({})", path.display(), announce)
            }
            FilterVerdict::NoAnnounce => {
                info!("{} doesn't contain an announce field, pass", path.display())
            }
            FilterVerdict::Undecodable(e) => {
                info!("{} cannot be decoded, pass", path.display());
                debug!("{}", e);
            }
        }
        verdict.is_match()
    }
}
