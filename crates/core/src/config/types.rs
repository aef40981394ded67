use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Extension of the managed metainfo files (without the dot)
    #[serde(default = "default_extension")]
    pub extension: String,
    #[serde(default)]
    pub groups: Vec<GroupConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            extension: default_extension(),
            groups: Vec::new(),
        }
    }
}

fn default_extension() -> String {
    "torrent".to_string()
}

/// One dispatch group: blackholes feeding a set of capacity-limited watchdirs.
///
/// Every group owns its own lists; nothing is shared between groups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct GroupConfig {
    #[serde(default)]
    pub name: Option<String>,
    /// Blackholes to scan, directories or single files
    #[serde(default)]
    pub sources: Vec<PathBuf>,
    #[serde(default)]
    pub filters: FilterConfig,
    /// Watchdirs to dispatch into
    #[serde(default)]
    pub targets: Vec<PathBuf>,
    /// Where the torrent client downloads data, only used by search
    #[serde(default)]
    pub download_dirs: Vec<PathBuf>,
    /// Maximum number of torrents per target, 0 for unlimited
    #[serde(default)]
    pub limit: usize,
}

impl GroupConfig {
    /// Name used in logs and reports.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or("unnamed")
    }
}

/// Filters applied to every candidate found in the sources
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct FilterConfig {
    /// Tracker hosts, a single string or a list
    #[serde(default, deserialize_with = "one_or_many")]
    pub trackers: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(value) => vec![value],
        OneOrMany::Many(values) => values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_groups() {
        let toml = r#"
[[groups]]
name = "music"
sources = ["/srv/blackhole/music"]
targets = ["/srv/watch/rt1", "/srv/watch/rt2"]
download_dirs = ["/srv/downloads/rt1"]
limit = 1000

[groups.filters]
trackers = ["tracker.example.com", "other.example.org"]

[[groups]]
sources = ["/srv/blackhole/providers"]
targets = ["/srv/watch/providers"]
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.extension, "torrent");
        assert_eq!(config.groups.len(), 2);

        let music = &config.groups[0];
        assert_eq!(music.label(), "music");
        assert_eq!(music.limit, 1000);
        assert_eq!(music.targets.len(), 2);
        assert_eq!(music.filters.trackers.len(), 2);

        let providers = &config.groups[1];
        assert_eq!(providers.label(), "unnamed");
        assert_eq!(providers.limit, 0);
        assert!(providers.filters.trackers.is_empty());
        assert!(providers.download_dirs.is_empty());
    }

    #[test]
    fn test_single_tracker_string() {
        let toml = r#"
[[groups]]
targets = ["/srv/watch"]
filters = { trackers = "tracker.example.com" }
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(
            config.groups[0].filters.trackers,
            vec!["tracker.example.com".to_string()]
        );
    }

    #[test]
    fn test_groups_do_not_share_lists() {
        let mut first = GroupConfig::default();
        let second = GroupConfig::default();
        first.sources.push(PathBuf::from("/srv/blackhole"));
        first.filters.trackers.push("tracker.example.com".to_string());

        assert!(second.sources.is_empty());
        assert!(second.filters.trackers.is_empty());
    }

    #[test]
    fn test_custom_extension() {
        let toml = r#"
extension = "meta"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.extension, "meta");
        assert!(config.groups.is_empty());
    }
}
