//! Configuration for the placer module.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the file system placer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacerConfig {
    /// Buffer size for file copies and comparisons in bytes.
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,

    /// Whether to try a hard link before copying when moving.
    #[serde(default = "default_true")]
    pub prefer_links: bool,

    /// Separator placed before the counter of renamed files.
    #[serde(default = "default_separator")]
    pub counter_separator: String,

    /// Whether to create a missing destination directory.
    #[serde(default = "default_true")]
    pub create_parents: bool,

    /// Age in seconds after which a leftover staging file is removed.
    #[serde(default = "default_staging_max_age_secs")]
    pub staging_max_age_secs: u64,
}

fn default_buffer_size() -> usize {
    64 * 1024
}

fn default_true() -> bool {
    true
}

fn default_separator() -> String {
    "-".to_string()
}

fn default_staging_max_age_secs() -> u64 {
    3600
}

impl Default for PlacerConfig {
    fn default() -> Self {
        Self {
            buffer_size: default_buffer_size(),
            prefer_links: true,
            counter_separator: default_separator(),
            create_parents: true,
            staging_max_age_secs: default_staging_max_age_secs(),
        }
    }
}

impl PlacerConfig {
    /// Enables or disables hard-link publication.
    pub fn with_links(mut self, enabled: bool) -> Self {
        self.prefer_links = enabled;
        self
    }

    /// Sets the buffer size for copies.
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size.max(1);
        self
    }

    /// Sets the counter separator.
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.counter_separator = separator.into();
        self
    }

    /// Sets the age after which a leftover staging file is removed.
    pub fn with_staging_max_age(mut self, age: Duration) -> Self {
        self.staging_max_age_secs = age.as_secs();
        self
    }

    pub fn staging_max_age(&self) -> Duration {
        Duration::from_secs(self.staging_max_age_secs)
    }

    /// Enables or disables destination directory creation.
    pub fn with_create_parents(mut self, enabled: bool) -> Self {
        self.create_parents = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PlacerConfig::default();
        assert_eq!(config.buffer_size, 64 * 1024);
        assert!(config.prefer_links);
        assert_eq!(config.counter_separator, "-");
        assert!(config.create_parents);
        assert_eq!(config.staging_max_age(), Duration::from_secs(3600));
    }

    #[test]
    fn test_config_builder() {
        let config = PlacerConfig::default()
            .with_links(false)
            .with_separator("_")
            .with_create_parents(false)
            .with_staging_max_age(Duration::from_secs(60))
            .with_buffer_size(0);

        assert!(!config.prefer_links);
        assert_eq!(config.counter_separator, "_");
        assert!(!config.create_parents);
        assert_eq!(config.buffer_size, 1);
        assert_eq!(config.staging_max_age_secs, 60);
    }
}
