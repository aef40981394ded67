use std::collections::HashSet;
use tracing::warn;

use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - The managed extension is not empty
/// - Every group has at least one target
/// - Tracker patterns are not blank
///
/// A group name used twice is only reported: `--limit-to` then selects both.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.extension.trim_start_matches('.').is_empty() {
        return Err(ConfigError::ValidationError(
            "extension cannot be empty".to_string(),
        ));
    }

    let mut names = HashSet::new();
    for (idx, group) in config.groups.iter().enumerate() {
        if let Some(name) = &group.name {
            if !names.insert(name.as_str()) {
                warn!("Group name '{}' is used more than once", name);
            }
        }

        if group.targets.is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "group #{} ({}) has no targets",
                idx,
                group.label()
            )));
        }

        if group.filters.trackers.iter().any(|t| t.trim().is_empty()) {
            return Err(ConfigError::ValidationError(format!(
                "group #{} ({}) has an empty tracker pattern",
                idx,
                group.label()
            )));
        }
    }

    Ok(())
}
