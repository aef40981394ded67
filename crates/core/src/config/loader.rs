use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::{Path, PathBuf};

use super::{types::Config, ConfigError};

/// Directory name under the user configuration directory
pub const APP_NAME: &str = "torrents_dispatcher";

/// `<user config dir>/torrents_dispatcher/config.toml`, if the platform has one
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_NAME).join("config.toml"))
}

/// Load configuration from file with environment variable overrides
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    let config: Config = Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed("TORRDISPATCH_").ignore(&["config"]))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    Ok(expand_paths(config))
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    let config: Config =
        toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    Ok(expand_paths(config))
}

/// Replace a leading `~` with the home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    }
}

fn expand_paths(mut config: Config) -> Config {
    for group in &mut config.groups {
        for path in group
            .sources
            .iter_mut()
            .chain(group.targets.iter_mut())
            .chain(group.download_dirs.iter_mut())
        {
            *path = expand_home(path);
        }
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_from_str_valid() {
        let toml = r#"
[[groups]]
name = "providers"
sources = ["/srv/blackhole"]
targets = ["/srv/watch"]
limit = 10
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.groups.len(), 1);
        assert_eq!(config.groups[0].limit, 10);
    }

    #[test]
    fn test_load_config_from_str_bad_limit() {
        let toml = r#"
[[groups]]
targets = ["/srv/watch"]
limit = -1
"#;
        let result = load_config_from_str(toml);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/config.toml"));
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[[groups]]
name = "music"
sources = ["/srv/blackhole/music"]
targets = ["/srv/watch/rt1"]
filters = {{ trackers = ["tracker.example.com"] }}
"#
        )
        .unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.groups[0].label(), "music");
        assert_eq!(config.groups[0].targets, vec![PathBuf::from("/srv/watch/rt1")]);
    }

    #[test]
    fn test_example_config_is_valid() {
        let config = load_config_from_str(include_str!("../../../../config.example.toml")).unwrap();
        crate::config::validate_config(&config).unwrap();
        assert_eq!(config.groups.len(), 2);
        assert_eq!(config.groups[0].limit, 1000);
        assert_eq!(
            config.groups[0].filters.trackers,
            vec!["tracker.example.com".to_string()]
        );
        assert!(config.groups[1].filters.trackers.is_empty());
    }

    #[test]
    fn test_expand_home() {
        assert_eq!(
            expand_home(Path::new("/srv/watch")),
            PathBuf::from("/srv/watch")
        );
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home(Path::new("~/watch")), home.join("watch"));
        }
    }

    #[test]
    fn test_default_config_path_ends_with_app_dir() {
        if let Some(path) = default_config_path() {
            assert!(path.ends_with("torrents_dispatcher/config.toml"));
        }
    }
}
