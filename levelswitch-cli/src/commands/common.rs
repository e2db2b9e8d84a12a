//! Common types and utilities shared across CLI commands.

use std::path::{Path, PathBuf};

use clap::Args;
use levelswitch::config::ConfigFile;

use crate::error::CliError;

/// Command-line values that take precedence over the configuration file.
#[derive(Debug, Clone, Default, Args)]
pub struct ConfigOverrides {
    /// Map asset for a level, e.g. `--map L1=L1/map.yaml` (repeatable;
    /// replaces the file's [levels] table)
    #[arg(long = "map", value_name = "LEVEL=PATH", value_parser = parse_level_mapping)]
    pub maps: Vec<(String, String)>,

    /// Level believed loaded at startup
    #[arg(long, value_name = "LEVEL")]
    pub default_level: Option<String>,

    /// Map server base URL
    #[arg(long, value_name = "URL")]
    pub server_url: Option<String>,

    /// Directory relative map paths are resolved against
    #[arg(long, value_name = "DIR")]
    pub share_dir: Option<PathBuf>,

    /// Map set subdirectory under the share directory
    #[arg(long, value_name = "NAME")]
    pub map_name: Option<String>,
}

impl ConfigOverrides {
    /// Apply the overrides to a loaded configuration file. CLI wins.
    pub fn apply(&self, config: &mut ConfigFile) {
        if !self.maps.is_empty() {
            config.levels = self.maps.clone();
        }
        if let Some(level) = &self.default_level {
            config.controller.default_level = level.clone();
        }
        if let Some(url) = &self.server_url {
            config.map_server.url = url.clone();
        }
        if let Some(dir) = &self.share_dir {
            config.assets.share_dir = Some(dir.clone());
        }
        if let Some(name) = &self.map_name {
            config.assets.map_name = Some(name.clone());
        }
    }
}

/// Parse a `LEVEL=PATH` argument.
pub fn parse_level_mapping(raw: &str) -> Result<(String, String), String> {
    let (level, path) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected LEVEL=PATH, got '{}'", raw))?;

    let level = level.trim();
    let path = path.trim();
    if level.is_empty() {
        return Err(format!("missing level name in '{}'", raw));
    }
    if path.is_empty() {
        return Err(format!("missing map path for level '{}'", level));
    }

    Ok((level.to_string(), path.to_string()))
}

/// Load the configuration file (explicit path or default location) and
/// apply command-line overrides.
pub fn load_config(path: Option<&Path>, overrides: &ConfigOverrides) -> Result<ConfigFile, CliError> {
    let mut config = match path {
        Some(path) => ConfigFile::load_from(path)?,
        None => ConfigFile::load()?,
    };
    overrides.apply(&mut config);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_level_mapping() {
        assert_eq!(
            parse_level_mapping("L1=/maps/L1.yaml").unwrap(),
            ("L1".to_string(), "/maps/L1.yaml".to_string())
        );
        assert_eq!(
            parse_level_mapping(" L2 = L2/map.yaml ").unwrap(),
            ("L2".to_string(), "L2/map.yaml".to_string())
        );
    }

    #[test]
    fn test_parse_level_mapping_keeps_later_equals_in_path() {
        let (level, path) = parse_level_mapping("L1=http://maps/get?level=1").unwrap();
        assert_eq!(level, "L1");
        assert_eq!(path, "http://maps/get?level=1");
    }

    #[test]
    fn test_parse_level_mapping_rejects_bad_input() {
        assert!(parse_level_mapping("L1").is_err());
        assert!(parse_level_mapping("=/maps/L1.yaml").is_err());
        assert!(parse_level_mapping("L1=").is_err());
    }

    #[test]
    fn test_overrides_replace_level_table() {
        let mut config = ConfigFile {
            levels: vec![
                ("L1".to_string(), "a.yaml".to_string()),
                ("L2".to_string(), "b.yaml".to_string()),
            ],
            ..Default::default()
        };
        let overrides = ConfigOverrides {
            maps: vec![("L3".to_string(), "c.yaml".to_string())],
            default_level: Some("L3".to_string()),
            server_url: Some("http://robot:9000".to_string()),
            ..Default::default()
        };

        overrides.apply(&mut config);

        assert_eq!(config.levels, vec![("L3".to_string(), "c.yaml".to_string())]);
        assert_eq!(config.controller.default_level, "L3");
        assert_eq!(config.map_server.url, "http://robot:9000");
        assert_eq!(config.assets.share_dir, None);
    }

    #[test]
    fn test_empty_overrides_keep_file_values() {
        let mut config = ConfigFile {
            levels: vec![("L1".to_string(), "a.yaml".to_string())],
            ..Default::default()
        };
        let before = config.clone();

        ConfigOverrides::default().apply(&mut config);
        assert_eq!(config, before);
    }

    #[test]
    fn test_load_config_from_explicit_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[levels]\nL1 = L1/map.yaml\n\n[controller]\ndefault_level = L1").unwrap();

        let overrides = ConfigOverrides {
            share_dir: Some(PathBuf::from("/opt/maps")),
            ..Default::default()
        };
        let config = load_config(Some(file.path()), &overrides).unwrap();

        assert_eq!(config.levels, vec![("L1".to_string(), "L1/map.yaml".to_string())]);
        assert_eq!(config.assets.share_dir, Some(PathBuf::from("/opt/maps")));
    }

    #[test]
    fn test_load_config_missing_explicit_path() {
        let result = load_config(
            Some(Path::new("/nonexistent/levelswitch.ini")),
            &ConfigOverrides::default(),
        );
        assert!(matches!(result, Err(CliError::ConfigFile(_))));
    }
}
