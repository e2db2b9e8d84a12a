//! Application configuration for LevelSwitchApp.
//!
//! `AppConfig` is the validated, typed form of everything the switcher needs
//! at startup. `ConfigFile` (plus any command-line overrides applied to it)
//! is translated here, in one place.

use std::time::Duration;

use super::error::AppError;
use crate::config::ConfigFile;
use crate::level::{AssetRoot, LevelMap, MapAssetPath};
use crate::loader::DEFAULT_LOAD_TIMEOUT_SECS;
use crate::switch::SwitchDaemonConfig;

/// Map server connection settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MapServerConfig {
    pub url: String,
    pub timeout: Duration,
    pub wait_for_service: bool,
}

impl MapServerConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: Duration::from_secs(DEFAULT_LOAD_TIMEOUT_SECS),
            wait_for_service: true,
        }
    }
}

/// Top-level configuration passed to `LevelSwitchApp::start()`.
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Level → map asset table.
    pub levels: LevelMap,

    /// Level believed loaded at startup.
    pub default_level: String,

    /// Map server connection.
    pub map_server: MapServerConfig,

    /// Switch daemon settings.
    pub daemon: SwitchDaemonConfig,
}

impl AppConfig {
    /// Create a config with default server and daemon settings.
    pub fn new(levels: LevelMap, default_level: impl Into<String>, server_url: impl Into<String>) -> Self {
        Self {
            levels,
            default_level: default_level.into(),
            map_server: MapServerConfig::new(server_url),
            daemon: SwitchDaemonConfig::default(),
        }
    }

    /// Build the application config from a loaded configuration file.
    ///
    /// Relative `[levels]` paths are joined onto `[assets]` when a share
    /// directory is configured.
    pub fn from_config_file(config: &ConfigFile) -> Result<Self, AppError> {
        if config.levels.is_empty() {
            return Err(AppError::Config(
                "No levels configured. Add a [levels] section or pass --map LEVEL=PATH"
                    .to_string(),
            ));
        }

        let root = config.assets.share_dir.as_ref().map(|dir| {
            let root = AssetRoot::new(dir);
            match &config.assets.map_name {
                Some(name) => root.with_map_name(name),
                None => root,
            }
        });

        let entries = config.levels.iter().map(|(level, path)| {
            let located = match &root {
                Some(root) => root.locate(path),
                None => MapAssetPath::new(path.as_str()),
            };
            (level.clone(), located)
        });
        let levels = LevelMap::new(entries)?;

        let default_level = config.controller.default_level.trim();
        if default_level.is_empty() {
            return Err(AppError::Config("default_level must not be empty".to_string()));
        }

        Ok(Self {
            levels,
            default_level: default_level.to_string(),
            map_server: MapServerConfig {
                url: config.map_server.url.clone(),
                timeout: Duration::from_secs(config.map_server.timeout),
                wait_for_service: config.map_server.wait_for_service,
            },
            daemon: SwitchDaemonConfig {
                queue_capacity: config.controller.queue_capacity,
            },
        })
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.map_server.timeout = timeout;
        self
    }

    /// Enable or disable waiting for the map server at startup.
    pub fn with_wait_for_service(mut self, wait: bool) -> Self {
        self.map_server.wait_for_service = wait;
        self
    }
}
