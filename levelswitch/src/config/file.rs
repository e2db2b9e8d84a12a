//! INI configuration file parsing.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use ini::{Ini, Properties};
use thiserror::Error;

use crate::loader::DEFAULT_LOAD_TIMEOUT_SECS;
use crate::switch::DEFAULT_QUEUE_CAPACITY;

/// Default map server base URL.
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8080";

/// Default level believed current at startup.
pub const DEFAULT_LEVEL: &str = "L1";

/// Default log filter.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Errors from loading the configuration file.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// The file exists but could not be read.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid INI.
    #[error("Failed to parse config file: {0}")]
    Parse(String),

    /// A key has a value of the wrong type.
    #[error("Invalid value '{value}' for {section}.{key}")]
    InvalidValue {
        section: &'static str,
        key: &'static str,
        value: String,
    },
}

/// `[controller]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerSettings {
    pub default_level: String,
    pub queue_capacity: usize,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            default_level: DEFAULT_LEVEL.to_string(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

/// `[map_server]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapServerSettings {
    pub url: String,
    /// Per-request timeout in seconds.
    pub timeout: u64,
    /// Block startup until the map server answers.
    pub wait_for_service: bool,
}

impl Default for MapServerSettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_SERVER_URL.to_string(),
            timeout: DEFAULT_LOAD_TIMEOUT_SECS,
            wait_for_service: true,
        }
    }
}

/// `[assets]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetSettings {
    pub share_dir: Option<PathBuf>,
    pub map_name: Option<String>,
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    pub level: String,
    pub directory: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            directory: None,
        }
    }
}

/// Parsed configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    pub controller: ControllerSettings,
    pub map_server: MapServerSettings,
    pub assets: AssetSettings,
    /// `[levels]` entries in file order.
    pub levels: Vec<(String, String)>,
    pub logging: LoggingSettings,
}

/// Default configuration file location.
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("levelswitch")
        .join("config.ini")
}

impl ConfigFile {
    /// Load from the default location, falling back to defaults if the
    /// file does not exist.
    pub fn load() -> Result<Self, ConfigFileError> {
        let path = config_file_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load from an explicit path. The file must exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigFileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Parse INI text.
    pub fn parse(content: &str) -> Result<Self, ConfigFileError> {
        let ini = Ini::load_from_str(content).map_err(|e| ConfigFileError::Parse(e.to_string()))?;
        let mut config = Self::default();

        if let Some(section) = ini.section(Some("controller")) {
            if let Some(level) = non_empty(section, "default_level") {
                config.controller.default_level = level.to_string();
            }
            if let Some(capacity) = parse_value(section, "controller", "queue_capacity")? {
                config.controller.queue_capacity = capacity;
            }
        }

        if let Some(section) = ini.section(Some("map_server")) {
            if let Some(url) = non_empty(section, "url") {
                config.map_server.url = url.to_string();
            }
            if let Some(timeout) = parse_value(section, "map_server", "timeout")? {
                config.map_server.timeout = timeout;
            }
            if let Some(wait) = parse_bool(section, "map_server", "wait_for_service")? {
                config.map_server.wait_for_service = wait;
            }
        }

        if let Some(section) = ini.section(Some("assets")) {
            config.assets.share_dir = non_empty(section, "share_dir").map(expand_tilde);
            config.assets.map_name = non_empty(section, "map_name").map(str::to_string);
        }

        if let Some(section) = ini.section(Some("levels")) {
            config.levels = section
                .iter()
                .map(|(level, path)| (level.trim().to_string(), path.trim().to_string()))
                .collect();
        }

        if let Some(section) = ini.section(Some("logging")) {
            if let Some(level) = non_empty(section, "level") {
                config.logging.level = level.to_string();
            }
            config.logging.directory = non_empty(section, "directory").map(expand_tilde);
        }

        Ok(config)
    }
}

fn non_empty<'a>(section: &'a Properties, key: &str) -> Option<&'a str> {
    section.get(key).map(str::trim).filter(|v| !v.is_empty())
}

fn parse_value<T: FromStr>(
    section: &Properties,
    section_name: &'static str,
    key: &'static str,
) -> Result<Option<T>, ConfigFileError> {
    match non_empty(section, key) {
        None => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| ConfigFileError::InvalidValue {
                section: section_name,
                key,
                value: raw.to_string(),
            }),
    }
}

fn parse_bool(
    section: &Properties,
    section_name: &'static str,
    key: &'static str,
) -> Result<Option<bool>, ConfigFileError> {
    match non_empty(section, key).map(str::to_lowercase).as_deref() {
        None => Ok(None),
        Some("true" | "yes" | "on" | "1") => Ok(Some(true)),
        Some("false" | "no" | "off" | "0") => Ok(Some(false)),
        Some(other) => Err(ConfigFileError::InvalidValue {
            section: section_name,
            key,
            value: other.to_string(),
        }),
    }
}

fn expand_tilde(raw: &str) -> PathBuf {
    match raw.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(raw)),
        None => PathBuf::from(raw),
    }
}
