//! Configuration file support.
//!
//! The switcher reads an INI file, by default from
//! `<config_dir>/levelswitch/config.ini`:
//!
//! ```ini
//! [controller]
//! default_level = L1
//! queue_capacity = 64
//!
//! [map_server]
//! url = http://127.0.0.1:8080
//! timeout = 30
//! wait_for_service = true
//!
//! [assets]
//! share_dir = /opt/maps
//! map_name = pinklab
//!
//! [levels]
//! L1 = L1/map.yaml
//! L2 = L2/map.yaml
//!
//! [logging]
//! level = info
//! directory = /var/log/levelswitch
//! ```
//!
//! A missing file is not an error; defaults apply. Every key is optional,
//! but a usable configuration needs at least one `[levels]` entry (from the
//! file or from the command line).

mod file;

pub use file::{
    config_file_path, AssetSettings, ConfigFile, ConfigFileError, ControllerSettings,
    LoggingSettings, MapServerSettings, DEFAULT_LOG_LEVEL, DEFAULT_SERVER_URL,
};
