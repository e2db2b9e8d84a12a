//! Application error types.

use thiserror::Error;

use crate::config::ConfigFileError;
use crate::level::LevelMapError;

/// Errors that can occur during application lifecycle.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration file could not be loaded.
    #[error(transparent)]
    ConfigFile(#[from] ConfigFileError),

    /// The level table is invalid, or a level has no map.
    #[error("Level map error: {0}")]
    LevelMap(#[from] LevelMapError),

    /// Failed to create the map-load client.
    #[error("Failed to create map-load client: {0}")]
    ClientCreation(#[from] reqwest::Error),

    /// Shutdown was requested before the map server became available.
    #[error("Shutdown requested before the map server became available")]
    Cancelled,

    /// The switch daemon task panicked or was aborted.
    #[error("Switch daemon task failed: {0}")]
    DaemonTask(#[from] tokio::task::JoinError),
}
