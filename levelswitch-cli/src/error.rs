//! CLI error type.

use std::path::PathBuf;

use thiserror::Error;

use levelswitch::app::AppError;
use levelswitch::config::ConfigFileError;
use levelswitch::fleet::SourceError;
use levelswitch::loader::LoadResult;
use levelswitch::logging::LoggingError;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    ConfigFile(#[from] ConfigFileError),

    #[error(transparent)]
    App(#[from] AppError),

    #[error("Failed to initialise logging: {0}")]
    Logging(#[from] LoggingError),

    #[error("Failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),

    #[error("Failed to open input {path}: {source}")]
    Input {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("Map load for level '{level}' failed: {result}")]
    LoadFailed { level: String, result: LoadResult },
}
