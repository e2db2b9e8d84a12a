//! Shared setup for commands that talk to the map server.

use std::path::Path;
use std::time::Duration;

use tokio::runtime::Runtime;
use tracing::info;

use levelswitch::app::AppConfig;
use levelswitch::config::ConfigFile;
use levelswitch::logging::{init_logging, LoggingConfig, LoggingGuard};

use crate::commands::common::{load_config, ConfigOverrides};
use crate::error::CliError;

/// Grace period for blocking reads (stdin) when the runtime shuts down.
const RUNTIME_SHUTDOWN_TIMEOUT: Duration = Duration::from_millis(250);

/// Loaded configuration, installed logging, and an async runtime.
pub struct CliRunner {
    config: ConfigFile,
    runtime: Runtime,
    _logging: LoggingGuard,
}

impl CliRunner {
    pub fn new(config_path: Option<&Path>, overrides: &ConfigOverrides) -> Result<Self, CliError> {
        let config = load_config(config_path, overrides)?;
        let logging = init_logging(&LoggingConfig::from(&config.logging))?;

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(CliError::Runtime)?;

        Ok(Self {
            config,
            runtime,
            _logging: logging,
        })
    }

    pub fn log_startup(&self, command: &str) {
        info!(
            version = levelswitch::VERSION,
            command,
            levels = self.config.levels.len(),
            server = %self.config.map_server.url,
            "levelswitch starting"
        );
    }

    pub fn app_config(&self) -> Result<AppConfig, CliError> {
        Ok(AppConfig::from_config_file(&self.config)?)
    }

    pub fn block_on<F: std::future::Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    /// Stop the runtime without waiting on a blocked stdin reader.
    pub fn finish(self) {
        self.runtime.shutdown_timeout(RUNTIME_SHUTDOWN_TIMEOUT);
    }
}
