//! Levels command - print the resolved level table.

use std::path::PathBuf;

use levelswitch::app::AppConfig;

use super::common::{load_config, ConfigOverrides};
use crate::error::CliError;

/// Print each level and the map asset it resolves to.
pub fn run(config_path: Option<PathBuf>, overrides: ConfigOverrides) -> Result<(), CliError> {
    let config = load_config(config_path.as_deref(), &overrides)?;
    let app_config = AppConfig::from_config_file(&config)?;

    println!("Map server:    {}", app_config.map_server.url);
    println!("Default level: {}", app_config.default_level);
    println!();

    for (level, path) in app_config.levels.levels() {
        let marker = if level == app_config.default_level {
            "*"
        } else {
            " "
        };
        println!("{} {:<12} {}", marker, level, path);
    }

    if !app_config.levels.contains(&app_config.default_level) {
        println!();
        println!(
            "Warning: default level '{}' has no map configured",
            app_config.default_level
        );
    }

    Ok(())
}
