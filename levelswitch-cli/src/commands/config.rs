//! Configuration CLI commands.

use std::path::PathBuf;

use clap::Subcommand;
use levelswitch::config::config_file_path;

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Show the configuration file path
    Path,
}

/// Run a config subcommand.
pub fn run(config_path: Option<PathBuf>, command: ConfigCommands) -> Result<(), CliError> {
    match command {
        ConfigCommands::Path => run_path(config_path),
    }
}

/// Show the configuration file path and whether it exists.
fn run_path(config_path: Option<PathBuf>) -> Result<(), CliError> {
    let path = config_path.unwrap_or_else(config_file_path);
    println!("{}", path.display());

    if !path.exists() {
        println!("(file does not exist, defaults apply)");
    }

    Ok(())
}
