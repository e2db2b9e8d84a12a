//! levelswitch CLI - Command-line interface
//!
//! Runs the level switcher against a map server, or inspects and exercises
//! its configuration by hand.

mod commands;
mod error;
mod runner;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::common::ConfigOverrides;
use commands::config::ConfigCommands;
use commands::run::RunArgs;
use error::CliError;

#[derive(Debug, Parser)]
#[command(name = "levelswitch")]
#[command(version, about = "Reload the shared map server when the fleet changes level")]
struct Cli {
    /// Configuration file (default: <config_dir>/levelswitch/config.ini)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Watch fleet states and switch maps as the fleet changes level
    Run(RunArgs),

    /// Show the resolved level table
    Levels {
        #[command(flatten)]
        overrides: ConfigOverrides,
    },

    /// Ask the map server to load one level's map now
    Load {
        /// Level to load
        level: String,

        #[command(flatten)]
        overrides: ConfigOverrides,
    },

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = dispatch(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn dispatch(cli: Cli) -> Result<(), CliError> {
    let config_path = cli.config;

    match cli.command {
        Commands::Run(args) => commands::run::run(config_path, args),
        Commands::Levels { overrides } => commands::levels::run(config_path, overrides),
        Commands::Load { level, overrides } => {
            commands::load::run(config_path, overrides, &level)
        }
        Commands::Config { command } => commands::config::run(config_path, command),
    }
}
