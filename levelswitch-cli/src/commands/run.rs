//! Run command - watch fleet states and switch maps.

use std::path::{Path, PathBuf};

use clap::Args;
use tokio::io::BufReader;
use tokio_util::sync::CancellationToken;
use tracing::info;

use levelswitch::app::{AppConfig, AppError, LevelSwitchApp};
use levelswitch::fleet::SnapshotReader;

use super::common::ConfigOverrides;
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the run command.
#[derive(Debug, Args)]
pub struct RunArgs {
    /// Newline-delimited JSON fleet states (default: stdin)
    #[arg(long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Start without waiting for the map server to answer
    #[arg(long)]
    pub no_wait: bool,

    #[command(flatten)]
    pub overrides: ConfigOverrides,
}

/// Run the switcher until Ctrl+C or end of input.
pub fn run(config_path: Option<PathBuf>, args: RunArgs) -> Result<(), CliError> {
    let runner = CliRunner::new(config_path.as_deref(), &args.overrides)?;
    runner.log_startup("run");

    let mut app_config = runner.app_config()?;
    if args.no_wait {
        app_config = app_config.with_wait_for_service(false);
    }

    println!("levelswitch v{}", levelswitch::VERSION);
    println!("=================");
    println!();
    println!("Map server:    {}", app_config.map_server.url);
    println!("Default level: {}", app_config.default_level);
    println!("Levels:        {}", app_config.levels.len());
    match &args.input {
        Some(path) => println!("Input:         {}", path.display()),
        None => println!("Input:         stdin"),
    }
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();
    ctrlc::set_handler(move || {
        eprintln!();
        eprintln!("Received shutdown signal, stopping...");
        signal.cancel();
    })
    .map_err(|e| CliError::Config(format!("Failed to set signal handler: {}", e)))?;

    let outcome = runner.block_on(async {
        let Some(app) = start_app(app_config, shutdown.clone()).await? else {
            return Ok(None);
        };

        let forwarded = forward_input(args.input.as_deref(), &app, shutdown.clone()).await;

        let metrics = app.metrics();
        let controller = if shutdown.is_cancelled() || forwarded.is_err() {
            app.shutdown().await?
        } else {
            info!("Input finished, waiting for outstanding map load");
            app.wait().await?
        };

        let count = forwarded?;
        let believed_level = controller.believed_level().to_string();
        Ok::<_, CliError>(Some((count, believed_level, metrics.snapshot())))
    });

    runner.finish();

    let Some((forwarded, believed_level, snapshot)) = outcome? else {
        println!("Stopped before the map server became available.");
        return Ok(());
    };

    println!();
    println!("Session Summary");
    println!("───────────────");
    println!("Fleet states read:    {}", forwarded);
    println!("Believed level:       {}", believed_level);
    println!("{}", snapshot);
    Ok(())
}

/// Start the switcher. `None` means shutdown was requested while waiting
/// for the map server, which is a normal way to stop.
async fn start_app(
    config: AppConfig,
    shutdown: CancellationToken,
) -> Result<Option<LevelSwitchApp>, CliError> {
    match LevelSwitchApp::start(config, shutdown).await {
        Ok(app) => Ok(Some(app)),
        Err(AppError::Cancelled) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Stream fleet states from a file or stdin into the running switcher.
async fn forward_input(
    input: Option<&Path>,
    app: &LevelSwitchApp,
    shutdown: CancellationToken,
) -> Result<u64, CliError> {
    let forwarded = match input {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .map_err(|source| CliError::Input {
                    path: path.to_path_buf(),
                    source,
                })?;
            SnapshotReader::new(BufReader::new(file))
                .forward(app.handle(), shutdown)
                .await?
        }
        None => {
            SnapshotReader::new(BufReader::new(tokio::io::stdin()))
                .forward(app.handle(), shutdown)
                .await?
        }
    };
    Ok(forwarded)
}
