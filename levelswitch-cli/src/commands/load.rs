//! Load command - request one map load by hand.

use std::path::PathBuf;

use levelswitch::app::{load_once, AppError};
use levelswitch::loader::HttpMapLoadClient;

use super::common::ConfigOverrides;
use crate::error::CliError;
use crate::runner::CliRunner;

/// Ask the map server to load `level`'s map and report the result.
pub fn run(
    config_path: Option<PathBuf>,
    overrides: ConfigOverrides,
    level: &str,
) -> Result<(), CliError> {
    let runner = CliRunner::new(config_path.as_deref(), &overrides)?;
    runner.log_startup("load");
    let app_config = runner.app_config()?;

    let client =
        HttpMapLoadClient::with_timeout(app_config.map_server.url.clone(), app_config.map_server.timeout)
            .map_err(AppError::from)?;

    println!(
        "Loading {} from {} ...",
        app_config.levels.resolve(level).map_err(AppError::from)?,
        client.base_url()
    );

    let result = runner.block_on(load_once(&app_config, &client, level));
    runner.finish();
    let result = result?;

    if !result.is_success() {
        return Err(CliError::LoadFailed {
            level: level.to_string(),
            result,
        });
    }

    println!("Map for level '{}' loaded.", level);
    Ok(())
}
