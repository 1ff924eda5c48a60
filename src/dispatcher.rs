//! Command dispatcher that routes parsed clap Commands to their handlers.
//!
//! Configuration is resolved once here (flag, then environment, then the
//! built-in table) and handed to the handlers that need it.

mod fetch;
mod platforms;

use anyhow::Result;
use colored::Colorize;
use portfolio_tracker::config::{TrackerConfig, CONFIG_ENV_VAR};
use portfolio_tracker::validation;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::cli::{Cli, Commands};

/// Environment variable forcing the offline sample provider
pub const OFFLINE_ENV_VAR: &str = "TRACKER_OFFLINE";

fn offline_from_env() -> bool {
    std::env::var(OFFLINE_ENV_VAR)
        .map(|v| matches!(v.trim(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

fn config_path(cli_path: Option<&Path>) -> Option<PathBuf> {
    cli_path
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from))
}

fn load_config(cli: &Cli) -> Result<TrackerConfig> {
    let path = config_path(cli.config.as_deref());
    TrackerConfig::load(path.as_deref())
}

/// Route a parsed command line to its handler
pub async fn dispatch_command(cli: Cli) -> Result<()> {
    match &cli.command {
        Commands::Fetch { offline, output } => {
            let config = load_config(&cli)?;
            let offline = *offline || offline_from_env();
            fetch::dispatch_fetch(&config, offline, output, cli.json).await
        }
        Commands::Validate { path } => dispatch_validate(path, cli.json),
        Commands::Platforms => {
            let config = load_config(&cli)?;
            platforms::dispatch_platforms(&config, cli.json)
        }
    }
}

fn dispatch_validate(path: &Path, json_output: bool) -> Result<()> {
    info!("Validating {}", path.display());
    validation::validate_file(path)?;

    if json_output {
        let payload = serde_json::json!({
            "path": path.display().to_string(),
            "valid": true,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        println!(
            "{} {} passes structure validation",
            "✓".green().bold(),
            path.display()
        );
    }
    Ok(())
}
