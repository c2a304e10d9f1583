mod cli;
mod commands;
mod config;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use crate::cli::CliArgs;
use crate::commands::Settings;
use crate::config::CliConfig;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let args = CliArgs::parse();

    let config =
        CliConfig::load(args.config.as_deref()).context("failed to load configuration")?;
    let timezone = config.resolve_timezone(args.timezone.as_deref());
    info!(%timezone, command = ?args.command, "Running command");

    let settings = Settings { timezone, config };
    let output = commands::run(args.command, &settings)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
