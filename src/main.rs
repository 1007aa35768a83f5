#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc, clippy::module_name_repetitions)]

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

mod cli;

use cli::{Cli, Commands};
use shiftcheck::Config;
use shiftcheck::transport::channels::{check_channel, start_bot};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = match cli.log_level.as_deref() {
        Some(level) => EnvFilter::try_new(level).context("invalid --log-level filter")?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = Config::load(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(path) = &config.config_path {
        tracing::info!(path = %path.display(), "loaded config file");
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => start_bot(Arc::new(config)).await,
        Commands::Check => check_channel(&config).await,
    }
}
