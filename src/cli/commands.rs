use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// `shiftcheck` - Telegram checklist assistant for coffee-shop shift handovers.
#[derive(Parser, Debug)]
#[command(name = "shiftcheck")]
#[command(version = "0.1.0")]
#[command(about = "Walks baristas through opening and closing checklists.", long_about = None)]
pub struct Cli {
    /// Path to a TOML config file (default: ~/.shiftcheck/config.toml if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log filter, e.g. `info` or `shiftcheck=debug` (overrides RUST_LOG)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Start the bot and poll Telegram for updates (default)
    Run,

    /// Validate configuration and check the bot token against the API
    Check,
}
