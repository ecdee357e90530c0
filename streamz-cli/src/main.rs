//! TravelStreamz CLI - Command-line interface
//!
//! Runs the video API server and inspects the configured video store.

mod commands;

use anyhow::Context;
use clap::Parser;
use streamz_core::StreamzConfig;
use streamz_core::tracing_setup::{CliLogLevel, init_tracing};
use tracing::{debug, warn};

#[derive(Parser)]
#[command(name = "streamz")]
#[command(about = "Range-aware video streaming API for TravelStreamz")]
struct Cli {
    /// Console log level; RUST_LOG overrides it when set
    #[arg(long, global = true, value_enum, default_value_t = CliLogLevel::Info)]
    log_level: CliLogLevel,

    #[command(subcommand)]
    command: commands::Commands,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv = dotenvy::dotenv();

    let cli = Cli::parse();
    let config =
        StreamzConfig::from_env().context("Failed to read configuration from environment")?;
    init_tracing(cli.log_level.as_tracing_level(), &config.logging).with_context(|| {
        format!(
            "Failed to open run log {}",
            config.logging.log_file_path().display()
        )
    })?;

    match dotenv {
        Ok(path) => debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => debug!("No .env file found"),
        Err(e) => warn!("Ignoring unreadable .env file: {}", e),
    }

    commands::handle_command(cli.command, config).await
}
