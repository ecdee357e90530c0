//! CLI command implementations

use std::net::IpAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::Subcommand;
use streamz_core::storage::{SortOrder, SupabaseVideoStore, VideoCatalog, VideoQuery};
use streamz_core::{RuntimeMode, StreamzConfig};
use tracing::info;

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Start the video API server
    Server {
        /// Interface to bind (overrides API_HOST)
        #[arg(long)]
        host: Option<IpAddr>,
        /// Port to bind (overrides API_PORT)
        #[arg(short, long)]
        port: Option<u16>,
        /// Video source: production (Supabase) or development (local directory)
        #[arg(long, default_value_t = RuntimeMode::Production, env = "STREAMZ_MODE")]
        mode: RuntimeMode,
        /// Directory of video files served in development mode
        #[arg(long)]
        videos_dir: Option<PathBuf>,
    },
    /// Check the Supabase video table and list the oldest rows
    Check {
        /// Number of rows to show
        #[arg(short, long, default_value = "5")]
        limit: usize,
    },
}

/// Handle the CLI command
///
/// # Errors
/// Returns the error of whichever command fails, with context attached
pub async fn handle_command(command: Commands, config: StreamzConfig) -> anyhow::Result<()> {
    match command {
        Commands::Server {
            host,
            port,
            mode,
            videos_dir,
        } => start_server(with_bind_overrides(config, host, port), mode, videos_dir).await,
        Commands::Check { limit } => check_store(&config, limit).await,
    }
}

/// Applies `--host` / `--port` on top of the environment configuration.
fn with_bind_overrides(
    mut config: StreamzConfig,
    host: Option<IpAddr>,
    port: Option<u16>,
) -> StreamzConfig {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    config
}

/// Start the API server
///
/// # Errors
/// - Missing Supabase credentials in production mode
/// - Store probe, bind, or serve failure
pub async fn start_server(
    config: StreamzConfig,
    mode: RuntimeMode,
    videos_dir: Option<PathBuf>,
) -> anyhow::Result<()> {
    info!("Starting TravelStreamz API in {} mode", mode);
    info!("Store configuration: {:?}", config.store);

    streamz_web::run_server(config, mode, videos_dir)
        .await
        .context("Server failed")?;
    Ok(())
}

/// Print the row count of the videos table and its oldest entries
///
/// # Errors
/// - Missing Supabase credentials
/// - Store unreachable
pub async fn check_store(config: &StreamzConfig, limit: usize) -> anyhow::Result<()> {
    let store = SupabaseVideoStore::from_config(&config.store)
        .context("Supabase is not configured")?;

    println!("Checking table '{}'...", config.store.videos_table);
    let count = store
        .count_videos()
        .await
        .context("Failed to count videos")?;
    println!("Total videos: {count}");

    let query = VideoQuery {
        order: SortOrder::Ascending,
        limit: Some(limit),
        ..VideoQuery::default()
    };
    let videos = store
        .list_videos(&query)
        .await
        .context("Failed to list videos")?;

    if videos.is_empty() {
        println!("No videos found");
        return Ok(());
    }

    println!("Oldest {} videos:", videos.len());
    for (index, video) in videos.iter().enumerate() {
        println!("{}. {} ({})", index + 1, video.id, video.location_name);
        println!("   file: {}", video.storage_path);
        println!("   created: {}", video.created_at.to_rfc3339());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use super::*;

    #[test]
    fn test_flags_override_environment_bind_address() {
        let config = with_bind_overrides(
            StreamzConfig::default(),
            Some(IpAddr::V4(Ipv4Addr::UNSPECIFIED)),
            Some(8080),
        );
        assert_eq!(config.server.bind_address().to_string(), "0.0.0.0:8080");
    }

    #[test]
    fn test_absent_flags_keep_environment_values() {
        let mut base = StreamzConfig::default();
        base.server.port = 4000;
        let config = with_bind_overrides(base, None, None);
        assert_eq!(config.server.port, 4000);
    }
}
