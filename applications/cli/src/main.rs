/// Vibes - live Spotify playback view in the terminal
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vibes_cli::{config::CliConfig, render, run_watch};
use vibes_spotify_client::SpotifyClient;

#[derive(Parser)]
#[command(name = "vibes")]
#[command(about = "Follow and control Spotify playback from the terminal", long_about = None)]
struct Cli {
    /// Configuration file path (defaults to ./vibes.toml when present)
    #[arg(short, long, global = true, env = "VIBES_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Mount a playlist and follow playback interactively
    Watch {
        /// Playlist ID (falls back to playlist.default_id)
        #[arg(short, long)]
        playlist: Option<String>,
    },
    /// Print the current playback state once
    Now,
    /// List the tracks of a playlist
    Playlist {
        /// Playlist ID
        id: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they never tear the status line
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vibes=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = CliConfig::load(cli.config.as_deref())?;
    config.validate()?;
    let client = Arc::new(SpotifyClient::new(config.spotify_config())?);
    info!(api = %client.url().await, "Spotify client ready");

    match cli.command {
        Commands::Watch { playlist } => {
            run_watch(client, &config, playlist).await?;
        }
        Commands::Now => {
            let summary = match client.playback_state().await? {
                Some(playback) => {
                    let fetched_at = playback.fetched_at();
                    render::snapshot_summary(&playback.into_snapshot(), fetched_at)
                }
                None => "■ Nothing playing".to_string(),
            };
            println!("{}", summary);
        }
        Commands::Playlist { id } => {
            let playlist = client.playlist(&id, config.playlist.track_limit).await?;
            println!("{}", render::playlist_listing(&playlist, None));
        }
    }

    Ok(())
}
