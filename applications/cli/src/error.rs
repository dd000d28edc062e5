/// CLI error types
use thiserror::Error;
use vibes_playback::PlaybackError;
use vibes_spotify_client::SpotifyClientError;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Playback error: {0}")]
    Playback(#[from] PlaybackError),

    #[error("Spotify error: {0}")]
    Spotify(#[from] SpotifyClientError),

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Track {index} is not in the playlist (1-{len})")]
    TrackOutOfRange { index: usize, len: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
