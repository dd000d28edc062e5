//! Vibes Spotify Client
//!
//! HTTP client for the Spotify Web API endpoints a playback view uses.
//!
//! # Features
//!
//! - **Player**: read playback state, pause, play at a position, seek
//! - **Playlists**: fetch a playlist's tracks
//! - **Profile**: fetch the current user
//! - **Playback core**: implements `vibes_playback::RemotePlaybackApi`
//!
//! Obtaining and refreshing OAuth tokens is left to the caller; hand a fresh
//! token to [`SpotifyClient::set_access_token`].
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use vibes_playback::{PlaybackConfig, PlaybackSession};
//! use vibes_spotify_client::{SpotifyClient, SpotifyConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Arc::new(SpotifyClient::new(SpotifyConfig::new("BQD...token"))?);
//!
//!     let playlist = client.playlist("37i9dQZF1DX0XUsuxWHRQd", 16).await?;
//!     let session = PlaybackSession::start(client, playlist.uri, PlaybackConfig::default())?;
//!
//!     session.play_pause(playlist.tracks.first().cloned()).await?;
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod library;
mod player;
mod remote;
mod types;

// Re-export main types
pub use client::SpotifyClient;
pub use error::{Result, SpotifyClientError};
pub use types::{
    CurrentPlayback, Device, ExternalUrls, PlayOffset, PlayRequest, PlayableItem, PlaybackContext,
    PlaylistItem, PlaylistTracks, SpotifyAlbum, SpotifyArtist, SpotifyConfig, SpotifyImage,
    SpotifyPlaylist, UserProfile, DEFAULT_API_BASE_URL,
};

// Re-export sub-clients for direct use if needed
pub use library::LibraryClient;
pub use player::PlayerClient;
