//! Playlist and profile endpoints of the Spotify Web API.

use crate::client::Credentials;
use crate::error::{check_status, Endpoint, Result, SpotifyClientError};
use crate::types::{SpotifyPlaylist, UserProfile};
use reqwest::Client;
use tracing::debug;
use vibes_playback::Playlist;

/// Library client, borrowed from a [`SpotifyClient`](crate::SpotifyClient).
pub struct LibraryClient<'a> {
    http: &'a Client,
    creds: &'a Credentials,
}

impl<'a> LibraryClient<'a> {
    pub(crate) fn new(http: &'a Client, creds: &'a Credentials) -> Self {
        Self { http, creds }
    }

    /// Get a playlist, keeping at most `track_limit` playable tracks.
    pub async fn get_playlist(&self, playlist_id: &str, track_limit: usize) -> Result<Playlist> {
        let url = format!("{}/playlists/{}", self.creds.base_url, playlist_id);
        debug!(url = %url, playlist_id = %playlist_id, "Fetching playlist");

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.creds.access_token)
            .send()
            .await?;

        let response = check_status(response, Endpoint::Read).await?;
        let playlist: SpotifyPlaylist = response.json().await.map_err(|e| {
            SpotifyClientError::ParseError(format!("Failed to parse playlist: {}", e))
        })?;

        debug!(
            name = %playlist.name,
            total = ?playlist.tracks.total,
            "Fetched playlist"
        );

        Ok(playlist.into_playlist(track_limit))
    }

    /// Get the profile of the current user.
    pub async fn current_user(&self) -> Result<UserProfile> {
        let url = format!("{}/me", self.creds.base_url);
        debug!(url = %url, "Fetching user profile");

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.creds.access_token)
            .send()
            .await?;

        let response = check_status(response, Endpoint::Read).await?;
        response.json().await.map_err(|e| {
            SpotifyClientError::ParseError(format!("Failed to parse user profile: {}", e))
        })
    }
}
