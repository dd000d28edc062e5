//! `RemotePlaybackApi` over the Spotify Web API.

use crate::client::SpotifyClient;
use async_trait::async_trait;
use vibes_playback::{PlaybackSnapshot, RemotePlaybackApi, Result};

#[async_trait]
impl RemotePlaybackApi for SpotifyClient {
    async fn pause(&self) -> Result<()> {
        Ok(SpotifyClient::pause(self).await?)
    }

    async fn resume(&self, context_uri: &str, track_uri: &str, position_ms: u64) -> Result<()> {
        Ok(self.play(context_uri, track_uri, position_ms).await?)
    }

    async fn play_from_start(&self, context_uri: &str, track_uri: &str) -> Result<()> {
        Ok(self.play(context_uri, track_uri, 0).await?)
    }

    async fn seek(&self, position_ms: u64) -> Result<()> {
        Ok(SpotifyClient::seek(self, position_ms).await?)
    }

    async fn current_playback(&self) -> Result<PlaybackSnapshot> {
        Ok(SpotifyClient::current_playback(self).await?)
    }
}
