//! Player endpoints of the Spotify Web API.

use crate::client::Credentials;
use crate::error::{check_status, Endpoint, Result, SpotifyClientError};
use crate::types::{CurrentPlayback, PlayOffset, PlayRequest};
use reqwest::{Client, RequestBuilder, StatusCode};
use tracing::{debug, trace};
use vibes_playback::PlaybackSnapshot;

/// Player client, borrowed from a [`SpotifyClient`](crate::SpotifyClient).
pub struct PlayerClient<'a> {
    http: &'a Client,
    creds: &'a Credentials,
}

impl<'a> PlayerClient<'a> {
    pub(crate) fn new(http: &'a Client, creds: &'a Credentials) -> Self {
        Self { http, creds }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/me/player{}", self.creds.base_url, path)
    }

    fn with_device(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.creds.device_id {
            Some(device_id) => request.query(&[("device_id", device_id)]),
            None => request,
        }
    }

    /// Get the raw playback state, `None` when nothing is active.
    pub async fn playback_state(&self) -> Result<Option<CurrentPlayback>> {
        let url = self.url("");
        trace!(url = %url, "Fetching playback state");

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.creds.access_token)
            .send()
            .await?;

        // 204 No Content: no device is active on the account
        if response.status() == StatusCode::NO_CONTENT {
            trace!("No active playback");
            return Ok(None);
        }

        let response = check_status(response, Endpoint::Read).await?;
        let playback: CurrentPlayback = response.json().await.map_err(|e| {
            SpotifyClientError::ParseError(format!("Failed to parse playback state: {}", e))
        })?;

        Ok(Some(playback))
    }

    /// Get the current playback state as a core snapshot.
    pub async fn current_playback(&self) -> Result<PlaybackSnapshot> {
        Ok(self
            .playback_state()
            .await?
            .map_or_else(PlaybackSnapshot::idle, CurrentPlayback::into_snapshot))
    }

    /// Pause playback.
    pub async fn pause(&self) -> Result<()> {
        let url = self.url("/pause");
        debug!(url = %url, "Pausing playback");

        let request = self
            .http
            .put(&url)
            .bearer_auth(&self.creds.access_token)
            .header(reqwest::header::CONTENT_LENGTH, 0);
        let response = self.with_device(request).send().await?;

        check_status(response, Endpoint::Player).await?;
        Ok(())
    }

    /// Start `track_uri` within `context_uri` at `position_ms`.
    pub async fn play(&self, context_uri: &str, track_uri: &str, position_ms: u64) -> Result<()> {
        let url = self.url("/play");
        debug!(url = %url, track_uri = %track_uri, position_ms, "Starting playback");

        let body = PlayRequest {
            context_uri: context_uri.to_string(),
            offset: PlayOffset {
                uri: track_uri.to_string(),
            },
            position_ms,
        };
        let request = self
            .http
            .put(&url)
            .bearer_auth(&self.creds.access_token)
            .json(&body);
        let response = self.with_device(request).send().await?;

        check_status(response, Endpoint::Player).await?;
        Ok(())
    }

    /// Seek to `position_ms` in the current track.
    pub async fn seek(&self, position_ms: u64) -> Result<()> {
        let url = self.url("/seek");
        debug!(url = %url, position_ms, "Seeking");

        let request = self
            .http
            .put(&url)
            .bearer_auth(&self.creds.access_token)
            .header(reqwest::header::CONTENT_LENGTH, 0)
            .query(&[("position_ms", position_ms)]);
        let response = self.with_device(request).send().await?;

        check_status(response, Endpoint::Player).await?;
        Ok(())
    }
}
