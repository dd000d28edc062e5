//! Main Spotify Web API client.

use crate::error::{Result, SpotifyClientError};
use crate::player::PlayerClient;
use crate::library::LibraryClient;
use crate::types::{CurrentPlayback, SpotifyConfig, UserProfile};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info};
use url::Url;
use vibes_playback::{PlaybackSnapshot, Playlist};

/// Client for the parts of the Spotify Web API a playback view needs.
///
/// Player and library calls go through short-lived borrowed sub-clients;
/// the access token can be swapped at any time with [`set_access_token`].
///
/// # Example
///
/// ```ignore
/// use vibes_spotify_client::{SpotifyClient, SpotifyConfig};
///
/// let client = SpotifyClient::new(SpotifyConfig::new("BQD...token"))?;
///
/// let me = client.current_user().await?;
/// println!("Logged in as {}", me.display_name());
///
/// let snapshot = client.current_playback().await?;
/// println!("Playing: {}", snapshot.is_playing);
/// ```
///
/// [`set_access_token`]: SpotifyClient::set_access_token
pub struct SpotifyClient {
    http: Client,
    config: Arc<RwLock<SpotifyConfig>>,
}

/// Owned copy of what a request needs, taken without holding the lock
pub(crate) struct Credentials {
    pub base_url: String,
    pub access_token: String,
    pub device_id: Option<String>,
}

impl SpotifyClient {
    /// Create a new client with the given configuration.
    pub fn new(config: SpotifyConfig) -> Result<Self> {
        if config.api_base_url.is_empty() {
            return Err(SpotifyClientError::InvalidUrl("URL cannot be empty".into()));
        }

        let base_url = config.api_base_url.trim_end_matches('/').to_string();
        let parsed =
            Url::parse(&base_url).map_err(|e| SpotifyClientError::InvalidUrl(e.to_string()))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(SpotifyClientError::InvalidUrl(
                "URL must start with http:// or https://".into(),
            ));
        }

        let http = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(Duration::from_secs(5))
            .user_agent(format!("Vibes/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        debug!(url = %base_url, device = ?config.device_id, "Created Spotify client");

        Ok(Self {
            http,
            config: Arc::new(RwLock::new(SpotifyConfig {
                api_base_url: base_url,
                ..config
            })),
        })
    }

    /// Get the API base URL.
    pub async fn url(&self) -> String {
        self.config.read().await.api_base_url.clone()
    }

    /// Replace the bearer token (e.g., after an external refresh).
    pub async fn set_access_token(&self, access_token: impl Into<String>) {
        self.config.write().await.access_token = access_token.into();
        info!("Access token replaced");
    }

    pub(crate) async fn credentials(&self) -> Result<Credentials> {
        let config = self.config.read().await;
        if config.access_token.is_empty() {
            return Err(SpotifyClientError::AuthRequired);
        }
        Ok(Credentials {
            base_url: config.api_base_url.clone(),
            access_token: config.access_token.clone(),
            device_id: config.device_id.clone(),
        })
    }

    /// Read the current playback state.
    pub async fn current_playback(&self) -> Result<PlaybackSnapshot> {
        let creds = self.credentials().await?;
        PlayerClient::new(&self.http, &creds).current_playback().await
    }

    /// Read the full playback state, including device and fetch time.
    pub async fn playback_state(&self) -> Result<Option<CurrentPlayback>> {
        let creds = self.credentials().await?;
        PlayerClient::new(&self.http, &creds).playback_state().await
    }

    /// Pause playback.
    pub async fn pause(&self) -> Result<()> {
        let creds = self.credentials().await?;
        PlayerClient::new(&self.http, &creds).pause().await
    }

    /// Start `track_uri` within `context_uri` at `position_ms`.
    pub async fn play(&self, context_uri: &str, track_uri: &str, position_ms: u64) -> Result<()> {
        let creds = self.credentials().await?;
        PlayerClient::new(&self.http, &creds)
            .play(context_uri, track_uri, position_ms)
            .await
    }

    /// Move the play head.
    pub async fn seek(&self, position_ms: u64) -> Result<()> {
        let creds = self.credentials().await?;
        PlayerClient::new(&self.http, &creds).seek(position_ms).await
    }

    /// Fetch a playlist with at most `track_limit` tracks.
    pub async fn playlist(&self, playlist_id: &str, track_limit: usize) -> Result<Playlist> {
        let creds = self.credentials().await?;
        LibraryClient::new(&self.http, &creds)
            .get_playlist(playlist_id, track_limit)
            .await
    }

    /// Fetch the profile of the token's owner.
    pub async fn current_user(&self) -> Result<UserProfile> {
        let creds = self.credentials().await?;
        let profile = LibraryClient::new(&self.http, &creds).current_user().await?;
        info!(user = %profile.id, product = ?profile.product, "Fetched user profile");
        Ok(profile)
    }
}
