//! Types for Spotify Web API requests and responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use vibes_playback::{Artist, PlaybackSnapshot, Playlist, TrackRef};

/// Default base URL of the Spotify Web API
pub const DEFAULT_API_BASE_URL: &str = "https://api.spotify.com/v1";

/// Configuration for connecting to the Spotify Web API.
#[derive(Debug, Clone)]
pub struct SpotifyConfig {
    /// Base URL of the API (e.g., "https://api.spotify.com/v1")
    pub api_base_url: String,
    /// OAuth access token with the user-read-playback-state and
    /// user-modify-playback-state scopes
    pub access_token: String,
    /// Device to target with player commands (active device if `None`)
    pub device_id: Option<String>,
    /// Per-request timeout
    pub request_timeout: Duration,
}

impl SpotifyConfig {
    /// Create a config for the public API.
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            access_token: access_token.into(),
            device_id: None,
            request_timeout: Duration::from_secs(10),
        }
    }

    /// Point the client at a different API host.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Target a specific device.
    pub fn with_device(mut self, device_id: impl Into<String>) -> Self {
        self.device_id = Some(device_id.into());
        self
    }
}

// =============================================================================
// Player Types
// =============================================================================

/// Response of `GET /me/player`.
#[derive(Debug, Clone, Deserialize)]
pub struct CurrentPlayback {
    pub is_playing: bool,
    /// Progress into the current item (absent when nothing is loaded)
    pub progress_ms: Option<u64>,
    /// Unix timestamp in milliseconds when the data was fetched
    pub timestamp: Option<i64>,
    pub item: Option<PlayableItem>,
    pub context: Option<PlaybackContext>,
    pub device: Option<Device>,
}

impl CurrentPlayback {
    /// When Spotify took this reading.
    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp.and_then(DateTime::<Utc>::from_timestamp_millis)
    }

    /// Convert to the playback core's snapshot.
    ///
    /// Episodes, ads and local files have no track identity, so they show as
    /// no selected track.
    pub fn into_snapshot(self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            is_playing: self.is_playing,
            position_ms: self.progress_ms.unwrap_or(0),
            selected_track: self.item.and_then(PlayableItem::into_track_ref),
            context_uri: self.context.map(|c| c.uri).unwrap_or_default(),
        }
    }
}

/// Track or episode currently loaded.
#[derive(Debug, Clone, Deserialize)]
pub struct PlayableItem {
    /// "track" or "episode"
    #[serde(rename = "type")]
    pub kind: String,
    /// `None` for local files
    pub id: Option<String>,
    pub uri: String,
    pub name: String,
    pub duration_ms: u64,
    #[serde(default)]
    pub artists: Vec<SpotifyArtist>,
    pub album: Option<SpotifyAlbum>,
}

impl PlayableItem {
    pub fn is_track(&self) -> bool {
        self.kind == "track"
    }

    /// Core track reference, if this item is a streamable track.
    pub fn into_track_ref(self) -> Option<TrackRef> {
        if !self.is_track() {
            return None;
        }
        let id = self.id?;
        let album_art_url = self
            .album
            .and_then(|album| album.images.into_iter().next())
            .map(|image| image.url)
            .unwrap_or_default();

        Some(TrackRef {
            id,
            uri: self.uri,
            name: self.name,
            artists: self.artists.into_iter().map(Artist::from).collect(),
            duration_ms: self.duration_ms,
            album_art_url,
        })
    }
}

/// Artist as embedded in track objects.
#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyArtist {
    pub name: String,
    #[serde(default)]
    pub external_urls: ExternalUrls,
}

impl From<SpotifyArtist> for Artist {
    fn from(artist: SpotifyArtist) -> Self {
        Artist {
            name: artist.name,
            external_url: artist.external_urls.spotify.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExternalUrls {
    pub spotify: Option<String>,
}

/// Album as embedded in track objects.
#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyAlbum {
    pub name: Option<String>,
    /// Cover art, largest first
    #[serde(default)]
    pub images: Vec<SpotifyImage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyImage {
    pub url: String,
    pub height: Option<u32>,
    pub width: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaybackContext {
    pub uri: String,
}

/// Playback device.
#[derive(Debug, Clone, Deserialize)]
pub struct Device {
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// Request body for `PUT /me/player/play`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayRequest {
    pub context_uri: String,
    pub offset: PlayOffset,
    pub position_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayOffset {
    pub uri: String,
}

// =============================================================================
// Playlist Types
// =============================================================================

/// Response of `GET /playlists/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyPlaylist {
    pub id: String,
    pub uri: String,
    pub name: String,
    pub tracks: PlaylistTracks,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistTracks {
    #[serde(default)]
    pub items: Vec<PlaylistItem>,
    pub total: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistItem {
    /// `None` when the track was removed from the catalog
    pub track: Option<PlayableItem>,
}

impl SpotifyPlaylist {
    /// Convert to the core playlist, keeping at most `track_limit` playable tracks.
    pub fn into_playlist(self, track_limit: usize) -> Playlist {
        let tracks = self
            .tracks
            .items
            .into_iter()
            .filter_map(|item| item.track.and_then(PlayableItem::into_track_ref))
            .take(track_limit)
            .collect();

        Playlist {
            id: self.id,
            uri: self.uri,
            name: self.name,
            tracks,
        }
    }
}

// =============================================================================
// User Types
// =============================================================================

/// Response of `GET /me`.
#[derive(Debug, Clone, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub display_name: Option<String>,
    pub country: Option<String>,
    /// Subscription level ("premium", "free", ...)
    pub product: Option<String>,
}

impl UserProfile {
    /// Name to greet the user with.
    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.id)
    }

    /// Player commands require a premium subscription.
    pub fn can_control_playback(&self) -> bool {
        self.product.as_deref() == Some("premium")
    }
}
