//! Core types for playback reconciliation

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Artist credited on a track
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    /// Display name
    pub name: String,

    /// Link to the artist page on the streaming service
    pub external_url: String,
}

/// Track information as reported by the streaming service
///
/// Immutable once obtained. Two tracks are the same track when their
/// `id`s match; every other field is display metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackRef {
    /// Unique track identifier
    pub id: String,

    /// Service URI used in play commands
    pub uri: String,

    /// Track title
    pub name: String,

    /// Credited artists, in billing order
    pub artists: Vec<Artist>,

    /// Track duration in milliseconds
    pub duration_ms: u64,

    /// Album cover URL (empty when the service has none)
    pub album_art_url: String,
}

impl TrackRef {
    /// Identity comparison (by id only)
    pub fn is_same_track(&self, other: &TrackRef) -> bool {
        self.id == other.id
    }

    /// Artist names joined for display
    pub fn artist_names(&self) -> String {
        self.artists
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// One polled reading of server-side playback state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackSnapshot {
    /// Whether the account is currently playing
    pub is_playing: bool,

    /// Position within the current track at the time of the reading
    pub position_ms: u64,

    /// Current track (`None` if nothing is playing on the account)
    pub selected_track: Option<TrackRef>,

    /// Playlist/context playing server-side (empty when unknown)
    pub context_uri: String,
}

impl PlaybackSnapshot {
    /// Snapshot for an account with no active playback
    pub fn idle() -> Self {
        Self {
            is_playing: false,
            position_ms: 0,
            selected_track: None,
            context_uri: String::new(),
        }
    }

    /// Id of the reported track, if any
    pub fn selected_track_id(&self) -> Option<&str> {
        self.selected_track.as_ref().map(|t| t.id.as_str())
    }
}

/// Playlist the playback view is mounted on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub uri: String,
    pub name: String,
    pub tracks: Vec<TrackRef>,
}

/// Timing configuration for a playback session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Period between server snapshot fetches (default: 2s)
    pub poll_interval: Duration,

    /// Period between local progress extrapolation steps (default: 250ms)
    pub tick_interval: Duration,

    /// How long server position samples are ignored after a seek or
    /// track change (default: one poll interval)
    pub manual_update_grace: Duration,

    /// How long an unconfirmed optimistic update keeps precedence over
    /// disagreeing snapshots (default: 5s)
    pub optimistic_confirmation_window: Duration,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        let poll_interval = Duration::from_secs(2);
        Self {
            poll_interval,
            tick_interval: Duration::from_millis(250),
            manual_update_grace: poll_interval,
            optimistic_confirmation_window: Duration::from_secs(5),
        }
    }
}

/// The Reconciler's view of what is playing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientPlaybackState {
    pub is_playing: bool,
    pub selected_track: Option<TrackRef>,

    /// Set from a local command until a snapshot confirms it (or is trusted instead)
    pub optimistic_update_in_progress: bool,
}

/// The Progress Estimator's view of the playback position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientProgressState {
    /// Position rendered to the user
    pub estimated_position_ms: u64,

    /// When the last server position was adopted
    pub last_server_sync_at: Instant,

    /// When the position was last overridden locally (seek or track change)
    pub last_manual_seek_at: Option<Instant>,

    /// Extrapolation is held while the server lags behind the estimate
    pub suppress_extrapolation_until_server_catches_up: bool,
}

/// Everything a renderer needs, published by the session after every change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackView {
    pub playback: ClientPlaybackState,
    pub progress: ClientProgressState,
}

impl PlaybackView {
    /// Whether the given track id is the selected one
    pub fn is_selected_track(&self, id: &str) -> bool {
        self.playback
            .selected_track
            .as_ref()
            .is_some_and(|t| t.id == id)
    }
}
