//! Remote playback service seam
//!
//! The session polls and commands the streaming service through this trait.
//! `vibes-spotify-client` implements it over HTTP; tests use fakes.

use crate::error::Result;
use crate::types::PlaybackSnapshot;
use async_trait::async_trait;

/// Operations consumed from the remote playback service
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RemotePlaybackApi: Send + Sync {
    /// Pause playback on the account
    async fn pause(&self) -> Result<()>;

    /// Resume `track_uri` within `context_uri` at `position_ms`
    async fn resume(&self, context_uri: &str, track_uri: &str, position_ms: u64) -> Result<()>;

    /// Play `track_uri` within `context_uri` from position 0
    async fn play_from_start(&self, context_uri: &str, track_uri: &str) -> Result<()>;

    /// Move the play head of the current track
    async fn seek(&self, position_ms: u64) -> Result<()>;

    /// Read the current playback state
    async fn current_playback(&self) -> Result<PlaybackSnapshot>;
}
