//! Error types for playback reconciliation

use thiserror::Error;

/// Playback errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    /// `play_pause` was called without a track while nothing is selected
    #[error("No active track to play or pause")]
    NoActiveTrack,

    /// A command or poll against the remote playback service failed
    #[error("Remote playback service error: {0}")]
    Remote(String),

    /// The session was shut down before the request could be handled
    #[error("Playback session closed")]
    SessionClosed,

    /// Configuration rejected at session start
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl PlaybackError {
    /// Wrap any remote failure message
    pub fn remote(message: impl Into<String>) -> Self {
        Self::Remote(message.into())
    }
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
