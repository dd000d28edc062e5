//! Error types for the Spotify client.

use reqwest::{Response, StatusCode};
use thiserror::Error;
use vibes_playback::PlaybackError;

/// Errors that can occur when talking to the Spotify Web API.
#[derive(Error, Debug)]
pub enum SpotifyClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// API returned an error response
    #[error("Spotify API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Access token missing, expired or revoked
    #[error("Authentication required")]
    AuthRequired,

    /// Rate limited by the API
    #[error("Rate limited, retry after {retry_after_secs} seconds")]
    RateLimited { retry_after_secs: u64 },

    /// Player command sent while no device is active on the account
    #[error("No active playback device")]
    NoActiveDevice,

    /// Failed to parse API response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Invalid API base URL
    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),
}

/// Result type for Spotify client operations.
pub type Result<T> = std::result::Result<T, SpotifyClientError>;

impl From<SpotifyClientError> for PlaybackError {
    fn from(e: SpotifyClientError) -> Self {
        PlaybackError::Remote(e.to_string())
    }
}

/// Whether an error response came from a player command or a plain read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Endpoint {
    Player,
    Read,
}

/// Map a non-success response to an error, pass successful ones through.
pub(crate) async fn check_status(response: Response, endpoint: Endpoint) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    match status {
        StatusCode::UNAUTHORIZED => Err(SpotifyClientError::AuthRequired),
        StatusCode::TOO_MANY_REQUESTS => {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(1);
            Err(SpotifyClientError::RateLimited { retry_after_secs })
        }
        StatusCode::NOT_FOUND if endpoint == Endpoint::Player => {
            Err(SpotifyClientError::NoActiveDevice)
        }
        _ => {
            let body = response.text().await.unwrap_or_default();
            Err(SpotifyClientError::Api {
                status: status.as_u16(),
                message: error_message(&body),
            })
        }
    }
}

/// Pull `error.message` out of a Spotify error body, falling back to the raw text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.to_string())
}
