/// CLI configuration
use crate::error::{CliError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use vibes_playback::PlaybackConfig;
use vibes_spotify_client::{SpotifyConfig, DEFAULT_API_BASE_URL};

const DEFAULT_CONFIG_FILE: &str = "vibes.toml";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CliConfig {
    #[serde(default)]
    pub spotify: SpotifySettings,

    #[serde(default)]
    pub playback: PlaybackSettings,

    #[serde(default)]
    pub playlist: PlaylistSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SpotifySettings {
    #[serde(default)]
    pub access_token: String,

    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    #[serde(default)]
    pub device_id: Option<String>,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlaybackSettings {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Defaults to the poll interval
    #[serde(default)]
    pub manual_update_grace_ms: Option<u64>,

    #[serde(default = "default_confirmation_window_ms")]
    pub optimistic_confirmation_window_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlaylistSettings {
    /// Playlist `watch` mounts when none is given on the command line
    #[serde(default)]
    pub default_id: Option<String>,

    #[serde(default = "default_track_limit")]
    pub track_limit: usize,
}

impl CliConfig {
    /// Load configuration from file and environment
    ///
    /// Reads `path` if given (it must exist), otherwise `vibes.toml` in the
    /// working directory if present. Environment variables prefixed with
    /// `VIBES_` override the file, nested keys separated by `__`
    /// (e.g. `VIBES_SPOTIFY__ACCESS_TOKEN`).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(CliError::Config(format!(
                        "config file not found: {}",
                        path.display()
                    )));
                }
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        settings = settings.add_source(
            config::Environment::with_prefix("VIBES")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings
            .build()
            .map_err(|e| CliError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| CliError::Config(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.spotify.access_token.is_empty() {
            return Err(CliError::Config(
                "Spotify access token is required (set VIBES_SPOTIFY__ACCESS_TOKEN)".to_string(),
            ));
        }

        if self.playback.poll_interval_ms == 0 || self.playback.tick_interval_ms == 0 {
            return Err(CliError::Config(
                "poll and tick intervals must be greater than zero".to_string(),
            ));
        }

        if self.playback.tick_interval_ms > self.playback.poll_interval_ms {
            return Err(CliError::Config(format!(
                "tick interval ({} ms) must not exceed poll interval ({} ms)",
                self.playback.tick_interval_ms, self.playback.poll_interval_ms
            )));
        }

        if self.playlist.track_limit == 0 {
            return Err(CliError::Config(
                "playlist track limit must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    pub fn playback_config(&self) -> PlaybackConfig {
        let poll_interval = Duration::from_millis(self.playback.poll_interval_ms);
        PlaybackConfig {
            poll_interval,
            tick_interval: Duration::from_millis(self.playback.tick_interval_ms),
            manual_update_grace: self
                .playback
                .manual_update_grace_ms
                .map_or(poll_interval, Duration::from_millis),
            optimistic_confirmation_window: Duration::from_millis(
                self.playback.optimistic_confirmation_window_ms,
            ),
        }
    }

    pub fn spotify_config(&self) -> SpotifyConfig {
        let mut config = SpotifyConfig::new(self.spotify.access_token.clone())
            .with_base_url(self.spotify.api_base_url.clone());
        config.device_id = self.spotify.device_id.clone();
        config.request_timeout = Duration::from_secs(self.spotify.request_timeout_secs);
        config
    }
}

// Default values
impl Default for SpotifySettings {
    fn default() -> Self {
        Self {
            access_token: String::new(),
            api_base_url: default_api_base_url(),
            device_id: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            tick_interval_ms: default_tick_interval_ms(),
            manual_update_grace_ms: None,
            optimistic_confirmation_window_ms: default_confirmation_window_ms(),
        }
    }
}

impl Default for PlaylistSettings {
    fn default() -> Self {
        Self {
            default_id: None,
            track_limit: default_track_limit(),
        }
    }
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_poll_interval_ms() -> u64 {
    2000
}

fn default_tick_interval_ms() -> u64 {
    250
}

fn default_confirmation_window_ms() -> u64 {
    5000
}

fn default_track_limit() -> usize {
    16
}
