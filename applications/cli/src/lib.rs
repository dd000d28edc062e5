//! Vibes CLI
//!
//! Terminal front end for `vibes-playback`: loads configuration, builds the
//! Spotify client and renders the live playback view of a playlist.

pub mod commands;
pub mod config;
pub mod error;
pub mod render;
pub mod watch;

pub use commands::{WatchCommand, HELP};
pub use config::CliConfig;
pub use error::{CliError, Result};
pub use watch::{run_watch, LineOutcome, WatchApp};
