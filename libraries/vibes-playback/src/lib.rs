//! Vibes - Playback Reconciliation
//!
//! Keeps a responsive client view of a remote playback service that only
//! answers when polled.
//!
//! This crate provides:
//! - Optimistic play/pause and track selection ([`PlaybackReconciler`])
//! - Dead-reckoned progress between polls ([`ProgressEstimator`])
//! - Serialized, coalesced remote commands ([`CommandDispatcher`])
//! - Recurring timers and polled data sources
//! - A session actor tying it all together ([`PlaybackSession`])
//!
//! # Architecture
//!
//! The two stores are plain synchronous state machines. They never perform
//! I/O: local actions return a [`RemoteCommand`] describing what the remote
//! service should do, and server readings are pushed in as
//! [`PlaybackSnapshot`]s. Time comes from a [`Clock`], so tests can drive it
//! by hand.
//!
//! The remote service is reached through the [`RemotePlaybackApi`] trait;
//! `vibes-spotify-client` implements it over the Spotify Web API.
//!
//! # Example: Driving the stores by hand
//!
//! ```rust
//! use std::sync::Arc;
//! use vibes_playback::{
//!     ManualClock, PlaybackConfig, PlaybackReconciler, PlaybackSnapshot,
//!     ProgressEstimator, RemoteCommand, SharedClock, TrackRef,
//! };
//!
//! let clock = ManualClock::new();
//! let shared: SharedClock = Arc::new(clock.clone());
//! let config = PlaybackConfig::default();
//!
//! let mut reconciler = PlaybackReconciler::new("spotify:playlist:p", &config, shared.clone());
//! let mut progress = ProgressEstimator::new(&config, shared);
//!
//! let track = TrackRef {
//!     id: "a".to_string(),
//!     uri: "spotify:track:a".to_string(),
//!     name: "Song".to_string(),
//!     artists: vec![],
//!     duration_ms: 180_000,
//!     album_art_url: String::new(),
//! };
//!
//! // Local action applies immediately
//! let command = reconciler.play_pause(Some(track.clone()), &mut progress).unwrap();
//! assert!(matches!(command, RemoteCommand::PlayFromStart { .. }));
//! assert!(reconciler.is_selected_track("a"));
//!
//! // A stale snapshot does not undo it
//! let stale = PlaybackSnapshot::idle();
//! reconciler.on_server_snapshot(&stale);
//! assert!(reconciler.is_selected_track("a"));
//!
//! // Progress advances between polls
//! clock.advance_ms(2250);
//! progress.tick(reconciler.is_playing());
//! assert_eq!(progress.position_ms(), 250);
//! ```
//!
//! # Example: Running a session
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use vibes_playback::{PlaybackConfig, PlaybackSession, RemotePlaybackApi};
//!
//! async fn run(api: Arc<dyn RemotePlaybackApi>) -> vibes_playback::Result<()> {
//!     let mut session = PlaybackSession::start(api, "spotify:playlist:p", PlaybackConfig::default())?;
//!
//!     let mut view = session.subscribe();
//!     while view.changed().await.is_ok() {
//!         let current = view.borrow().clone();
//!         println!("{} ms", current.progress.estimated_position_ms);
//!     }
//!
//!     session.shutdown().await;
//!     Ok(())
//! }
//! ```

mod clock;
mod command;
mod error;
mod polling;
mod progress;
mod reconciler;
mod remote;
mod scheduler;
mod session;
pub mod types;

// Public exports
pub use clock::{Clock, ManualClock, SharedClock, SystemClock};
pub use command::{
    coalesce, Coalesced, CommandDispatcher, CommandFailure, CommandKind, CommandReply,
    QueuedCommand, RemoteCommand,
};
pub use error::{PlaybackError, Result};
pub use polling::{PollState, PollingSource};
pub use progress::{normalized_progress, ProgressEstimator, SampleOutcome};
pub use reconciler::{PlaybackReconciler, SnapshotOutcome};
pub use remote::RemotePlaybackApi;
pub use scheduler::{register_interval, IntervalHandle};
pub use session::{PlaybackSession, SessionController, SessionHandle};
pub use types::{
    Artist, ClientPlaybackState, ClientProgressState, PlaybackConfig, PlaybackSnapshot,
    PlaybackView, Playlist, TrackRef,
};
