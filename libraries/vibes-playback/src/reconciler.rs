//! Playback state reconciliation
//!
//! Keeps the client's `{is_playing, selected_track}` pair responsive to
//! local commands while converging on what the server reports.
//!
//! A local command applies immediately and raises
//! `optimistic_update_in_progress`. While the flag is up, snapshots that
//! disagree with the client are treated as stale and ignored; the first
//! snapshot that agrees clears the flag. A disagreeing snapshot without a
//! pending optimistic update is adopted as-is.
//!
//! The flag is not trusted forever: once an update has gone unconfirmed for
//! the configured confirmation window, or its remote command is known to
//! have failed, the next disagreeing snapshot wins.

use crate::clock::{since, SharedClock};
use crate::command::RemoteCommand;
use crate::error::{PlaybackError, Result};
use crate::progress::ProgressEstimator;
use crate::types::{ClientPlaybackState, PlaybackConfig, PlaybackSnapshot, TrackRef};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// What a snapshot did to the client state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotOutcome {
    /// Client is ahead of the server; snapshot ignored
    Deferred,
    /// Server state replaced the client state
    Adopted,
    /// Snapshot matched a pending optimistic update and confirmed it
    Confirmed,
    /// Nothing to do
    InSync,
}

/// Owns the client view of play state and selected track
pub struct PlaybackReconciler {
    clock: SharedClock,
    context_uri: String,
    confirmation_window: Duration,

    is_playing: bool,
    selected_track: Option<TrackRef>,
    optimistic_update_in_progress: bool,
    /// When the pending optimistic update was issued
    optimistic_since: Option<Instant>,
    /// The pending update's remote command failed
    optimistic_failed: bool,
}

impl PlaybackReconciler {
    /// Create a reconciler for a view playing within `context_uri`
    pub fn new(context_uri: impl Into<String>, config: &PlaybackConfig, clock: SharedClock) -> Self {
        Self {
            clock,
            context_uri: context_uri.into(),
            confirmation_window: config.optimistic_confirmation_window,
            is_playing: false,
            selected_track: None,
            optimistic_update_in_progress: false,
            optimistic_since: None,
            optimistic_failed: false,
        }
    }

    /// Whether the snapshot reports the track the client shows
    pub fn selected_track_in_sync(&self, snapshot: &PlaybackSnapshot) -> bool {
        snapshot.selected_track_id() == self.selected_track.as_ref().map(|t| t.id.as_str())
    }

    /// Apply a server snapshot
    pub fn on_server_snapshot(&mut self, snapshot: &PlaybackSnapshot) -> SnapshotOutcome {
        let track_in_sync = self.selected_track_in_sync(snapshot);
        let play_state_in_sync = snapshot.is_playing == self.is_playing;
        let synced = track_in_sync && play_state_in_sync;

        if self.optimistic_update_in_progress && !synced {
            if self.optimistic_update_still_trusted() {
                debug!(
                    server_track = ?snapshot.selected_track_id(),
                    server_playing = snapshot.is_playing,
                    "Client ahead of server, waiting for confirmation"
                );
                return SnapshotOutcome::Deferred;
            }
            info!(
                failed = self.optimistic_failed,
                "Optimistic update was never confirmed, trusting server"
            );
        }

        if !synced {
            self.is_playing = snapshot.is_playing;
            self.selected_track = snapshot.selected_track.clone();
            self.clear_optimistic();
            debug!(
                track = ?snapshot.selected_track_id(),
                is_playing = snapshot.is_playing,
                "Adopted server playback state"
            );
            return SnapshotOutcome::Adopted;
        }

        if self.optimistic_update_in_progress {
            self.clear_optimistic();
            debug!("Server confirmed optimistic update");
            return SnapshotOutcome::Confirmed;
        }

        SnapshotOutcome::InSync
    }

    /// Toggle playback of `track`, or of the selected track when `None`
    ///
    /// The change applies locally right away; the returned command must be
    /// sent to the remote service. Starting a different track resets the
    /// estimator to position 0 and opens its grace window.
    pub fn play_pause(
        &mut self,
        track: Option<TrackRef>,
        progress: &mut ProgressEstimator,
    ) -> Result<RemoteCommand> {
        let target = match track.or_else(|| self.selected_track.clone()) {
            Some(target) => target,
            None => return Err(PlaybackError::NoActiveTrack),
        };

        self.begin_optimistic();

        let is_selected = self
            .selected_track
            .as_ref()
            .is_some_and(|current| current.is_same_track(&target));

        let command = if is_selected && self.is_playing {
            self.is_playing = false;
            RemoteCommand::Pause
        } else if is_selected {
            self.is_playing = true;
            RemoteCommand::Resume {
                context_uri: self.context_uri.clone(),
                track_uri: target.uri.clone(),
                position_ms: progress.position_ms(),
            }
        } else {
            let command = RemoteCommand::PlayFromStart {
                context_uri: self.context_uri.clone(),
                track_uri: target.uri.clone(),
            };
            info!(track_id = %target.id, track = %target.name, "Switching track");
            self.selected_track = Some(target);
            self.is_playing = true;
            progress.set_progress_ms(0);
            progress.mark_manual_update(progress.now());
            command
        };

        debug!(command = command.name(), "Applied optimistic update");
        Ok(command)
    }

    /// A remote command for the pending update failed
    ///
    /// The optimistic state stays on screen; the next disagreeing snapshot
    /// corrects it.
    pub fn on_command_failed(&mut self) {
        if self.optimistic_update_in_progress {
            self.optimistic_failed = true;
        }
    }

    pub fn is_selected_track(&self, id: &str) -> bool {
        self.selected_track.as_ref().is_some_and(|t| t.id == id)
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn selected_track(&self) -> Option<&TrackRef> {
        self.selected_track.as_ref()
    }

    pub fn optimistic_update_in_progress(&self) -> bool {
        self.optimistic_update_in_progress
    }

    pub fn state(&self) -> ClientPlaybackState {
        ClientPlaybackState {
            is_playing: self.is_playing,
            selected_track: self.selected_track.clone(),
            optimistic_update_in_progress: self.optimistic_update_in_progress,
        }
    }

    fn begin_optimistic(&mut self) {
        self.optimistic_update_in_progress = true;
        self.optimistic_since = Some(self.clock.now());
        self.optimistic_failed = false;
    }

    fn clear_optimistic(&mut self) {
        self.optimistic_update_in_progress = false;
        self.optimistic_since = None;
        self.optimistic_failed = false;
    }

    fn optimistic_update_still_trusted(&self) -> bool {
        if self.optimistic_failed {
            return false;
        }
        match self.optimistic_since {
            Some(at) => since(self.clock.as_ref(), at) < self.confirmation_window,
            None => false,
        }
    }
}
