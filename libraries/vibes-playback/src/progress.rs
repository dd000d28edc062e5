//! Progress estimation between server samples
//!
//! The server reports a position only once per poll interval, far too
//! coarse for a progress bar. The estimator dead-reckons in between: every
//! tick while playing it advances the estimate by the tick interval.
//!
//! Two rules keep the displayed position honest:
//! - A sample for the same track that is *behind* the estimate is not
//!   adopted; extrapolation is held instead until a sample catches up, so the
//!   display never jumps backwards.
//! - For one grace window after a local seek or track change, samples are
//!   ignored entirely since they may still describe the pre-change state.

use crate::clock::{since, SharedClock};
use crate::command::RemoteCommand;
use crate::types::{ClientProgressState, PlaybackConfig};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// What happened to a server sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleOutcome {
    /// The sample became the new baseline
    Adopted,
    /// The sample was behind the estimate; extrapolation is now held
    Suppressed,
    /// A local seek/track change is still settling; the sample was ignored
    Settling,
}

/// Owns the continuously advancing position estimate
pub struct ProgressEstimator {
    clock: SharedClock,
    tick_interval: Duration,
    manual_update_grace: Duration,

    estimated_position_ms: u64,
    last_server_sync_at: Instant,
    last_manual_seek_at: Option<Instant>,
    suppressed: bool,
}

impl ProgressEstimator {
    /// Create an estimator at position 0
    pub fn new(config: &PlaybackConfig, clock: SharedClock) -> Self {
        let now = clock.now();
        Self {
            clock,
            tick_interval: config.tick_interval,
            manual_update_grace: config.manual_update_grace,
            estimated_position_ms: 0,
            last_server_sync_at: now,
            last_manual_seek_at: None,
            suppressed: false,
        }
    }

    /// Feed a server position sample
    ///
    /// `selected_track_in_sync` tells whether the sample is for the track the
    /// client currently shows; only then is a smaller value considered stale.
    pub fn on_server_sample(
        &mut self,
        server_position_ms: u64,
        selected_track_in_sync: bool,
    ) -> SampleOutcome {
        if selected_track_in_sync && server_position_ms < self.estimated_position_ms {
            if !self.suppressed {
                debug!(
                    server_position_ms,
                    estimated_position_ms = self.estimated_position_ms,
                    "Server behind estimate, holding extrapolation"
                );
            }
            self.suppressed = true;
            return SampleOutcome::Suppressed;
        }

        if self.suppressed {
            debug!(server_position_ms, "Server caught up, resuming extrapolation");
            self.suppressed = false;
        }

        if let Some(seek_at) = self.last_manual_seek_at {
            if since(self.clock.as_ref(), seek_at) < self.manual_update_grace {
                trace!(server_position_ms, "Ignoring sample inside manual update grace window");
                return SampleOutcome::Settling;
            }
        }

        self.estimated_position_ms = server_position_ms;
        self.last_server_sync_at = self.clock.now();
        SampleOutcome::Adopted
    }

    /// Advance the estimate by one tick interval if extrapolation applies
    ///
    /// Returns whether the estimate moved.
    pub fn tick(&mut self, is_playing: bool) -> bool {
        if !is_playing || self.suppressed {
            return false;
        }

        // A fresh sample already covers this interval
        if since(self.clock.as_ref(), self.last_server_sync_at) < self.tick_interval {
            return false;
        }

        self.estimated_position_ms = self
            .estimated_position_ms
            .saturating_add(self.tick_interval.as_millis() as u64);
        true
    }

    /// Jump to a position locally and return the seek to send
    pub fn seek_to(&mut self, position_ms: u64) -> RemoteCommand {
        self.set_progress_ms(position_ms);
        self.mark_manual_update(self.clock.now());
        RemoteCommand::Seek { position_ms }
    }

    /// Override the estimate (used on track changes)
    pub fn set_progress_ms(&mut self, position_ms: u64) {
        self.estimated_position_ms = position_ms;
    }

    /// Record a local position override at `at`
    pub fn mark_manual_update(&mut self, at: Instant) {
        self.last_manual_seek_at = Some(at);
    }

    /// Current time on the estimator's clock
    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    pub fn position_ms(&self) -> u64 {
        self.estimated_position_ms
    }

    pub fn is_suppressed(&self) -> bool {
        self.suppressed
    }

    /// Percentage of `duration_ms` elapsed, see [`normalized_progress`]
    pub fn normalized_progress(&self, duration_ms: u64) -> f64 {
        normalized_progress(self.estimated_position_ms, duration_ms)
    }

    pub fn state(&self) -> ClientProgressState {
        ClientProgressState {
            estimated_position_ms: self.estimated_position_ms,
            last_server_sync_at: self.last_server_sync_at,
            last_manual_seek_at: self.last_manual_seek_at,
            suppress_extrapolation_until_server_catches_up: self.suppressed,
        }
    }
}

/// Percentage of `duration_ms` that `position_ms` covers, two decimals, capped at 100
pub fn normalized_progress(position_ms: u64, duration_ms: u64) -> f64 {
    if duration_ms == 0 {
        return 0.0;
    }
    let percent = 100.0 * position_ms as f64 / duration_ms as f64;
    ((percent * 100.0).round() / 100.0).min(100.0)
}
