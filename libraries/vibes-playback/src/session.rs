//! Playback session - one mounted playback view
//!
//! A session owns one [`PlaybackReconciler`] and one [`ProgressEstimator`]
//! inside a single actor task, so each store has exactly one writer and no
//! locks are needed. The actor reacts to four inputs:
//! - snapshots from the polling source (every poll interval)
//! - ticks from the scheduler (every tick interval)
//! - user commands from [`SessionHandle`]
//! - failure reports from the command dispatcher
//!
//! After every input it publishes a fresh [`PlaybackView`]. Remote commands
//! run on a separate dispatcher task and are never awaited by the actor.
//! Shutting down cancels both timers and the dispatcher; anything that
//! completes afterwards has nobody left to report to.

use crate::clock::{SharedClock, SystemClock};
use crate::command::{
    CommandDispatcher, CommandFailure, CommandKind, CommandReply, QueuedCommand, RemoteCommand,
};
use crate::error::{PlaybackError, Result};
use crate::polling::{PollState, PollingSource};
use crate::progress::{ProgressEstimator, SampleOutcome};
use crate::reconciler::{PlaybackReconciler, SnapshotOutcome};
use crate::remote::RemotePlaybackApi;
use crate::scheduler::{register_interval, IntervalHandle};
use crate::types::{PlaybackConfig, PlaybackSnapshot, PlaybackView, TrackRef};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

/// Capacity of the session inbox; ticks are dropped rather than queued past it
const INBOX_CAPACITY: usize = 64;

enum SessionMessage {
    Tick,
    PlayPause {
        track: Option<TrackRef>,
        reply: CommandReply,
    },
    SeekTo {
        position_ms: u64,
        reply: CommandReply,
    },
}

/// Entry point for mounting a playback view
pub struct PlaybackSession;

impl PlaybackSession {
    /// Start a session playing within `context_uri`
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(
        api: Arc<dyn RemotePlaybackApi>,
        context_uri: impl Into<String>,
        config: PlaybackConfig,
    ) -> Result<SessionHandle> {
        Self::start_with_clock(api, context_uri, config, Arc::new(SystemClock))
    }

    /// Start a session reading time from `clock`
    pub fn start_with_clock(
        api: Arc<dyn RemotePlaybackApi>,
        context_uri: impl Into<String>,
        config: PlaybackConfig,
        clock: SharedClock,
    ) -> Result<SessionHandle> {
        validate(&config)?;
        let context_uri = context_uri.into();

        let reconciler = PlaybackReconciler::new(context_uri.clone(), &config, clock.clone());
        let progress = ProgressEstimator::new(&config, clock);
        let (view_tx, view_rx) = watch::channel(PlaybackView {
            playback: reconciler.state(),
            progress: progress.state(),
        });

        let cancel = CancellationToken::new();

        let (dispatch_tx, dispatch_rx) = mpsc::unbounded_channel();
        let (failure_tx, failure_rx) = mpsc::unbounded_channel();
        let dispatcher =
            CommandDispatcher::new(api.clone(), dispatch_rx, failure_tx, cancel.clone());
        let dispatcher_task = tokio::spawn(dispatcher.run());

        let poll_api = api;
        let snapshots = PollingSource::spawn("playback", config.poll_interval, move || {
            let api = poll_api.clone();
            async move { api.current_playback().await }
        });

        let (inbox_tx, inbox_rx) = mpsc::channel(INBOX_CAPACITY);
        let tick_tx = inbox_tx.clone();
        let ticker = register_interval(config.tick_interval, move || {
            send_tick(&tick_tx);
        });

        let actor = SessionActor {
            reconciler,
            progress,
            view_tx,
            dispatch: dispatch_tx,
        };
        let actor_task = tokio::spawn(actor.run(
            inbox_rx,
            failure_rx,
            snapshots,
            ticker,
            cancel.clone(),
        ));

        info!(
            context_uri = %context_uri,
            poll_interval_ms = config.poll_interval.as_millis() as u64,
            tick_interval_ms = config.tick_interval.as_millis() as u64,
            "Playback session started"
        );

        Ok(SessionHandle {
            controller: SessionController {
                inbox: inbox_tx,
                cancel: cancel.clone(),
            },
            view: view_rx,
            cancel,
            tasks: vec![actor_task, dispatcher_task],
        })
    }
}

/// Queue a tick without waiting; returns false if it was dropped
fn send_tick(inbox: &mpsc::Sender<SessionMessage>) -> bool {
    match inbox.try_send(SessionMessage::Tick) {
        Ok(()) => true,
        Err(e) => {
            // full inbox: the estimate lags until the next sample
            trace!(error = %e, "Tick dropped");
            false
        }
    }
}

fn validate(config: &PlaybackConfig) -> Result<()> {
    if config.poll_interval.is_zero() {
        return Err(PlaybackError::InvalidConfig(
            "poll interval must be greater than zero".to_string(),
        ));
    }
    if config.tick_interval.is_zero() {
        return Err(PlaybackError::InvalidConfig(
            "tick interval must be greater than zero".to_string(),
        ));
    }
    if config.tick_interval > config.poll_interval {
        return Err(PlaybackError::InvalidConfig(format!(
            "tick interval {:?} is longer than poll interval {:?}",
            config.tick_interval, config.poll_interval
        )));
    }
    Ok(())
}

/// Cloneable sender of user commands to a running session
///
/// Does not keep the session alive; once the owning [`SessionHandle`] is
/// dropped or shut down every call fails with `SessionClosed`.
#[derive(Clone)]
pub struct SessionController {
    inbox: mpsc::Sender<SessionMessage>,
    cancel: CancellationToken,
}

impl SessionController {
    /// Play or pause `track`, or the selected track when `None`
    ///
    /// The view reflects the change before the remote command is sent; the
    /// returned future resolves once the remote service answered.
    pub async fn play_pause(&self, track: Option<TrackRef>) -> Result<()> {
        let (reply, response) = oneshot::channel();
        self.send(SessionMessage::PlayPause { track, reply }).await?;
        response.await.map_err(|_| PlaybackError::SessionClosed)?
    }

    /// Seek within the selected track
    ///
    /// Positions past the end of the selected track are clamped to its duration.
    pub async fn seek_to(&self, position_ms: u64) -> Result<()> {
        let (reply, response) = oneshot::channel();
        self.send(SessionMessage::SeekTo { position_ms, reply })
            .await?;
        response.await.map_err(|_| PlaybackError::SessionClosed)?
    }

    async fn send(&self, message: SessionMessage) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(PlaybackError::SessionClosed);
        }
        self.inbox
            .send(message)
            .await
            .map_err(|_| PlaybackError::SessionClosed)
    }
}

/// Handle to a running session
///
/// Dropping the handle tears the session down.
pub struct SessionHandle {
    controller: SessionController,
    view: watch::Receiver<PlaybackView>,
    cancel: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl SessionHandle {
    /// See [`SessionController::play_pause`]
    pub async fn play_pause(&self, track: Option<TrackRef>) -> Result<()> {
        self.controller.play_pause(track).await
    }

    /// See [`SessionController::seek_to`]
    pub async fn seek_to(&self, position_ms: u64) -> Result<()> {
        self.controller.seek_to(position_ms).await
    }

    /// Command sender that can be moved into other tasks
    pub fn controller(&self) -> SessionController {
        self.controller.clone()
    }

    pub fn is_selected_track(&self, id: &str) -> bool {
        self.view.borrow().is_selected_track(id)
    }

    /// Latest published view
    pub fn view(&self) -> PlaybackView {
        self.view.borrow().clone()
    }

    /// Receiver notified whenever the view changes
    pub fn subscribe(&self) -> watch::Receiver<PlaybackView> {
        self.view.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Stop timers, polling and the dispatcher, and wait for them to finish
    pub async fn shutdown(&mut self) {
        self.cancel.cancel();
        for task in self.tasks.drain(..) {
            if let Err(e) = task.await {
                warn!(error = %e, "Session task ended abnormally");
            }
        }
        info!("Playback session stopped");
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

struct SessionActor {
    reconciler: PlaybackReconciler,
    progress: ProgressEstimator,
    view_tx: watch::Sender<PlaybackView>,
    dispatch: mpsc::UnboundedSender<QueuedCommand>,
}

impl SessionActor {
    async fn run(
        mut self,
        mut inbox: mpsc::Receiver<SessionMessage>,
        mut failures: mpsc::UnboundedReceiver<CommandFailure>,
        snapshots: PollingSource<PlaybackSnapshot>,
        ticker: IntervalHandle,
        cancel: CancellationToken,
    ) {
        let mut snapshot_rx = snapshots.subscribe();

        loop {
            tokio::select! {
                () = cancel.cancelled() => break,
                changed = snapshot_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let state = snapshot_rx.borrow_and_update().clone();
                    self.on_poll(state);
                }
                Some(message) = inbox.recv() => self.on_message(message),
                Some(failure) = failures.recv() => self.on_failure(&failure),
            }
            self.publish();
        }

        ticker.cancel();
        snapshots.stop();
        debug!("Session actor stopped");
    }

    fn on_poll(&mut self, state: PollState<PlaybackSnapshot>) {
        match state {
            PollState::Loading => {}
            PollState::Ready(snapshot) => self.on_snapshot(&snapshot),
            PollState::Failed { error, .. } => {
                debug!(error = %error, "Playback poll failed, keeping client view");
            }
        }
    }

    fn on_snapshot(&mut self, snapshot: &PlaybackSnapshot) {
        // compared against the client view as it was before reconciling
        let track_in_sync = self.reconciler.selected_track_in_sync(snapshot);
        let outcome = self.reconciler.on_server_snapshot(snapshot);

        // a deferred snapshot for another track says nothing about the shown track's position
        if outcome == SnapshotOutcome::Deferred && !track_in_sync {
            trace!("Skipping position sample for a track the client is not showing");
            return;
        }

        let sample = self.progress.on_server_sample(snapshot.position_ms, track_in_sync);
        trace!(
            ?outcome,
            ?sample,
            server_position_ms = snapshot.position_ms,
            estimated_position_ms = self.progress.position_ms(),
            "Snapshot applied"
        );
        if sample == SampleOutcome::Suppressed {
            debug!(
                server_position_ms = snapshot.position_ms,
                "Server position behind client estimate"
            );
        }
    }

    fn on_message(&mut self, message: SessionMessage) {
        match message {
            SessionMessage::Tick => {
                self.progress.tick(self.reconciler.is_playing());
            }
            SessionMessage::PlayPause { track, reply } => {
                match self.reconciler.play_pause(track, &mut self.progress) {
                    Ok(command) => self.dispatch(command, reply),
                    Err(e) => {
                        debug!(error = %e, "Rejected play/pause");
                        let _ = reply.send(Err(e));
                    }
                }
            }
            SessionMessage::SeekTo { position_ms, reply } => {
                let position_ms = match self.reconciler.selected_track() {
                    Some(track) if track.duration_ms > 0 => position_ms.min(track.duration_ms),
                    _ => position_ms,
                };
                let command = self.progress.seek_to(position_ms);
                self.dispatch(command, reply);
            }
        }
    }

    fn on_failure(&mut self, failure: &CommandFailure) {
        if failure.command.kind() == CommandKind::Transport {
            self.reconciler.on_command_failed();
        }
        debug!(
            command = failure.command.name(),
            error = %failure.error,
            "Waiting for next snapshot to correct the client view"
        );
    }

    fn dispatch(&self, command: RemoteCommand, reply: CommandReply) {
        let queued = QueuedCommand {
            command,
            reply: Some(reply),
        };
        if let Err(mpsc::error::SendError(queued)) = self.dispatch.send(queued) {
            if let Some(reply) = queued.reply {
                let _ = reply.send(Err(PlaybackError::SessionClosed));
            }
        }
    }

    fn publish(&self) {
        let next = PlaybackView {
            playback: self.reconciler.state(),
            progress: self.progress.state(),
        };
        self.view_tx.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }
}
