//! Remote commands and their dispatcher
//!
//! The stores never talk to the remote service themselves: every local
//! action returns a [`RemoteCommand`] which the session hands to a
//! [`CommandDispatcher`]. The dispatcher runs one command at a time and,
//! when a burst of commands queued up behind an in-flight one, keeps only
//! the latest of each kind.

use crate::error::{PlaybackError, Result};
use crate::remote::RemotePlaybackApi;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// A command for the remote playback service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCommand {
    /// Pause the current track
    Pause,

    /// Resume the selected track at a position
    Resume {
        context_uri: String,
        track_uri: String,
        position_ms: u64,
    },

    /// Start a different track from its beginning
    PlayFromStart {
        context_uri: String,
        track_uri: String,
    },

    /// Move the play head
    Seek { position_ms: u64 },
}

/// Commands of the same kind supersede each other
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    /// Play/pause/track selection
    Transport,
    /// Position changes
    Seek,
}

impl RemoteCommand {
    pub fn kind(&self) -> CommandKind {
        match self {
            RemoteCommand::Pause
            | RemoteCommand::Resume { .. }
            | RemoteCommand::PlayFromStart { .. } => CommandKind::Transport,
            RemoteCommand::Seek { .. } => CommandKind::Seek,
        }
    }

    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            RemoteCommand::Pause => "pause",
            RemoteCommand::Resume { .. } => "resume",
            RemoteCommand::PlayFromStart { .. } => "play_from_start",
            RemoteCommand::Seek { .. } => "seek",
        }
    }

    /// Execute against the remote service
    pub async fn execute(&self, api: &dyn RemotePlaybackApi) -> Result<()> {
        match self {
            RemoteCommand::Pause => api.pause().await,
            RemoteCommand::Resume {
                context_uri,
                track_uri,
                position_ms,
            } => api.resume(context_uri, track_uri, *position_ms).await,
            RemoteCommand::PlayFromStart {
                context_uri,
                track_uri,
            } => api.play_from_start(context_uri, track_uri).await,
            RemoteCommand::Seek { position_ms } => api.seek(*position_ms).await,
        }
    }
}

/// Reply channel for the caller that issued a command
pub type CommandReply = oneshot::Sender<Result<()>>;

/// A command waiting for the dispatcher
#[derive(Debug)]
pub struct QueuedCommand {
    pub command: RemoteCommand,
    pub reply: Option<CommandReply>,
}

/// Outcome of coalescing a batch
#[derive(Debug)]
pub struct Coalesced {
    /// Commands to execute, in order
    pub run: Vec<QueuedCommand>,
    /// Commands overtaken by a later command of the same kind
    pub superseded: Vec<QueuedCommand>,
}

/// Keep only the latest command of each kind, preserving order
///
/// A trailing `Pause` does not carry a track, so the latest track switch
/// queued before it is kept and runs first.
pub fn coalesce(batch: Vec<QueuedCommand>) -> Coalesced {
    let last_transport = batch
        .iter()
        .rposition(|q| q.command.kind() == CommandKind::Transport);
    let last_seek = batch
        .iter()
        .rposition(|q| q.command.kind() == CommandKind::Seek);
    let pending_switch = match last_transport {
        Some(index) if batch[index].command == RemoteCommand::Pause => batch[..index]
            .iter()
            .rposition(|q| matches!(q.command, RemoteCommand::PlayFromStart { .. })),
        _ => None,
    };

    let mut run = Vec::new();
    let mut superseded = Vec::new();
    for (index, queued) in batch.into_iter().enumerate() {
        let keep = match queued.command.kind() {
            CommandKind::Transport => {
                Some(index) == last_transport || Some(index) == pending_switch
            }
            CommandKind::Seek => Some(index) == last_seek,
        };
        if keep {
            run.push(queued);
        } else {
            superseded.push(queued);
        }
    }

    Coalesced { run, superseded }
}

/// Failure report sent back to the session
#[derive(Debug, Clone)]
pub struct CommandFailure {
    pub command: RemoteCommand,
    pub error: PlaybackError,
}

/// Serializes remote commands onto the playback service
pub struct CommandDispatcher {
    api: Arc<dyn RemotePlaybackApi>,
    inbox: mpsc::UnboundedReceiver<QueuedCommand>,
    failures: mpsc::UnboundedSender<CommandFailure>,
    cancel: CancellationToken,
}

impl CommandDispatcher {
    pub fn new(
        api: Arc<dyn RemotePlaybackApi>,
        inbox: mpsc::UnboundedReceiver<QueuedCommand>,
        failures: mpsc::UnboundedSender<CommandFailure>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            api,
            inbox,
            failures,
            cancel,
        }
    }

    /// Run until cancelled or every sender is gone
    pub async fn run(mut self) {
        loop {
            let first = tokio::select! {
                () = self.cancel.cancelled() => break,
                next = self.inbox.recv() => match next {
                    Some(queued) => queued,
                    None => break,
                },
            };

            let mut batch = vec![first];
            while let Ok(queued) = self.inbox.try_recv() {
                batch.push(queued);
            }

            let Coalesced { run, superseded } = coalesce(batch);
            for queued in superseded {
                debug!(command = queued.command.name(), "Command superseded by a later one");
                if let Some(reply) = queued.reply {
                    let _ = reply.send(Ok(()));
                }
            }

            for queued in run {
                let result = tokio::select! {
                    () = self.cancel.cancelled() => return,
                    result = queued.command.execute(self.api.as_ref()) => result,
                };

                match &result {
                    Ok(()) => debug!(command = queued.command.name(), "Remote command applied"),
                    Err(e) => {
                        warn!(command = queued.command.name(), error = %e, "Remote command failed");
                        let _ = self.failures.send(CommandFailure {
                            command: queued.command.clone(),
                            error: e.clone(),
                        });
                    }
                }

                if let Some(reply) = queued.reply {
                    let _ = reply.send(result);
                }
            }
        }

        debug!("Command dispatcher stopped");
    }
}
