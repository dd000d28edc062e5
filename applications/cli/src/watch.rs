//! Live playback view for one playlist
//!
//! Redraws a single status line whenever the session publishes a new view and
//! reads commands from stdin. Remote commands run on their own tasks so a slow
//! service never stalls the redraw loop; their failures come back as notices.

use crate::commands::{WatchCommand, HELP};
use crate::config::CliConfig;
use crate::error::{CliError, Result};
use crate::render::{playlist_listing, status_line};
use std::future::Future;
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use vibes_playback::{PlaybackSession, PlaybackView, Playlist, RemotePlaybackApi, SessionHandle};
use vibes_spotify_client::SpotifyClient;

const CLEAR_LINE: &str = "\r\x1b[2K";

/// What the loop should do after an input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    Continue,
    Print(String),
    Quit,
}

pub struct WatchApp {
    session: SessionHandle,
    playlist: Playlist,
    notice_tx: mpsc::UnboundedSender<String>,
    notices: mpsc::UnboundedReceiver<String>,
}

impl WatchApp {
    pub fn new(session: SessionHandle, playlist: Playlist) -> Self {
        let (notice_tx, notices) = mpsc::unbounded_channel();
        Self {
            session,
            playlist,
            notice_tx,
            notices,
        }
    }

    /// Start a session over `playlist` and wrap it
    pub fn start(
        api: Arc<dyn RemotePlaybackApi>,
        playlist: Playlist,
        config: &CliConfig,
    ) -> Result<Self> {
        let session = PlaybackSession::start(api, playlist.uri.clone(), config.playback_config())?;
        Ok(Self::new(session, playlist))
    }

    pub fn view(&self) -> PlaybackView {
        self.session.view()
    }

    /// Apply one line of user input
    pub fn handle_line(&self, line: &str) -> LineOutcome {
        let command = match WatchCommand::parse(line) {
            Ok(Some(command)) => command,
            Ok(None) => return LineOutcome::Continue,
            Err(e) => return LineOutcome::Print(format!("{}\n{}", e, HELP)),
        };
        debug!(?command, "Watch command");

        match command {
            WatchCommand::PlayPause => {
                let controller = self.session.controller();
                self.spawn_command(async move { controller.play_pause(None).await });
                LineOutcome::Continue
            }
            WatchCommand::PlayTrack(index) => {
                let Some(track) = self.playlist.tracks.get(index - 1).cloned() else {
                    let err = CliError::TrackOutOfRange {
                        index,
                        len: self.playlist.tracks.len(),
                    };
                    return LineOutcome::Print(err.to_string());
                };
                let controller = self.session.controller();
                self.spawn_command(async move { controller.play_pause(Some(track)).await });
                LineOutcome::Continue
            }
            WatchCommand::Seek { position_ms } => {
                let controller = self.session.controller();
                self.spawn_command(async move { controller.seek_to(position_ms).await });
                LineOutcome::Continue
            }
            WatchCommand::List => {
                let view = self.session.view();
                let selected = view.playback.selected_track.as_ref().map(|t| t.id.as_str());
                LineOutcome::Print(playlist_listing(&self.playlist, selected))
            }
            WatchCommand::Quit => LineOutcome::Quit,
        }
    }

    fn spawn_command<F>(&self, command: F)
    where
        F: Future<Output = vibes_playback::Result<()>> + Send + 'static,
    {
        let notices = self.notice_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = command.await {
                warn!(error = %e, "Playback command failed");
                // Receiver only goes away with the app
                let _ = notices.send(format!("command failed: {}", e));
            }
        });
    }

    /// Run until `q`, end of input or Ctrl-C
    pub async fn run<R, W>(&mut self, input: R, out: &mut W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let mut lines = input.lines();
        let mut view = self.session.subscribe();
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        let selected = self.session.view().playback.selected_track.map(|t| t.id);
        writeln!(out, "{}", playlist_listing(&self.playlist, selected.as_deref()))?;
        writeln!(out, "{}", HELP)?;
        let mut current = status_line(&view.borrow_and_update());
        redraw(out, &current)?;

        loop {
            tokio::select! {
                changed = view.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    current = status_line(&view.borrow_and_update());
                    redraw(out, &current)?;
                }
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        break;
                    };
                    match self.handle_line(&line) {
                        LineOutcome::Continue => {}
                        LineOutcome::Print(text) => {
                            writeln!(out, "{}{}", CLEAR_LINE, text)?;
                            redraw(out, &current)?;
                        }
                        LineOutcome::Quit => break,
                    }
                }
                Some(notice) = self.notices.recv() => {
                    writeln!(out, "{}! {}", CLEAR_LINE, notice)?;
                    redraw(out, &current)?;
                }
                _ = &mut ctrl_c => break,
            }
        }

        writeln!(out)?;
        Ok(())
    }

    pub async fn shutdown(mut self) {
        self.session.shutdown().await;
    }
}

fn redraw<W: Write>(out: &mut W, line: &str) -> Result<()> {
    write!(out, "{}{}", CLEAR_LINE, line)?;
    out.flush()?;
    Ok(())
}

/// `vibes watch`: mount a playlist and follow playback until the user quits
pub async fn run_watch(
    client: Arc<SpotifyClient>,
    config: &CliConfig,
    playlist_id: Option<String>,
) -> Result<()> {
    let profile = client.current_user().await?;
    info!(user = %profile.display_name(), "Signed in");
    if !profile.can_control_playback() {
        warn!("Playback control requires a Spotify Premium account; commands will likely fail");
    }

    let playlist_id = playlist_id
        .or_else(|| config.playlist.default_id.clone())
        .ok_or_else(|| {
            CliError::Config(
                "no playlist given (pass --playlist or set playlist.default_id)".to_string(),
            )
        })?;
    let playlist = client
        .playlist(&playlist_id, config.playlist.track_limit)
        .await?;
    info!(playlist = %playlist.name, tracks = playlist.tracks.len(), "Mounted playlist");

    let mut app = WatchApp::start(client, playlist, config)?;
    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    let result = app.run(stdin, &mut stdout).await;
    app.shutdown().await;
    result
}
