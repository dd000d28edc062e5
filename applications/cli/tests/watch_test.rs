//! Tests for the interactive watch loop
//!
//! Sessions run against an in-memory playback service on a paused tokio
//! clock; input comes from byte buffers or an in-memory duplex pipe.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncWriteExt, BufReader};
use vibes_cli::config::{PlaybackSettings, PlaylistSettings, SpotifySettings};
use vibes_cli::{CliConfig, LineOutcome, WatchApp};
use vibes_playback::{
    PlaybackError, PlaybackSnapshot, Playlist, RemotePlaybackApi, Result, TrackRef,
};

// ============================================================================
// Test Infrastructure
// ============================================================================

fn track(id: &str, name: &str) -> TrackRef {
    TrackRef {
        id: id.to_string(),
        uri: format!("spotify:track:{}", id),
        name: name.to_string(),
        artists: vec![],
        duration_ms: 120_000,
        album_art_url: String::new(),
    }
}

fn playlist() -> Playlist {
    Playlist {
        id: "p".to_string(),
        uri: "spotify:playlist:p".to_string(),
        name: "Road Trip".to_string(),
        tracks: vec![track("a", "First"), track("b", "Second")],
    }
}

fn config() -> CliConfig {
    CliConfig {
        spotify: SpotifySettings::default(),
        playback: PlaybackSettings::default(),
        playlist: PlaylistSettings::default(),
    }
}

/// Playback service that applies commands instantly
struct FakeRemote {
    tracks: Vec<TrackRef>,
    snapshot: Mutex<PlaybackSnapshot>,
    calls: Mutex<Vec<String>>,
    failing: bool,
}

impl FakeRemote {
    fn new(failing: bool) -> Arc<Self> {
        Arc::new(Self {
            tracks: playlist().tracks,
            snapshot: Mutex::new(PlaybackSnapshot::idle()),
            calls: Mutex::new(Vec::new()),
            failing,
        })
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        if self.failing {
            return Err(PlaybackError::Remote("device unavailable".to_string()));
        }
        Ok(())
    }

    fn start(&self, context_uri: &str, track_uri: &str, position_ms: u64) {
        let mut snapshot = self.snapshot.lock().unwrap();
        snapshot.selected_track = self.tracks.iter().find(|t| t.uri == track_uri).cloned();
        snapshot.is_playing = true;
        snapshot.position_ms = position_ms;
        snapshot.context_uri = context_uri.to_string();
    }
}

#[async_trait]
impl RemotePlaybackApi for FakeRemote {
    async fn pause(&self) -> Result<()> {
        self.record("pause".to_string())?;
        self.snapshot.lock().unwrap().is_playing = false;
        Ok(())
    }

    async fn resume(&self, context_uri: &str, track_uri: &str, position_ms: u64) -> Result<()> {
        self.record(format!("resume {}", track_uri))?;
        self.start(context_uri, track_uri, position_ms);
        Ok(())
    }

    async fn play_from_start(&self, context_uri: &str, track_uri: &str) -> Result<()> {
        self.record(format!("play {}", track_uri))?;
        self.start(context_uri, track_uri, 0);
        Ok(())
    }

    async fn seek(&self, position_ms: u64) -> Result<()> {
        self.record(format!("seek {}", position_ms))?;
        self.snapshot.lock().unwrap().position_ms = position_ms;
        Ok(())
    }

    async fn current_playback(&self) -> Result<PlaybackSnapshot> {
        Ok(self.snapshot.lock().unwrap().clone())
    }
}

fn start_app(remote: &Arc<FakeRemote>) -> WatchApp {
    WatchApp::start(remote.clone(), playlist(), &config()).unwrap()
}

// ============================================================================
// Line Handling
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_list_prints_playlist() {
    let remote = FakeRemote::new(false);
    let app = start_app(&remote);

    let LineOutcome::Print(text) = app.handle_line("l") else {
        panic!("expected listing");
    };
    assert!(text.starts_with("Road Trip (2 tracks)"));
    assert!(text.contains("1. First"));
    assert!(text.contains("2. Second"));

    app.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_track_out_of_range_reported() {
    let remote = FakeRemote::new(false);
    let app = start_app(&remote);

    assert_eq!(
        app.handle_line("p 5"),
        LineOutcome::Print("Track 5 is not in the playlist (1-2)".to_string())
    );
    assert!(remote.calls().is_empty());

    app.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_unknown_input_shows_help() {
    let remote = FakeRemote::new(false);
    let app = start_app(&remote);

    let LineOutcome::Print(text) = app.handle_line("dance") else {
        panic!("expected help");
    };
    assert!(text.contains("Unknown command: dance"));
    assert!(text.contains(vibes_cli::HELP));
    assert_eq!(app.handle_line(""), LineOutcome::Continue);
    assert_eq!(app.handle_line("q"), LineOutcome::Quit);

    app.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_play_track_updates_view_immediately() {
    let remote = FakeRemote::new(false);
    let app = start_app(&remote);
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert_eq!(app.handle_line("p 2"), LineOutcome::Continue);
    tokio::time::sleep(Duration::from_millis(10)).await;

    let view = app.view();
    assert!(view.is_selected_track("b"));
    assert!(view.playback.is_playing);
    assert_eq!(remote.calls(), vec!["play spotify:track:b".to_string()]);

    app.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_seek_is_forwarded() {
    let remote = FakeRemote::new(false);
    let app = start_app(&remote);
    tokio::time::sleep(Duration::from_millis(10)).await;

    app.handle_line("p 1");
    tokio::time::sleep(Duration::from_millis(10)).await;
    app.handle_line("s 42");
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert_eq!(
        remote.calls(),
        vec!["play spotify:track:a".to_string(), "seek 42000".to_string()]
    );
    assert!(app.view().progress.estimated_position_ms >= 42_000);

    app.shutdown().await;
}

// ============================================================================
// Run Loop
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_run_prints_listing_and_status() {
    let remote = FakeRemote::new(false);
    let mut app = start_app(&remote);
    let mut out = Vec::new();

    app.run(BufReader::new(&b"l\nq\n"[..]), &mut out)
        .await
        .unwrap();
    app.shutdown().await;

    let out = String::from_utf8(out).unwrap();
    assert!(out.starts_with("Road Trip (2 tracks)"));
    assert!(out.contains(vibes_cli::HELP));
    assert!(out.contains("■ Nothing playing"));
}

#[tokio::test(start_paused = true)]
async fn test_run_ends_at_end_of_input() {
    let remote = FakeRemote::new(false);
    let mut app = start_app(&remote);
    let mut out = Vec::new();

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        app.run(BufReader::new(&b""[..]), &mut out),
    )
    .await;
    assert!(matches!(result, Ok(Ok(()))));

    app.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_failed_command_becomes_notice() {
    let remote = FakeRemote::new(true);
    let mut app = start_app(&remote);
    let (reader, mut writer) = tokio::io::duplex(64);

    tokio::spawn(async move {
        writer.write_all(b"p 1\n").await.unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;
        writer.write_all(b"q\n").await.unwrap();
    });

    let mut out = Vec::new();
    app.run(BufReader::new(reader), &mut out).await.unwrap();
    app.shutdown().await;

    let out = String::from_utf8(out).unwrap();
    assert!(out.contains("! command failed: Remote playback service error: device unavailable"));
    assert_eq!(remote.calls(), vec!["play spotify:track:a".to_string()]);
}
