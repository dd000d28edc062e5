/// Terminal rendering of the playback view
use chrono::{DateTime, Local, Utc};
use vibes_playback::{normalized_progress, PlaybackSnapshot, PlaybackView, Playlist, TrackRef};

/// Format milliseconds as `mm:ss` (minutes keep growing past an hour)
pub fn format_mm_ss(ms: u64) -> String {
    let total_secs = ms / 1000;
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}

fn play_symbol(is_playing: bool) -> &'static str {
    if is_playing {
        "▶"
    } else {
        "⏸"
    }
}

fn track_line(track: &TrackRef, is_playing: bool, position_ms: u64) -> String {
    let position_ms = position_ms.min(track.duration_ms);
    format!(
        "{} {} — {}  {} / {}  ({:.2}%)",
        play_symbol(is_playing),
        track.name,
        track.artist_names(),
        format_mm_ss(position_ms),
        format_mm_ss(track.duration_ms),
        normalized_progress(position_ms, track.duration_ms)
    )
}

/// Single status line for the current view
pub fn status_line(view: &PlaybackView) -> String {
    match &view.playback.selected_track {
        Some(track) => {
            let mut line = track_line(
                track,
                view.playback.is_playing,
                view.progress.estimated_position_ms,
            );
            if view.playback.optimistic_update_in_progress {
                line.push_str("  …");
            }
            line
        }
        None => "■ Nothing playing".to_string(),
    }
}

/// One-shot description of a server snapshot
pub fn snapshot_summary(snapshot: &PlaybackSnapshot, fetched_at: Option<DateTime<Utc>>) -> String {
    let mut out = match &snapshot.selected_track {
        Some(track) => track_line(track, snapshot.is_playing, snapshot.position_ms),
        None => "■ Nothing playing".to_string(),
    };
    if !snapshot.context_uri.is_empty() {
        out.push_str(&format!("\n  context: {}", snapshot.context_uri));
    }
    if let Some(at) = fetched_at {
        out.push_str(&format!(
            "\n  as of {}",
            at.with_timezone(&Local).format("%H:%M:%S")
        ));
    }
    out
}

/// Numbered track listing, marking the selected track
pub fn playlist_listing(playlist: &Playlist, selected_id: Option<&str>) -> String {
    let mut out = format!("{} ({} tracks)", playlist.name, playlist.tracks.len());
    for (i, track) in playlist.tracks.iter().enumerate() {
        let marker = if Some(track.id.as_str()) == selected_id {
            "▶"
        } else {
            " "
        };
        out.push_str(&format!(
            "\n{} {:>2}. {} — {}  {}",
            marker,
            i + 1,
            track.name,
            track.artist_names(),
            format_mm_ss(track.duration_ms)
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;
    use vibes_playback::{Artist, ClientPlaybackState, ClientProgressState};

    fn track(id: &str, name: &str, duration_ms: u64) -> TrackRef {
        TrackRef {
            id: id.to_string(),
            uri: format!("spotify:track:{}", id),
            name: name.to_string(),
            artists: vec![Artist {
                name: "Artist".to_string(),
                external_url: String::new(),
            }],
            duration_ms,
            album_art_url: String::new(),
        }
    }

    fn view(track: Option<TrackRef>, is_playing: bool, position_ms: u64) -> PlaybackView {
        PlaybackView {
            playback: ClientPlaybackState {
                is_playing,
                selected_track: track,
                optimistic_update_in_progress: false,
            },
            progress: ClientProgressState {
                estimated_position_ms: position_ms,
                last_server_sync_at: Instant::now(),
                last_manual_seek_at: None,
                suppress_extrapolation_until_server_catches_up: false,
            },
        }
    }

    #[test]
    fn test_format_mm_ss() {
        assert_eq!(format_mm_ss(0), "00:00");
        assert_eq!(format_mm_ss(83_999), "01:23");
        assert_eq!(format_mm_ss(225_000), "03:45");
        assert_eq!(format_mm_ss(3_723_000), "62:03");
    }

    #[test]
    fn test_status_line_playing() {
        let v = view(Some(track("a", "Track", 225_000)), true, 83_330);
        assert_eq!(status_line(&v), "▶ Track — Artist  01:23 / 03:45  (37.04%)");
    }

    #[test]
    fn test_status_line_paused_and_pending() {
        let mut v = view(Some(track("a", "Song", 60_000)), false, 30_000);
        v.playback.optimistic_update_in_progress = true;
        assert_eq!(status_line(&v), "⏸ Song — Artist  00:30 / 01:00  (50.00%)  …");
    }

    #[test]
    fn test_status_line_caps_overrun() {
        let v = view(Some(track("a", "Song", 60_000)), true, 61_000);
        assert_eq!(status_line(&v), "▶ Song — Artist  01:00 / 01:00  (100.00%)");
    }

    #[test]
    fn test_status_line_nothing_playing() {
        assert_eq!(status_line(&view(None, false, 0)), "■ Nothing playing");
    }

    #[test]
    fn test_playlist_listing_marks_selected() {
        let playlist = Playlist {
            id: "p".to_string(),
            uri: "spotify:playlist:p".to_string(),
            name: "Mix".to_string(),
            tracks: vec![track("a", "One", 61_000), track("b", "Two", 122_000)],
        };

        let listing = playlist_listing(&playlist, Some("b"));
        let lines: Vec<_> = listing.lines().collect();
        assert_eq!(lines[0], "Mix (2 tracks)");
        assert_eq!(lines[1], "   1. One — Artist  01:01");
        assert_eq!(lines[2], "▶  2. Two — Artist  02:02");
    }

    #[test]
    fn test_snapshot_summary_includes_context() {
        let snapshot = PlaybackSnapshot {
            is_playing: true,
            position_ms: 1000,
            selected_track: Some(track("a", "Song", 10_000)),
            context_uri: "spotify:playlist:p".to_string(),
        };

        let summary = snapshot_summary(&snapshot, None);
        assert!(summary.starts_with("▶ Song — Artist  00:01 / 00:10  (10.00%)"));
        assert!(summary.contains("context: spotify:playlist:p"));
    }
}
