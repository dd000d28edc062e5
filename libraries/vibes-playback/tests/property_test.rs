//! Property-based tests for the playback stores
//!
//! Uses proptest to check the stores against arbitrary interleavings of
//! ticks, server samples and local commands.

use proptest::prelude::*;
use std::sync::Arc;
use vibes_playback::{
    ManualClock, PlaybackConfig, PlaybackReconciler, PlaybackSnapshot, ProgressEstimator,
    SharedClock, SnapshotOutcome, TrackRef,
};

const CONTEXT: &str = "spotify:playlist:p";

// ===== Helpers =====

fn track(id: &str) -> TrackRef {
    TrackRef {
        id: id.to_string(),
        uri: format!("spotify:track:{}", id),
        name: format!("Track {}", id),
        artists: vec![],
        duration_ms: 240_000,
        album_art_url: String::new(),
    }
}

fn arbitrary_snapshot() -> impl Strategy<Value = PlaybackSnapshot> {
    (
        proptest::option::of(prop::sample::select(vec!["a", "b", "c"])),
        any::<bool>(),
        0u64..240_000,
    )
        .prop_map(|(id, is_playing, position_ms)| PlaybackSnapshot {
            is_playing: is_playing && id.is_some(),
            position_ms,
            selected_track: id.map(track),
            context_uri: CONTEXT.to_string(),
        })
}

/// Something that can happen to a playing view
#[derive(Debug, Clone)]
enum Event {
    /// Wall time passes by this many ticks
    Ticks(u8),
    /// Server reports this position for the shown track
    Sample(u64),
}

fn arbitrary_events() -> impl Strategy<Value = Vec<Event>> {
    prop::collection::vec(
        prop_oneof![
            (1u8..12).prop_map(Event::Ticks),
            (0u64..200_000).prop_map(Event::Sample),
        ],
        1..60,
    )
}

/// Local command issued before the server settles
#[derive(Debug, Clone)]
enum Click {
    Toggle,
    Play(&'static str),
}

fn arbitrary_clicks() -> impl Strategy<Value = Vec<Click>> {
    prop::collection::vec(
        prop_oneof![
            Just(Click::Toggle),
            prop::sample::select(vec!["a", "b", "c"]).prop_map(Click::Play),
        ],
        0..8,
    )
}

fn stores(clock: &ManualClock) -> (PlaybackReconciler, ProgressEstimator) {
    let shared: SharedClock = Arc::new(clock.clone());
    let config = PlaybackConfig::default();
    (
        PlaybackReconciler::new(CONTEXT, &config, shared.clone()),
        ProgressEstimator::new(&config, shared),
    )
}

// ===== Property Tests =====

proptest! {
    /// Property: while playing without local seeks, the displayed position never moves backwards
    #[test]
    fn estimate_never_moves_backwards(start in 0u64..100_000, events in arbitrary_events()) {
        let clock = ManualClock::new();
        let (_, mut progress) = stores(&clock);
        progress.on_server_sample(start, true);

        let mut last = progress.position_ms();
        for event in events {
            match event {
                Event::Ticks(n) => {
                    for _ in 0..n {
                        clock.advance_ms(250);
                        progress.tick(true);
                    }
                }
                Event::Sample(position_ms) => {
                    progress.on_server_sample(position_ms, true);
                }
            }

            let now = progress.position_ms();
            prop_assert!(now >= last, "estimate went from {} to {}", last, now);
            last = now;
        }
    }

    /// Property: once the server settles, the client view converges to it
    #[test]
    fn client_converges_to_stable_server(
        history in prop::collection::vec(arbitrary_snapshot(), 0..10),
        clicks in arbitrary_clicks(),
        stable in arbitrary_snapshot(),
    ) {
        let clock = ManualClock::new();
        let (mut reconciler, mut progress) = stores(&clock);

        for snapshot in &history {
            clock.advance_ms(2000);
            reconciler.on_server_snapshot(snapshot);
        }
        for click in clicks {
            let target = match click {
                Click::Toggle => None,
                Click::Play(id) => Some(track(id)),
            };
            // no track to toggle is fine here
            let _ = reconciler.play_pause(target, &mut progress);
        }

        // long enough for any pending optimistic update to lapse
        for _ in 0..4 {
            clock.advance_ms(2000);
            reconciler.on_server_snapshot(&stable);
        }

        let state = reconciler.state();
        prop_assert_eq!(state.is_playing, stable.is_playing);
        prop_assert_eq!(state.selected_track, stable.selected_track.clone());
        prop_assert!(!state.optimistic_update_in_progress);
    }

    /// Property: a snapshot of the pre-click state never undoes the click
    #[test]
    fn click_survives_pre_click_snapshot(
        before in arbitrary_snapshot(),
        target in proptest::option::of(prop::sample::select(vec!["a", "b", "c"])),
    ) {
        let clock = ManualClock::new();
        let (mut reconciler, mut progress) = stores(&clock);
        reconciler.on_server_snapshot(&before);

        if reconciler.play_pause(target.map(track), &mut progress).is_ok() {
            let after_click = reconciler.state();
            let outcome = reconciler.on_server_snapshot(&before);

            prop_assert_eq!(outcome, SnapshotOutcome::Deferred);
            prop_assert_eq!(reconciler.state(), after_click);
        }
    }

    /// Property: normalized progress stays within 0..=100
    #[test]
    fn normalized_progress_bounded(position in any::<u32>(), duration in 0u64..1_000_000) {
        let clock = ManualClock::new();
        let (_, mut progress) = stores(&clock);
        progress.set_progress_ms(u64::from(position));

        let percent = progress.normalized_progress(duration);
        prop_assert!((0.0..=100.0).contains(&percent));
    }
}
