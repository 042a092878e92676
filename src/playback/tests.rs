use super::*;
use crate::engine::fake::{Call, FakeEngine};
use crate::engine::{EngineEvent, LoadError, TrackInfo};
use crate::seek::TrackRect;

/// A seek track 100 units wide, so pointer x maps to percent directly.
const TRACK: TrackRect = TrackRect {
    left: 0.0,
    width: 100.0,
};

fn ready_player(duration: f64) -> Player<FakeEngine> {
    let mut player = Player::new(FakeEngine::new());
    player.select_file("song.mp3", vec![1, 2, 3]);
    let ready = player.engine_mut().finish_load(duration);
    player.handle_engine_event(ready).unwrap();
    assert_eq!(player.phase(), Phase::Ready);
    player
}

fn playing_at(duration: f64, position: f64) -> Player<FakeEngine> {
    let mut player = ready_player(duration);
    player.play(Some(0.0));
    player.pump_engine_events().unwrap();
    player.engine_mut().position = position;
    player.on_frame();
    assert_eq!(player.phase(), Phase::Playing);
    player
}

fn seek_calls(player: &Player<FakeEngine>) -> Vec<f64> {
    player
        .engine()
        .calls
        .iter()
        .filter_map(|c| match c {
            Call::Seek(s) => Some(*s),
            _ => None,
        })
        .collect()
}

fn assert_ticker_matches_phase(player: &Player<FakeEngine>) {
    assert_eq!(
        player.ticker().is_running(),
        player.phase() == Phase::Playing,
        "ticker state disagrees with phase {:?}",
        player.phase()
    );
}

#[test]
fn idle_until_a_file_is_selected() {
    let player = Player::new(FakeEngine::new());
    let view = player.view();
    assert_eq!(view.phase, Phase::Idle);
    assert_eq!(view.position_text, "00:00");
    assert_eq!(view.duration_text, "00:00");
    assert_eq!(view.indicator_percent, 0.0);
    assert_eq!(view.title, None);
}

#[test]
fn duration_shows_sentinel_until_metadata_arrives() {
    let mut player = Player::new(FakeEngine::new());
    player.select_file("long.flac", vec![0]);
    assert_eq!(player.phase(), Phase::Loading);
    assert_eq!(player.view().duration_text, "00:00");
    assert_eq!(player.view().title.as_deref(), Some("long.flac"));

    let ready = player.engine_mut().finish_load(125.0);
    player.handle_engine_event(ready).unwrap();
    assert_eq!(player.view().duration_text, "02:05");
    assert_eq!(player.view().position_text, "00:00");
}

#[test]
fn track_title_prefers_tags() {
    let mut player = Player::new(FakeEngine::new());
    let seq = player.select_file("01.mp3", vec![0]);
    player
        .handle_engine_event(EngineEvent::MetadataReady {
            seq,
            duration: Some(10.0),
            info: TrackInfo {
                title: Some("Song".into()),
                artist: Some("Band".into()),
            },
        })
        .unwrap();
    assert_eq!(player.view().title.as_deref(), Some("Band - Song"));
    assert_eq!(player.track().unwrap().name, "01.mp3");
}

#[test]
fn play_from_ready_then_tick_updates_display() {
    let mut player = ready_player(100.0);
    player.play(Some(0.0));
    assert_eq!(player.phase(), Phase::Playing);
    assert!(player.ticker().is_running());

    player.engine_mut().position = 37.0;
    assert!(player.on_frame());

    let view = player.view();
    assert_eq!(view.position_text, "00:37");
    assert_eq!(view.indicator_percent, 37.0);
}

#[test]
fn drag_previews_without_touching_the_engine_then_commits_once() {
    let mut player = playing_at(100.0, 40.0);

    player.drag_start(40.0, TRACK);
    assert_eq!(player.phase(), Phase::Dragging);
    assert!(!player.ticker().is_running());
    assert!(!player.engine().playing);

    // The engine's own pause notification must not end the drag.
    player.pump_engine_events().unwrap();
    assert_eq!(player.phase(), Phase::Dragging);

    player.drag_move(10.0);
    assert_eq!(player.view().indicator_percent, 10.0);
    assert_eq!(player.view().position_text, "00:10");
    assert_eq!(player.engine().position, 40.0);
    assert!(seek_calls(&player).is_empty());

    // Frames during the drag do not sample.
    assert!(!player.on_frame());

    player.drag_commit();
    assert_eq!(player.phase(), Phase::Paused);
    assert_eq!(player.engine().position, 10.0);
    assert_eq!(seek_calls(&player), vec![10.0]);
    assert!(!player.engine().playing);
}

#[test]
fn drag_commit_clamps_past_the_track_edges() {
    let mut player = ready_player(80.0);
    player.drag_start(50.0, TRACK);
    player.drag_move(-30.0);
    assert_eq!(player.snapshot().position, 0.0);
    player.drag_move(250.0);
    assert_eq!(player.snapshot().position, 80.0);
    player.drag_commit();
    assert_eq!(player.phase(), Phase::Paused);
    assert_eq!(player.engine().position, 80.0);
}

#[test]
fn drag_from_paused_stays_paused() {
    let mut player = playing_at(100.0, 20.0);
    player.pause();
    player.drag_start(20.0, TRACK);
    player.drag_move(60.0);
    player.drag_commit();
    assert_eq!(player.phase(), Phase::Paused);
    assert_eq!(player.snapshot().position, 60.0);
}

#[test]
fn drag_moves_and_commits_outside_a_drag_are_ignored() {
    let mut player = playing_at(100.0, 20.0);
    player.drag_move(70.0);
    player.drag_commit();
    assert_eq!(player.phase(), Phase::Playing);
    assert!(seek_calls(&player).is_empty());
}

#[test]
fn seek_forward_past_end_clamps_and_keeps_playing() {
    let mut player = playing_at(100.0, 98.0);
    player.seek_by(5.0);
    assert_eq!(player.snapshot().position, 100.0);
    assert_eq!(player.phase(), Phase::Playing);
    assert!(player.ticker().is_running());
    assert_eq!(seek_calls(&player), vec![100.0]);

    let ended = player.engine_mut().run_to_end();
    player.handle_engine_event(ended).unwrap();
    assert_eq!(player.phase(), Phase::Ended);
}

#[test]
fn seek_back_past_start_clamps_to_zero_and_keeps_paused() {
    let mut player = playing_at(100.0, 3.0);
    player.pause();
    player.seek_by(-5.0);
    assert_eq!(player.snapshot().position, 0.0);
    assert_eq!(player.phase(), Phase::Paused);
}

#[test]
fn engine_end_resets_display_and_stops_ticker() {
    let mut player = playing_at(100.0, 99.5);
    let ended = player.engine_mut().run_to_end();
    player.engine_mut().push_event(ended);
    player.pump_engine_events().unwrap();

    assert_eq!(player.phase(), Phase::Ended);
    assert!(!player.ticker().is_running());
    assert_eq!(player.view().position_text, "00:00");
    assert_eq!(player.view().indicator_percent, 0.0);
    assert!(player.track().is_some());
}

#[test]
fn replay_after_end_starts_from_zero() {
    let mut player = playing_at(100.0, 99.5);
    let ended = player.engine_mut().run_to_end();
    player.handle_engine_event(ended).unwrap();

    player.toggle_play_pause();
    assert_eq!(player.phase(), Phase::Playing);
    assert_eq!(player.engine().calls.last(), Some(&Call::Play(Some(0.0))));
    assert_eq!(player.engine().position, 0.0);
}

#[test]
fn seek_after_end_lands_paused() {
    let mut player = playing_at(100.0, 99.5);
    let ended = player.engine_mut().run_to_end();
    player.handle_engine_event(ended).unwrap();

    player.seek_by(5.0);
    assert_eq!(player.phase(), Phase::Paused);
    assert_eq!(player.snapshot().position, 5.0);
}

#[test]
fn pause_is_idempotent() {
    let mut player = playing_at(100.0, 12.0);
    player.pause();
    let once = player.snapshot();
    player.pause();
    assert_eq!(player.snapshot(), once);
    assert_eq!(once.phase, Phase::Paused);

    let pauses = player
        .engine()
        .calls
        .iter()
        .filter(|c| **c == Call::Pause)
        .count();
    assert_eq!(pauses, 1);
}

#[test]
fn engine_side_pause_and_resume_are_reconciled() {
    let mut player = playing_at(100.0, 30.0);

    player.engine_mut().position = 31.0;
    player.handle_engine_event(EngineEvent::Paused).unwrap();
    assert_eq!(player.phase(), Phase::Paused);
    assert_eq!(player.snapshot().position, 31.0);
    assert!(!player.ticker().is_running());

    player.handle_engine_event(EngineEvent::Started).unwrap();
    assert_eq!(player.phase(), Phase::Playing);
    assert!(player.ticker().is_running());

    // A duplicate notification is a no-op.
    let handle = player.ticker().handle();
    player.handle_engine_event(EngineEvent::Started).unwrap();
    assert_eq!(player.ticker().handle(), handle);
}

#[test]
fn seek_offsets_always_stay_in_bounds() {
    let deltas = [-1e9, -60.0, -5.0, -0.25, 0.0, 0.25, 5.0, 60.0, 1e9];
    for duration in [0.5, 7.5, 100.0, 3600.0] {
        for step in 0..=10 {
            let start = duration * step as f64 / 10.0;
            for delta in deltas {
                for playing in [true, false] {
                    let mut player = playing_at(duration, start);
                    if !playing {
                        player.pause();
                    }
                    player.seek_by(delta);
                    let pos = player.snapshot().position;
                    assert!(
                        pos.is_finite() && (0.0..=duration).contains(&pos),
                        "duration {duration} start {start} delta {delta} gave {pos}"
                    );
                    let expected = if playing { Phase::Playing } else { Phase::Paused };
                    assert_eq!(player.phase(), expected);
                }
            }
        }
    }
}

#[test]
fn non_finite_seek_offsets_are_ignored() {
    let mut player = playing_at(100.0, 50.0);
    player.seek_by(f64::NAN);
    player.seek_by(f64::INFINITY);
    assert_eq!(player.snapshot().position, 50.0);
    assert!(seek_calls(&player).is_empty());
}

#[test]
fn at_most_one_ticker_across_command_sequences() {
    let mut player = ready_player(100.0);
    let mut seen = Vec::new();

    let steps: [fn(&mut Player<FakeEngine>); 12] = [
        |p| p.play(None),
        |p| p.play(Some(10.0)),
        |p| p.pause(),
        |p| p.pause(),
        |p| p.toggle_play_pause(),
        |p| p.drag_start(30.0, TRACK),
        |p| p.drag_move(45.0),
        |p| p.toggle_play_pause(),
        |p| p.drag_commit(),
        |p| p.toggle_play_pause(),
        |p| p.seek_by(5.0),
        |p| {
            let _ = p.pump_engine_events();
        },
    ];

    for round in 0..3 {
        for (i, step) in steps.iter().enumerate() {
            step(&mut player);
            assert_ticker_matches_phase(&player);

            if let Some(h) = player.ticker().handle() {
                if seen.last() != Some(&h) {
                    seen.push(h);
                }
            }
            // Every earlier registration is dead.
            let live = seen
                .iter()
                .filter(|h| player.ticker().is_live(**h))
                .count();
            assert!(live <= 1, "round {round} step {i}: {live} live tickers");
        }
    }
}

#[test]
fn samples_from_a_cancelled_ticker_are_dropped() {
    let mut player = playing_at(100.0, 10.0);
    let stale_handle = player.ticker().handle().unwrap();

    player.pause();
    player.play(None);
    assert_ne!(player.ticker().handle(), Some(stale_handle));

    let stale = crate::ticker::TickSample {
        handle: stale_handle,
        position: 77.0,
    };
    assert!(!player.apply_tick(stale));
    assert_eq!(player.snapshot().position, 10.0);
}

#[test]
fn stale_load_results_are_ignored() {
    let mut player = Player::new(FakeEngine::new());
    let first = player.select_file("a.mp3", vec![1]);
    let second = player.select_file("b.mp3", vec![2]);
    assert!(second > first);

    player
        .handle_engine_event(EngineEvent::MetadataReady {
            seq: first,
            duration: Some(10.0),
            info: TrackInfo::default(),
        })
        .unwrap();
    assert_eq!(player.phase(), Phase::Loading);
    assert!(player.track().is_none());

    player
        .handle_engine_event(EngineEvent::LoadFailed {
            seq: first,
            error: LoadError::Empty,
        })
        .unwrap();
    assert_eq!(player.phase(), Phase::Loading);

    player
        .handle_engine_event(EngineEvent::MetadataReady {
            seq: second,
            duration: Some(42.0),
            info: TrackInfo::default(),
        })
        .unwrap();
    assert_eq!(player.phase(), Phase::Ready);
    assert_eq!(player.track().unwrap().name, "b.mp3");
    assert_eq!(player.snapshot().duration, Some(42.0));
}

#[test]
fn load_failure_is_reported_and_returns_to_idle() {
    let mut player = Player::new(FakeEngine::new());
    player.select_file("broken.bin", vec![9]);
    let failed = player.engine_mut().fail_load();
    player.engine_mut().push_event(failed);

    let err = player.pump_engine_events().unwrap_err();
    assert!(matches!(err, LoadError::Decode(_)));
    assert_eq!(player.phase(), Phase::Idle);
    assert!(player.track().is_none());
    let message = player.last_error().unwrap();
    assert!(message.starts_with("broken.bin"));
    assert_eq!(player.view().error.as_deref(), Some(message));
}

#[test]
fn commands_without_a_track_are_ignored() {
    let mut player = Player::new(FakeEngine::new());
    player.play(None);
    player.play(Some(3.0));
    player.pause();
    player.toggle_play_pause();
    player.seek_by(5.0);
    player.drag_start(10.0, TRACK);
    player.drag_commit();

    assert_eq!(player.phase(), Phase::Idle);
    assert!(player.engine().calls.is_empty());
    assert!(!player.ticker().is_running());
}

#[test]
fn selecting_a_file_discards_playback_and_drag() {
    let mut player = playing_at(100.0, 50.0);
    player.drag_start(50.0, TRACK);
    player.select_file("next.ogg", vec![4]);

    assert_eq!(player.phase(), Phase::Loading);
    assert!(!player.ticker().is_running());
    assert!(player.track().is_none());
    assert_eq!(player.snapshot().position, 0.0);

    // Drag input for the discarded session goes nowhere.
    player.drag_commit();
    assert_eq!(player.phase(), Phase::Loading);
    assert!(seek_calls(&player).is_empty());
}

#[test]
fn mute_toggles_and_follows_engine_events() {
    let mut player = ready_player(10.0);
    player.toggle_mute();
    assert!(player.view().is_muted);
    assert_eq!(player.engine().calls.last(), Some(&Call::SetMuted(true)));

    player.pump_engine_events().unwrap();
    assert!(player.view().is_muted);

    player
        .handle_engine_event(EngineEvent::VolumeChanged { muted: false })
        .unwrap();
    assert!(!player.view().is_muted);
}

#[test]
fn unknown_duration_only_clamps_at_zero() {
    let mut player = Player::new(FakeEngine::new());
    let seq = player.select_file("stream.wav", vec![0]);
    player.engine_mut().loaded = true;
    player
        .handle_engine_event(EngineEvent::MetadataReady {
            seq,
            duration: None,
            info: TrackInfo::default(),
        })
        .unwrap();

    player.seek_by(30.0);
    assert_eq!(player.snapshot().position, 30.0);
    assert_eq!(player.view().indicator_percent, 0.0);
    assert_eq!(player.view().duration_text, "00:00");

    // No duration, nothing to map a drag onto.
    player.drag_start(50.0, TRACK);
    assert_eq!(player.phase(), Phase::Ready);
}
