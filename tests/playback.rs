// tests/playback.rs
//! Transport scenarios against a silent-output engine: event ordering,
//! elapsed accounting, loop wraps, seeks, and teardown.

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use tremolo::audio::{
    AudioEngine, AudioSettings, DecodedBuffer, EngineConfig, EventListener, OutputMode,
    PlayerEvent, StartParams, DEFAULT_VOLUME,
};

type EventLog = Arc<Mutex<Vec<PlayerEvent>>>;

fn silent_engine(tick: Duration) -> AudioEngine {
    engine_with(AudioSettings::default(), tick)
}

fn engine_with(settings: AudioSettings, tick: Duration) -> AudioEngine {
    AudioEngine::new(EngineConfig {
        settings,
        tick_interval: tick,
        output: OutputMode::Silent,
    })
    .unwrap()
}

fn short_buffer(seconds: f64) -> DecodedBuffer {
    let frames = (seconds * 8_000.0) as usize;
    let samples: Vec<f32> = (0..frames).map(|i| (i as f32 * 0.05).sin() * 0.2).collect();
    DecodedBuffer::new(1, 8_000, samples)
}

/// Register a recording listener for all five event kinds.
fn record_events(engine: &AudioEngine) -> EventLog {
    let log: EventLog = Arc::new(Mutex::new(Vec::new()));
    let listeners = [
        PlayerEvent::Start,
        PlayerEvent::End,
        PlayerEvent::Pause,
        PlayerEvent::Resume,
        PlayerEvent::Tick,
    ]
    .into_iter()
    .map(|event| {
        let log = log.clone();
        EventListener::new(event, move || log.lock().unwrap().push(event))
    })
    .collect();
    engine.add_listeners(listeners);
    log
}

fn count(log: &EventLog, event: PlayerEvent) -> usize {
    log.lock().unwrap().iter().filter(|e| **e == event).count()
}

fn wait_until(limit: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let end = Instant::now() + limit;
    while Instant::now() < end {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    cond()
}

#[test]
fn test_play_emits_start_and_loads_buffer() {
    let engine = silent_engine(Duration::from_millis(50));
    let log = record_events(&engine);

    engine.play_buffer(short_buffer(5.0), StartParams::default());
    assert!(wait_until(Duration::from_secs(2), || count(
        &log,
        PlayerEvent::Start
    ) >= 1));

    assert!(engine.is_buffer_loaded());
    assert!(!engine.is_paused());
    assert!(!engine.is_ended());
    let duration = engine.duration_seconds().unwrap();
    assert!((duration - 5.0).abs() < 0.01, "duration was {}", duration);
    assert!(engine.elapsed_seconds() < 1.0);
}

#[test]
fn test_completion_emits_end_and_resets_position() {
    let engine = silent_engine(Duration::from_millis(50));
    let log = record_events(&engine);

    engine.play_buffer(short_buffer(0.3), StartParams::default());
    assert!(wait_until(Duration::from_secs(2), || count(
        &log,
        PlayerEvent::End
    ) >= 1));

    assert!(engine.is_ended());
    assert!(!engine.is_paused());
    // The buffer stays loaded after a natural end.
    assert!(engine.is_buffer_loaded());
    assert_eq!(engine.elapsed_seconds(), 0.0);
    assert!(engine.duration_seconds().is_some());
    assert_eq!(count(&log, PlayerEvent::Start), 1);

    // Pause and resume are no-ops once ended.
    engine.pause();
    engine.resume();
    thread::sleep(Duration::from_millis(80));
    assert_eq!(count(&log, PlayerEvent::Pause), 0);
    assert_eq!(count(&log, PlayerEvent::Resume), 0);
}

#[test]
fn test_loop_wrap_emits_start_instead_of_end() {
    let engine = engine_with(
        AudioSettings {
            loop_enabled: true,
            ..AudioSettings::default()
        },
        Duration::from_millis(50),
    );
    let log = record_events(&engine);

    engine.play_buffer(short_buffer(0.25), StartParams::default());
    // Two wraps on top of the initial start.
    assert!(wait_until(Duration::from_secs(3), || count(
        &log,
        PlayerEvent::Start
    ) >= 3));

    assert_eq!(count(&log, PlayerEvent::End), 0);
    assert!(!engine.is_ended());
    assert!(engine.is_loop_enabled());
}

#[test]
fn test_pause_freezes_position() {
    let engine = silent_engine(Duration::from_millis(50));
    let log = record_events(&engine);

    engine.play_buffer(short_buffer(5.0), StartParams::default());
    assert!(wait_until(Duration::from_secs(2), || count(
        &log,
        PlayerEvent::Start
    ) >= 1));
    thread::sleep(Duration::from_millis(120));

    engine.pause();
    assert!(wait_until(Duration::from_secs(2), || count(
        &log,
        PlayerEvent::Pause
    ) >= 1));
    assert!(engine.is_paused());

    let frozen = engine.elapsed_seconds();
    assert!(frozen > 0.0);
    thread::sleep(Duration::from_millis(150));
    assert_eq!(engine.elapsed_seconds(), frozen);

    // A second pause is a no-op.
    engine.pause();
    thread::sleep(Duration::from_millis(80));
    assert_eq!(count(&log, PlayerEvent::Pause), 1);
}

#[test]
fn test_resume_continues_from_frozen_position() {
    let engine = silent_engine(Duration::from_millis(50));
    let log = record_events(&engine);

    engine.play_buffer(short_buffer(5.0), StartParams::default());
    assert!(wait_until(Duration::from_secs(2), || count(
        &log,
        PlayerEvent::Start
    ) >= 1));
    thread::sleep(Duration::from_millis(100));

    engine.pause();
    assert!(wait_until(Duration::from_secs(2), || count(
        &log,
        PlayerEvent::Pause
    ) >= 1));
    let frozen = engine.elapsed_seconds();

    engine.resume();
    assert!(wait_until(Duration::from_secs(2), || count(
        &log,
        PlayerEvent::Resume
    ) >= 1));
    assert!(!engine.is_paused());

    thread::sleep(Duration::from_millis(100));
    let position = engine.elapsed_seconds();
    assert!(position >= frozen, "{} < {}", position, frozen);
    // Continuity: no jump past the pause point.
    assert!(position < frozen + 1.0, "{} jumped from {}", position, frozen);

    // Resuming while already playing is a no-op.
    engine.resume();
    thread::sleep(Duration::from_millis(80));
    assert_eq!(count(&log, PlayerEvent::Resume), 1);
}

#[test]
fn test_seek_emits_tick_not_start() {
    // Long tick interval so the only tick is the seek announcement.
    let engine = silent_engine(Duration::from_secs(60));
    let log = record_events(&engine);

    engine.play_buffer(short_buffer(10.0), StartParams::default());
    assert!(wait_until(Duration::from_secs(2), || count(
        &log,
        PlayerEvent::Start
    ) >= 1));

    engine.set_progress(4.0);
    assert!(wait_until(Duration::from_secs(2), || count(
        &log,
        PlayerEvent::Tick
    ) >= 1));

    assert_eq!(count(&log, PlayerEvent::Start), 1);
    assert!(!engine.is_ended());
    let position = engine.elapsed_seconds();
    assert!((4.0..4.5).contains(&position), "position was {}", position);
}

#[test]
fn test_seek_out_of_range_is_ignored() {
    let engine = silent_engine(Duration::from_secs(60));
    let log = record_events(&engine);

    engine.play_buffer(short_buffer(2.0), StartParams::default());
    assert!(wait_until(Duration::from_secs(2), || count(
        &log,
        PlayerEvent::Start
    ) >= 1));

    engine.set_progress(9.0);
    engine.set_progress(-1.0);
    thread::sleep(Duration::from_millis(100));

    assert_eq!(count(&log, PlayerEvent::Tick), 0);
    assert!(engine.elapsed_seconds() < 1.0);
}

#[test]
fn test_seek_with_nothing_loaded_is_ignored() {
    let engine = silent_engine(Duration::from_secs(60));
    let log = record_events(&engine);

    engine.set_progress(1.0);
    thread::sleep(Duration::from_millis(100));

    assert!(log.lock().unwrap().is_empty());
    assert_eq!(engine.elapsed_seconds(), 0.0);
}

#[test]
fn test_seek_while_paused_stays_paused() {
    let engine = silent_engine(Duration::from_secs(60));
    let log = record_events(&engine);

    engine.play_buffer(short_buffer(5.0), StartParams::default());
    assert!(wait_until(Duration::from_secs(2), || count(
        &log,
        PlayerEvent::Start
    ) >= 1));
    engine.pause();
    assert!(wait_until(Duration::from_secs(2), || count(
        &log,
        PlayerEvent::Pause
    ) >= 1));

    engine.set_progress(2.0);
    assert!(wait_until(Duration::from_secs(2), || count(
        &log,
        PlayerEvent::Tick
    ) >= 1));

    assert!(engine.is_paused());
    assert_eq!(engine.elapsed_seconds(), 2.0);
    assert_eq!(count(&log, PlayerEvent::Resume), 0);

    engine.resume();
    assert!(wait_until(Duration::from_secs(2), || count(
        &log,
        PlayerEvent::Resume
    ) >= 1));
    let position = engine.elapsed_seconds();
    assert!((2.0..2.5).contains(&position), "position was {}", position);
}

#[test]
fn test_seek_after_end_restarts_without_start_event() {
    let engine = silent_engine(Duration::from_secs(60));
    let log = record_events(&engine);

    engine.play_buffer(short_buffer(0.3), StartParams::default());
    assert!(wait_until(Duration::from_secs(2), || count(
        &log,
        PlayerEvent::End
    ) >= 1));

    engine.set_progress(0.1);
    assert!(wait_until(Duration::from_secs(2), || count(
        &log,
        PlayerEvent::Tick
    ) >= 1));
    assert!(!engine.is_ended());
    assert_eq!(count(&log, PlayerEvent::Start), 1);

    // The repositioned playback runs out again.
    assert!(wait_until(Duration::from_secs(2), || count(
        &log,
        PlayerEvent::End
    ) >= 2));
}

#[test]
fn test_volume_validation_and_mute_flag() {
    let engine = silent_engine(Duration::from_millis(50));

    engine.set_volume(1.5);
    engine.set_volume(-0.1);
    thread::sleep(Duration::from_millis(100));
    assert_eq!(engine.volume(), DEFAULT_VOLUME);
    assert!(!engine.is_muted());

    engine.set_volume(0.0);
    assert!(wait_until(Duration::from_secs(1), || engine.is_muted()));
    assert_eq!(engine.volume(), 0.0);

    engine.set_volume(0.8);
    assert!(wait_until(Duration::from_secs(1), || !engine.is_muted()));
    assert_eq!(engine.volume(), 0.8);
}

#[test]
fn test_toggle_loop_live_is_silent() {
    let engine = silent_engine(Duration::from_secs(60));
    let log = record_events(&engine);

    engine.play_buffer(short_buffer(5.0), StartParams::default());
    assert!(wait_until(Duration::from_secs(2), || count(
        &log,
        PlayerEvent::Start
    ) >= 1));

    engine.toggle_loop();
    assert!(wait_until(Duration::from_secs(1), || engine.is_loop_enabled()));
    thread::sleep(Duration::from_millis(100));

    // The rebuild announces nothing.
    assert_eq!(count(&log, PlayerEvent::Start), 1);
    assert_eq!(count(&log, PlayerEvent::Tick), 0);
    assert_eq!(count(&log, PlayerEvent::End), 0);
    assert!(engine.is_buffer_loaded());
    assert!(!engine.is_ended());
}

#[test]
fn test_toggle_loop_with_nothing_loaded_only_flips_flag() {
    let engine = silent_engine(Duration::from_millis(50));
    let log = record_events(&engine);

    engine.toggle_loop();
    assert!(wait_until(Duration::from_secs(1), || engine.is_loop_enabled()));
    thread::sleep(Duration::from_millis(80));
    assert!(log.lock().unwrap().is_empty());
}

#[test]
fn test_replacement_play_switches_buffers() {
    let engine = silent_engine(Duration::from_millis(50));
    let log = record_events(&engine);

    engine.play_buffer(short_buffer(5.0), StartParams::default());
    assert!(wait_until(Duration::from_secs(2), || count(
        &log,
        PlayerEvent::Start
    ) >= 1));
    thread::sleep(Duration::from_millis(100));

    engine.play_buffer(short_buffer(0.5), StartParams::default());
    assert!(wait_until(Duration::from_secs(2), || count(
        &log,
        PlayerEvent::Start
    ) >= 2));

    let duration = engine.duration_seconds().unwrap();
    assert!((duration - 0.5).abs() < 0.01, "duration was {}", duration);

    // Only the second buffer runs to completion.
    assert!(wait_until(Duration::from_secs(2), || count(
        &log,
        PlayerEvent::End
    ) >= 1));
    assert_eq!(count(&log, PlayerEvent::End), 1);
    assert_eq!(count(&log, PlayerEvent::Start), 2);
}

#[test]
fn test_play_with_offset_and_duration_limit() {
    let engine = silent_engine(Duration::from_millis(50));
    let log = record_events(&engine);

    let params = StartParams {
        offset_seconds: 8.0,
        duration_limit: Some(1.0),
        loop_override: None,
    };
    engine.play_buffer(short_buffer(30.0), params);
    assert!(wait_until(Duration::from_secs(2), || count(
        &log,
        PlayerEvent::Start
    ) >= 1));
    assert!(engine.elapsed_seconds() >= 8.0);

    // The limit truncates playback well before the buffer runs out.
    assert!(wait_until(Duration::from_secs(3), || count(
        &log,
        PlayerEvent::End
    ) >= 1));
    assert_eq!(engine.elapsed_seconds(), 0.0);
}

#[test]
fn test_ticks_fire_periodically_while_playing() {
    let engine = silent_engine(Duration::from_millis(50));
    let log = record_events(&engine);

    engine.play_buffer(short_buffer(5.0), StartParams::default());
    assert!(wait_until(Duration::from_secs(2), || count(
        &log,
        PlayerEvent::Tick
    ) >= 3));
    assert!(engine.elapsed_seconds() > 0.1);
}

#[test]
fn test_close_mid_play_unloads_everything() {
    let engine = silent_engine(Duration::from_millis(50));
    let log = record_events(&engine);

    engine.play_buffer(short_buffer(5.0), StartParams::default());
    assert!(wait_until(Duration::from_secs(2), || count(
        &log,
        PlayerEvent::Start
    ) >= 1));

    engine.close();
    assert!(!engine.is_buffer_loaded());
    assert_eq!(engine.elapsed_seconds(), 0.0);
    assert!(engine.duration_seconds().is_none());

    // Closed engines ignore further commands.
    engine.close();
    engine.play_buffer(short_buffer(1.0), StartParams::default());
    thread::sleep(Duration::from_millis(80));
    assert!(!engine.is_buffer_loaded());
}
