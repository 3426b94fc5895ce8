// src/audio/engine.rs
//! The playback engine.
//!
//! One engine per session. A dedicated audio thread owns the output
//! stream (it is not `Send`), the at-most-one playback graph, the paired
//! completion/tick deadlines, and the event listener registry. Handle
//! methods send commands over an mpsc channel and return immediately;
//! accessors read a shared snapshot written only by the audio thread.
//!
//! Ordering guarantee: the snapshot is updated before an event fires, and
//! listeners run on the audio thread with no lock held, so a listener
//! reading back through the accessors always observes the
//! post-transition state.

use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use rodio::Source;
use tracing::{debug, warn};

use crate::error::{PlayerError, Result};

use super::decode;
use super::output::{AudioOutput, PlaybackGraph};
use super::source::BufferSource;
use super::types::{
    AudioSettings, DecodedBuffer, EngineConfig, EventCallback, EventListener, PlayerEvent,
    StartParams,
};

/// How long the audio thread sleeps between wakeups when no timer is
/// armed.
const IDLE_WAIT: Duration = Duration::from_millis(500);

/// Commands from the handle to the audio thread.
enum EngineCommand {
    Play(DecodedBuffer, StartParams),
    Pause,
    Resume,
    SetVolume(f32),
    ToggleLoop,
    SetProgress(f64),
    SetListeners(Vec<EventListener>),
    Close,
}

/// What a graph rebuild announces to listeners.
enum Announce {
    /// A fresh play: emit `start`.
    Start,
    /// A seek on the same buffer: emit one immediate `tick`, no `start`.
    Reposition,
    /// A loop-toggle rebuild: emit nothing.
    Silent,
}

/// Transport state snapshot, written by the audio thread only.
#[derive(Debug, Clone)]
struct PlaybackState {
    loaded: bool,
    paused: bool,
    ended: bool,
    looping: bool,
    muted: bool,
    volume: f32,
    /// Seek/resume anchor in seconds; wall-clock elapsed is added on top.
    start_offset: f64,
    /// Last committed position (tick, pause freeze, seek, or reset).
    elapsed: f64,
    duration: Option<f64>,
    /// Wall clock of the current graph start; `None` while paused, ended,
    /// or unloaded.
    playing_since: Option<Instant>,
}

impl PlaybackState {
    fn from_settings(settings: &AudioSettings) -> Self {
        let volume = if settings.muted {
            0.0
        } else {
            settings.volume.clamp(0.0, 1.0)
        };
        Self {
            loaded: false,
            paused: false,
            ended: false,
            looping: settings.loop_enabled,
            muted: volume == 0.0,
            volume,
            start_offset: 0.0,
            elapsed: 0.0,
            duration: None,
            playing_since: None,
        }
    }

    /// Current playhead: precise while playing, frozen otherwise.
    fn position(&self) -> f64 {
        match self.playing_since {
            Some(since) => self.start_offset + since.elapsed().as_secs_f64(),
            None => self.elapsed,
        }
    }

    fn unload(&mut self) {
        self.loaded = false;
        self.paused = false;
        self.ended = false;
        self.start_offset = 0.0;
        self.elapsed = 0.0;
        self.duration = None;
        self.playing_since = None;
    }
}

/// Handle to the playback engine. Construct one per session, close it on
/// teardown; commands sent after `close` are silent no-ops.
pub struct AudioEngine {
    cmd_tx: Sender<EngineCommand>,
    shared: Arc<Mutex<PlaybackState>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl AudioEngine {
    /// Spawn the audio thread and open the configured output on it. Fails
    /// when the output device cannot be opened.
    pub fn new(config: EngineConfig) -> Result<Self> {
        let shared = Arc::new(Mutex::new(PlaybackState::from_settings(&config.settings)));
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (init_tx, init_rx) = mpsc::channel();

        let thread_shared = shared.clone();
        let worker = thread::Builder::new()
            .name("audio-engine".into())
            .spawn(move || {
                let output = match AudioOutput::open(config.output) {
                    Ok(output) => {
                        let _ = init_tx.send(Ok(()));
                        output
                    }
                    Err(e) => {
                        let _ = init_tx.send(Err(e));
                        return;
                    }
                };
                EngineThread::new(output, thread_shared, cmd_rx, config.tick_interval).run();
            })?;

        match init_rx.recv() {
            Ok(Ok(())) => Ok(Self {
                cmd_tx,
                shared,
                worker: Mutex::new(Some(worker)),
            }),
            Ok(Err(e)) => {
                let _ = worker.join();
                Err(e)
            }
            Err(_) => Err(PlayerError::Output(
                "audio thread exited before reporting readiness".into(),
            )),
        }
    }

    /// Decode raw bytes into a playable buffer. Purely functional; engine
    /// state is untouched.
    pub fn decode(bytes: Vec<u8>) -> Result<DecodedBuffer> {
        decode::decode_bytes(bytes)
    }

    /// Start playing `buffer`, replacing any active graph. Emits `start`.
    pub fn play_buffer(&self, buffer: DecodedBuffer, params: StartParams) {
        self.send(EngineCommand::Play(buffer, params));
    }

    /// Freeze playback at the current position. No-op unless playing.
    pub fn pause(&self) {
        self.send(EngineCommand::Pause);
    }

    /// Continue from the frozen position. No-op unless paused.
    pub fn resume(&self) {
        self.send(EngineCommand::Resume);
    }

    /// Set the gain. Values outside `[0, 1]` are rejected as a silent
    /// no-op; zero marks the engine muted.
    pub fn set_volume(&self, volume: f32) {
        self.send(EngineCommand::SetVolume(volume));
    }

    /// Flip the loop flag, rebuilding the live graph in place when one
    /// exists. Emits nothing.
    pub fn toggle_loop(&self) {
        self.send(EngineCommand::ToggleLoop);
    }

    /// Seek to `seconds` on the loaded buffer. Silent no-op when out of
    /// `[0, duration]` or nothing is loaded; emits one immediate `tick`
    /// instead of `start`.
    pub fn set_progress(&self, seconds: f64) {
        self.send(EngineCommand::SetProgress(seconds));
    }

    /// Register listeners; a listener replaces any previous one for the
    /// same event kind.
    pub fn add_listeners(&self, listeners: Vec<EventListener>) {
        self.send(EngineCommand::SetListeners(listeners));
    }

    /// Tear down the engine: stops playback, clears timers, listeners and
    /// the loaded buffer, and joins the audio thread. Safe to call in any
    /// state and idempotent.
    pub fn close(&self) {
        let handle = self.worker.lock().ok().and_then(|mut guard| guard.take());
        if let Some(handle) = handle {
            let _ = self.cmd_tx.send(EngineCommand::Close);
            if handle.join().is_err() {
                warn!("audio engine thread panicked during shutdown");
            }
        }
    }

    /// Current playhead in seconds; 0 when nothing is loaded. Unclamped,
    /// so a reading just past the duration is possible right before the
    /// completion timer lands.
    pub fn elapsed_seconds(&self) -> f64 {
        self.shared.lock().map(|s| s.position()).unwrap_or(0.0)
    }

    /// Duration of the loaded buffer, if any.
    pub fn duration_seconds(&self) -> Option<f64> {
        self.shared.lock().ok().and_then(|s| s.duration)
    }

    pub fn volume(&self) -> f32 {
        self.shared.lock().map(|s| s.volume).unwrap_or(0.0)
    }

    pub fn is_loop_enabled(&self) -> bool {
        self.shared.lock().map(|s| s.looping).unwrap_or(false)
    }

    pub fn is_buffer_loaded(&self) -> bool {
        self.shared.lock().map(|s| s.loaded).unwrap_or(false)
    }

    pub fn is_paused(&self) -> bool {
        self.shared.lock().map(|s| s.paused).unwrap_or(false)
    }

    pub fn is_ended(&self) -> bool {
        self.shared.lock().map(|s| s.ended).unwrap_or(false)
    }

    pub fn is_muted(&self) -> bool {
        self.shared.lock().map(|s| s.muted).unwrap_or(false)
    }

    fn send(&self, cmd: EngineCommand) {
        if self.cmd_tx.send(cmd).is_err() {
            debug!("engine command dropped: engine is closed");
        }
    }
}

impl Drop for AudioEngine {
    fn drop(&mut self) {
        self.close();
    }
}

/// State owned by the audio thread.
struct EngineThread {
    output: AudioOutput,
    shared: Arc<Mutex<PlaybackState>>,
    cmd_rx: Receiver<EngineCommand>,
    tick_interval: Duration,
    graph: Option<PlaybackGraph>,
    buffer: Option<DecodedBuffer>,
    listeners: HashMap<PlayerEvent, EventCallback>,
    /// Paired deadlines: armed together, cleared together. Completion
    /// stands in for the missing end-of-playback callback.
    completion_at: Option<Instant>,
    next_tick_at: Option<Instant>,
}

impl EngineThread {
    fn new(
        output: AudioOutput,
        shared: Arc<Mutex<PlaybackState>>,
        cmd_rx: Receiver<EngineCommand>,
        tick_interval: Duration,
    ) -> Self {
        Self {
            output,
            shared,
            cmd_rx,
            tick_interval,
            graph: None,
            buffer: None,
            listeners: HashMap::new(),
            completion_at: None,
            next_tick_at: None,
        }
    }

    fn run(mut self) {
        loop {
            match self.cmd_rx.recv_timeout(self.sleep_budget()) {
                Ok(cmd) => {
                    if !self.handle(cmd) {
                        break;
                    }
                }
                Err(RecvTimeoutError::Timeout) => self.service_timers(),
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        self.shutdown();
    }

    /// Returns false when the thread should exit.
    fn handle(&mut self, cmd: EngineCommand) -> bool {
        match cmd {
            EngineCommand::Play(buffer, params) => {
                self.start_graph(buffer, params, Announce::Start, false);
            }
            EngineCommand::Pause => self.on_pause(),
            EngineCommand::Resume => self.on_resume(),
            EngineCommand::SetVolume(volume) => self.on_set_volume(volume),
            EngineCommand::ToggleLoop => self.on_toggle_loop(),
            EngineCommand::SetProgress(seconds) => self.on_set_progress(seconds),
            EngineCommand::SetListeners(listeners) => {
                // Last registration per kind wins.
                for l in listeners {
                    self.listeners.insert(l.event, l.callback);
                }
            }
            EngineCommand::Close => return false,
        }
        true
    }

    /// Sleep until the nearest armed deadline, or idle.
    fn sleep_budget(&self) -> Duration {
        let now = Instant::now();
        [self.completion_at, self.next_tick_at]
            .iter()
            .flatten()
            .map(|t| t.saturating_duration_since(now))
            .min()
            .unwrap_or(IDLE_WAIT)
    }

    fn service_timers(&mut self) {
        let now = Instant::now();
        // When both deadlines are due, completion wins; it re-arms or
        // clears the tick deadline itself.
        if self.completion_at.is_some_and(|t| now >= t) {
            self.on_completion();
            return;
        }
        if self.next_tick_at.is_some_and(|t| now >= t) {
            self.with_state(|s| s.elapsed = s.position());
            self.next_tick_at = Some(now + self.tick_interval);
            self.emit(PlayerEvent::Tick);
        }
    }

    /// Build and start a replacement graph. The new sink is opened before
    /// the old graph is touched, so a failed open leaves the previous
    /// playback intact.
    fn start_graph(
        &mut self,
        buffer: DecodedBuffer,
        params: StartParams,
        announce: Announce,
        paused: bool,
    ) {
        let duration = buffer.duration_seconds();
        let offset = if params.offset_seconds.is_finite() {
            params.offset_seconds.clamp(0.0, duration)
        } else {
            0.0
        };

        let (volume, persisted_loop) = self
            .with_state(|s| (s.volume, s.looping))
            .unwrap_or((0.0, false));
        let looping = params.loop_override.unwrap_or(persisted_loop);

        let graph = match self.output.build_graph(volume, paused) {
            Ok(graph) => graph,
            Err(e) => {
                warn!("could not open playback graph: {}", e);
                return;
            }
        };

        // The loop span is always the full buffer, so a duration cap only
        // applies to non-looping playback.
        let limit = if looping { None } else { params.duration_limit };
        let window = BufferSource::window(buffer.clone(), offset, limit);
        let remaining = window.span_seconds();
        graph.append(window);
        if looping {
            // Pre-queue the repeated full span so the loop boundary is
            // seamless; the completion deadline restarts the bookkeeping.
            graph.append(BufferSource::full(buffer.clone()).repeat_infinite());
        }

        // Replacing the graph drops, and thereby stops, the old one.
        self.graph = Some(graph);
        self.buffer = Some(buffer);

        let now = Instant::now();
        self.with_state(|s| {
            s.loaded = true;
            s.ended = false;
            s.paused = paused;
            s.looping = looping;
            s.start_offset = offset;
            s.elapsed = offset;
            s.duration = Some(duration);
            s.playing_since = if paused { None } else { Some(now) };
        });
        if paused {
            self.clear_timers();
        } else {
            self.arm_timers(remaining);
        }

        match announce {
            Announce::Start => self.emit(PlayerEvent::Start),
            Announce::Reposition => self.emit(PlayerEvent::Tick),
            Announce::Silent => {}
        }
    }

    fn on_pause(&mut self) {
        let froze = self
            .with_state(|s| {
                if !s.loaded || s.paused || s.ended {
                    return false;
                }
                let position = s.position();
                s.start_offset = position;
                s.elapsed = position;
                s.playing_since = None;
                s.paused = true;
                true
            })
            .unwrap_or(false);
        if !froze {
            return;
        }
        self.clear_timers();
        if let Some(graph) = &self.graph {
            graph.pause();
        }
        self.emit(PlayerEvent::Pause);
    }

    fn on_resume(&mut self) {
        let remaining = self
            .with_state(|s| {
                if !s.loaded || !s.paused || s.ended {
                    return None;
                }
                s.paused = false;
                s.playing_since = Some(Instant::now());
                Some((s.duration.unwrap_or(0.0) - s.start_offset).max(0.0))
            })
            .flatten();
        let Some(remaining) = remaining else { return };
        self.arm_timers(remaining);
        if let Some(graph) = &self.graph {
            graph.play();
        }
        self.emit(PlayerEvent::Resume);
    }

    fn on_set_volume(&mut self, volume: f32) {
        if !(0.0..=1.0).contains(&volume) {
            debug!("volume {} outside [0, 1] ignored", volume);
            return;
        }
        self.with_state(|s| {
            s.volume = volume;
            s.muted = volume == 0.0;
        });
        if let Some(graph) = &self.graph {
            graph.set_volume(volume);
        }
    }

    fn on_toggle_loop(&mut self) {
        let rebuild = self
            .with_state(|s| {
                s.looping = !s.looping;
                if s.loaded && !s.ended {
                    Some((s.position(), s.paused, s.looping))
                } else {
                    None
                }
            })
            .flatten();
        let Some((position, paused, looping)) = rebuild else {
            return;
        };
        let Some(buffer) = self.buffer.clone() else {
            return;
        };
        // A queued source cannot change its loop flag, so the span change
        // is applied by rebuilding silently at the same position.
        let params = StartParams {
            offset_seconds: position,
            duration_limit: None,
            loop_override: Some(looping),
        };
        self.start_graph(buffer, params, Announce::Silent, paused);
    }

    fn on_set_progress(&mut self, seconds: f64) {
        let target = self
            .with_state(|s| {
                if !s.loaded {
                    return None;
                }
                let duration = s.duration?;
                if !(0.0..=duration).contains(&seconds) {
                    return None;
                }
                Some((seconds, s.paused))
            })
            .flatten();
        let Some((seconds, paused)) = target else {
            debug!("seek to {} ignored: no buffer or out of range", seconds);
            return;
        };
        let Some(buffer) = self.buffer.clone() else {
            return;
        };
        self.start_graph(
            buffer,
            StartParams::at_offset(seconds),
            Announce::Reposition,
            paused,
        );
    }

    fn on_completion(&mut self) {
        let looping = self.with_state(|s| s.looping).unwrap_or(false);
        if looping {
            // The loop copy is already queued; restart the bookkeeping
            // and announce the wrap as a fresh start, not an end.
            let duration = self
                .with_state(|s| {
                    s.start_offset = 0.0;
                    s.elapsed = 0.0;
                    s.playing_since = Some(Instant::now());
                    s.duration.unwrap_or(0.0)
                })
                .unwrap_or(0.0);
            self.arm_timers(duration);
            self.emit(PlayerEvent::Start);
        } else {
            self.graph = None;
            self.clear_timers();
            self.with_state(|s| {
                s.ended = true;
                s.paused = false;
                s.start_offset = 0.0;
                s.elapsed = 0.0;
                s.playing_since = None;
            });
            self.emit(PlayerEvent::End);
        }
    }

    fn arm_timers(&mut self, remaining: f64) {
        let now = Instant::now();
        self.completion_at = Some(now + Duration::from_secs_f64(remaining.max(0.0)));
        self.next_tick_at = Some(now + self.tick_interval);
    }

    fn clear_timers(&mut self) {
        self.completion_at = None;
        self.next_tick_at = None;
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut PlaybackState) -> R) -> Option<R> {
        match self.shared.lock() {
            Ok(mut state) => Some(f(&mut state)),
            Err(_) => None,
        }
    }

    /// Invoke the listener for `event`, if any. Callers must have
    /// released the state lock; listeners may read back through the
    /// engine accessors.
    fn emit(&mut self, event: PlayerEvent) {
        if let Some(callback) = self.listeners.get_mut(&event) {
            callback();
        }
    }

    fn shutdown(&mut self) {
        self.graph = None;
        self.buffer = None;
        self.listeners.clear();
        self.clear_timers();
        self.with_state(|s| s.unload());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::types::OutputMode;

    fn silent_engine() -> AudioEngine {
        AudioEngine::new(EngineConfig {
            output: OutputMode::Silent,
            tick_interval: Duration::from_millis(50),
            ..EngineConfig::default()
        })
        .unwrap()
    }

    fn short_buffer(seconds: f64) -> DecodedBuffer {
        let frames = (seconds * 8000.0) as usize;
        DecodedBuffer::new(1, 8000, vec![0.0; frames])
    }

    #[test]
    fn test_fresh_engine_reports_defaults() {
        let engine = silent_engine();
        assert!(!engine.is_buffer_loaded());
        assert!(!engine.is_paused());
        assert!(!engine.is_ended());
        assert_eq!(engine.elapsed_seconds(), 0.0);
        assert!(engine.duration_seconds().is_none());
        assert_eq!(engine.volume(), crate::audio::types::DEFAULT_VOLUME);
    }

    #[test]
    fn test_settings_feed_initial_state() {
        let engine = AudioEngine::new(EngineConfig {
            output: OutputMode::Silent,
            settings: AudioSettings {
                volume: 0.7,
                loop_enabled: true,
                muted: true,
            },
            ..EngineConfig::default()
        })
        .unwrap();
        assert!(engine.is_muted());
        assert_eq!(engine.volume(), 0.0);
        assert!(engine.is_loop_enabled());
    }

    #[test]
    fn test_listener_registration_replaces_per_kind() {
        let engine = silent_engine();
        let first = Arc::new(Mutex::new(0u32));
        let second = Arc::new(Mutex::new(0u32));

        let c = first.clone();
        engine.add_listeners(vec![EventListener::new(PlayerEvent::Start, move || {
            *c.lock().unwrap() += 1;
        })]);
        let c = second.clone();
        engine.add_listeners(vec![EventListener::new(PlayerEvent::Start, move || {
            *c.lock().unwrap() += 1;
        })]);

        engine.play_buffer(short_buffer(1.0), StartParams::default());
        let deadline = Instant::now() + Duration::from_secs(2);
        while *second.lock().unwrap() == 0 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(*first.lock().unwrap(), 0);
        assert_eq!(*second.lock().unwrap(), 1);
    }

    #[test]
    fn test_close_is_idempotent_and_commands_become_noops() {
        let engine = silent_engine();
        engine.close();
        engine.close();
        engine.play_buffer(short_buffer(0.5), StartParams::default());
        engine.pause();
        engine.set_volume(0.9);
        assert!(!engine.is_buffer_loaded());
        assert_eq!(engine.elapsed_seconds(), 0.0);
    }

    #[test]
    fn test_close_before_any_play_is_safe() {
        let engine = silent_engine();
        drop(engine);
    }
}
