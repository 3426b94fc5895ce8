// src/player/controller.rs
//! The engine facade.
//!
//! Owns the engine for the session, registers its event listeners, and
//! derives the UI-facing `AudioStates` strictly from those events. Play
//! requests resolve bytes on a worker thread (fetch, then decode) behind
//! a generation counter, so when requests overlap, the last one issued
//! wins and stale decodes are discarded. Volume, loop, and mute changes
//! write through to the persisted settings store.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use tracing::{debug, info, warn};

use crate::audio::{
    AudioEngine, AudioSettings, EventListener, PlayerEvent, StartParams, DEFAULT_VOLUME,
};
use crate::config::SettingsStore;

use super::fetch::TrackFetch;
use super::slider::SliderSync;

/// UI-facing view of playback, recomputed on every engine event.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AudioStates {
    pub is_playing: bool,
    pub is_paused: bool,
    pub is_loaded: bool,
    pub is_ended: bool,
    pub is_resumed: bool,
    pub progress: f64,
    pub duration: f64,
}

struct ControllerInner {
    settings: AudioSettings,
    /// Prior non-zero volume, restored exactly on unmute. The engine
    /// only tracks the muted boolean; the memory lives here.
    volume_before_mute: f32,
    last_error: Option<String>,
    current_source: Option<String>,
}

/// Binds one engine instance to UI state containers and the settings
/// store; the only consumer of engine events.
pub struct PlayerController {
    engine: Arc<AudioEngine>,
    slider: Arc<SliderSync>,
    states: Arc<Mutex<AudioStates>>,
    store: SettingsStore,
    fetcher: Arc<dyn TrackFetch>,
    inner: Arc<Mutex<ControllerInner>>,
    play_generation: Arc<AtomicU64>,
}

impl PlayerController {
    pub fn new(
        engine: Arc<AudioEngine>,
        store: SettingsStore,
        settings: AudioSettings,
        fetcher: Arc<dyn TrackFetch>,
    ) -> Self {
        let slider = Arc::new(SliderSync::new(engine.clone()));
        let states = Arc::new(Mutex::new(AudioStates::default()));
        let inner = Arc::new(Mutex::new(ControllerInner {
            settings,
            volume_before_mute: settings.volume,
            last_error: None,
            current_source: None,
        }));

        let controller = Self {
            engine,
            slider,
            states,
            store,
            fetcher,
            inner,
            play_generation: Arc::new(AtomicU64::new(0)),
        };
        controller.register_listeners();
        controller
    }

    /// Wire the five engine events to state updates and slider
    /// start/stop. State is written before the slider reacts, so a
    /// redraw triggered mid-callback sees consistent values.
    fn register_listeners(&self) {
        let mut listeners = Vec::new();

        let engine = self.engine.clone();
        let states = self.states.clone();
        let slider = self.slider.clone();
        listeners.push(EventListener::new(PlayerEvent::Start, move || {
            if let Ok(mut s) = states.lock() {
                s.is_playing = true;
                s.is_paused = false;
                s.is_loaded = true;
                s.is_ended = false;
                s.is_resumed = false;
                s.duration = engine.duration_seconds().unwrap_or(0.0);
                s.progress = engine.elapsed_seconds();
            }
            slider.refresh();
        }));

        let states = self.states.clone();
        let slider = self.slider.clone();
        listeners.push(EventListener::new(PlayerEvent::End, move || {
            if let Ok(mut s) = states.lock() {
                s.is_playing = false;
                s.is_paused = false;
                s.is_ended = true;
                s.is_resumed = false;
                s.progress = 0.0;
            }
            slider.stop();
            slider.reset(0.0);
        }));

        let engine = self.engine.clone();
        let states = self.states.clone();
        let slider = self.slider.clone();
        listeners.push(EventListener::new(PlayerEvent::Pause, move || {
            if let Ok(mut s) = states.lock() {
                s.is_playing = false;
                s.is_paused = true;
                s.is_resumed = false;
                s.progress = engine.elapsed_seconds();
            }
            slider.stop();
        }));

        let states = self.states.clone();
        let slider = self.slider.clone();
        listeners.push(EventListener::new(PlayerEvent::Resume, move || {
            if let Ok(mut s) = states.lock() {
                s.is_playing = true;
                s.is_paused = false;
                s.is_resumed = true;
            }
            slider.refresh();
        }));

        let engine = self.engine.clone();
        let states = self.states.clone();
        let slider = self.slider.clone();
        listeners.push(EventListener::new(PlayerEvent::Tick, move || {
            let progress = engine.elapsed_seconds();
            if let Ok(mut s) = states.lock() {
                s.progress = progress;
            }
            // Keeps the gauge honest for seeks made while paused, when
            // the refresh loop is stopped.
            slider.sync(progress);
        }));

        self.engine.add_listeners(listeners);
    }

    /// Start playing `source` (path or URL). Resolution runs on a worker
    /// thread; fetch and decode failures land in `last_error` rather
    /// than interrupting whatever is already playing.
    pub fn play(&self, source: &str) {
        let generation = self.play_generation.fetch_add(1, Ordering::SeqCst) + 1;
        if let Ok(mut inner) = self.inner.lock() {
            inner.last_error = None;
            inner.current_source = Some(source.to_string());
        }
        if let Err(e) = self.store.save_broadcast(source) {
            warn!("could not persist current track: {}", e);
        }
        info!("playing {}", source);

        let engine = self.engine.clone();
        let fetcher = self.fetcher.clone();
        let inner = self.inner.clone();
        let latest = self.play_generation.clone();
        let source = source.to_string();
        thread::spawn(move || {
            let buffer = match fetcher.fetch(&source).and_then(AudioEngine::decode) {
                Ok(buffer) => buffer,
                Err(e) => {
                    warn!("play {} failed: {}", source, e);
                    // Only the newest request may surface its error.
                    if latest.load(Ordering::SeqCst) == generation {
                        if let Ok(mut inner) = inner.lock() {
                            inner.last_error = Some(e.to_string());
                        }
                    }
                    return;
                }
            };
            if latest.load(Ordering::SeqCst) != generation {
                // A newer play was issued while this one was in flight.
                debug!("discarding stale decode for {}", source);
                return;
            }
            engine.play_buffer(buffer, StartParams::default());
        });
    }

    pub fn pause(&self) {
        self.engine.pause();
    }

    pub fn resume(&self) {
        self.engine.resume();
    }

    /// Space-bar behavior: flip between paused and playing. Does nothing
    /// before the first track loads or after it ends.
    pub fn toggle_playback(&self) {
        if self.engine.is_paused() {
            self.engine.resume();
        } else if self.engine.is_buffer_loaded() && !self.engine.is_ended() {
            self.engine.pause();
        }
    }

    /// Set the volume; out-of-range values are ignored. Zero mutes.
    pub fn change_volume(&self, volume: f32) {
        if !(0.0..=1.0).contains(&volume) {
            return;
        }
        self.engine.set_volume(volume);
        let settings = match self.inner.lock() {
            Ok(mut inner) => {
                inner.settings.volume = volume;
                inner.settings.muted = volume == 0.0;
                if volume > 0.0 {
                    // This is the value an unmute restores.
                    inner.volume_before_mute = volume;
                }
                inner.settings
            }
            Err(_) => return,
        };
        self.persist_settings(settings);
    }

    /// Adjust volume relative to the current setting, clamped to [0, 1].
    pub fn volume_by(&self, delta: f32) {
        let current = self
            .inner
            .lock()
            .map(|i| i.settings.volume)
            .unwrap_or(DEFAULT_VOLUME);
        self.change_volume((current + delta).clamp(0.0, 1.0));
    }

    /// Mute to zero gain, or restore the remembered volume exactly.
    pub fn toggle_mute(&self) {
        let settings = match self.inner.lock() {
            Ok(mut inner) => {
                if inner.settings.muted {
                    let restore = if inner.volume_before_mute > 0.0 {
                        inner.volume_before_mute
                    } else {
                        DEFAULT_VOLUME
                    };
                    inner.settings.muted = false;
                    inner.settings.volume = restore;
                    self.engine.set_volume(restore);
                } else {
                    inner.volume_before_mute = inner.settings.volume;
                    inner.settings.muted = true;
                    self.engine.set_volume(0.0);
                }
                inner.settings
            }
            Err(_) => return,
        };
        self.persist_settings(settings);
    }

    pub fn toggle_loop(&self) {
        self.engine.toggle_loop();
        let settings = match self.inner.lock() {
            Ok(mut inner) => {
                inner.settings.loop_enabled = !inner.settings.loop_enabled;
                inner.settings
            }
            Err(_) => return,
        };
        self.persist_settings(settings);
    }

    /// Seek to an absolute position, clamped to the track bounds.
    pub fn change_progress(&self, seconds: f64) {
        let Some(duration) = self.engine.duration_seconds() else {
            return;
        };
        self.engine.set_progress(seconds.clamp(0.0, duration));
    }

    /// Seek relative to the current position.
    pub fn seek_by(&self, delta: f64) {
        let Some(duration) = self.engine.duration_seconds() else {
            return;
        };
        let target = (self.engine.elapsed_seconds() + delta).clamp(0.0, duration);
        self.engine.set_progress(target);
    }

    pub fn states(&self) -> AudioStates {
        self.states.lock().map(|s| *s).unwrap_or_default()
    }

    pub fn settings(&self) -> AudioSettings {
        self.inner
            .lock()
            .map(|i| i.settings)
            .unwrap_or_default()
    }

    pub fn last_error(&self) -> Option<String> {
        self.inner.lock().ok().and_then(|i| i.last_error.clone())
    }

    pub fn current_source(&self) -> Option<String> {
        self.inner
            .lock()
            .ok()
            .and_then(|i| i.current_source.clone())
    }

    pub fn slider(&self) -> Arc<SliderSync> {
        self.slider.clone()
    }

    /// Tear down the session: stops the slider and closes the engine.
    pub fn close(&self) {
        self.slider.stop();
        self.engine.close();
    }

    fn persist_settings(&self, settings: AudioSettings) {
        if let Err(e) = self.store.save_settings(&settings) {
            warn!("could not persist settings: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_states_default_is_idle() {
        let s = AudioStates::default();
        assert!(!s.is_playing && !s.is_paused && !s.is_loaded && !s.is_ended);
        assert_eq!(s.progress, 0.0);
        assert_eq!(s.duration, 0.0);
    }
}
