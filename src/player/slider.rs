// src/player/slider.rs
//! Progress display adapter.
//!
//! Owns the only periodic polling in the player: a short-interval refresh
//! loop started on `start`/`resume` and stopped on `pause`/`end`, reading
//! the engine's elapsed/duration into a display snapshot for the UI. The
//! loop also stops itself once elapsed passes the duration, which guards
//! against drift in the moments before the completion timer lands. Drags
//! suspend live updates and commit a single seek on release.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crate::audio::AudioEngine;

/// Refresh cadence for the progress display.
pub const REFRESH_INTERVAL: Duration = Duration::from_millis(50);

/// Display values the UI renders.
#[derive(Debug, Clone, Copy, Default)]
pub struct SliderState {
    pub progress: f64,
    pub duration: f64,
    pub dragging: bool,
}

/// Keeps the visual progress control in sync with the engine without the
/// engine knowing about any widget.
pub struct SliderSync {
    engine: Arc<AudioEngine>,
    state: Mutex<SliderState>,
    /// Flag owned by the current refresh thread; replaced on every
    /// restart so a stale loop can never overwrite a newer one.
    run_flag: Mutex<Arc<AtomicBool>>,
}

impl SliderSync {
    pub fn new(engine: Arc<AudioEngine>) -> Self {
        Self {
            engine,
            state: Mutex::new(SliderState::default()),
            run_flag: Mutex::new(Arc::new(AtomicBool::new(false))),
        }
    }

    /// Start (or restart) the periodic refresh.
    pub fn refresh(self: &Arc<Self>) {
        let flag = Arc::new(AtomicBool::new(true));
        if let Ok(mut current) = self.run_flag.lock() {
            current.store(false, Ordering::SeqCst);
            *current = flag.clone();
        }

        let slider = self.clone();
        thread::spawn(move || {
            while flag.load(Ordering::SeqCst) {
                let Some(duration) = slider.engine.duration_seconds() else {
                    break;
                };
                let elapsed = slider.engine.elapsed_seconds();
                let past_end = elapsed > duration;

                if let Ok(mut state) = slider.state.lock() {
                    state.duration = duration;
                    if !state.dragging {
                        state.progress = elapsed.min(duration);
                    }
                }
                if past_end {
                    break;
                }
                thread::sleep(REFRESH_INTERVAL);
            }
            flag.store(false, Ordering::SeqCst);
        });
    }

    /// Stop the refresh loop.
    pub fn stop(&self) {
        if let Ok(current) = self.run_flag.lock() {
            current.store(false, Ordering::SeqCst);
        }
    }

    /// Whether a refresh loop is currently running.
    pub fn is_refreshing(&self) -> bool {
        self.run_flag
            .lock()
            .map(|f| f.load(Ordering::SeqCst))
            .unwrap_or(false)
    }

    /// Reset the displayed position (used when playback ends).
    pub fn reset(&self, progress: f64) {
        if let Ok(mut state) = self.state.lock() {
            state.progress = progress;
        }
    }

    /// Push a position into the display outside the refresh loop, so a
    /// seek lands on screen even while the loop is stopped (paused).
    /// Ignored mid-drag.
    pub fn sync(&self, progress: f64) {
        if let Ok(mut state) = self.state.lock() {
            if !state.dragging {
                state.progress = progress;
            }
        }
    }

    pub fn snapshot(&self) -> SliderState {
        self.state
            .lock()
            .map(|s| *s)
            .unwrap_or_default()
    }

    /// Begin a drag gesture: live updates are suspended until release.
    pub fn begin_drag(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.dragging = true;
        }
    }

    /// Move the drag target; only the display changes, never the engine.
    pub fn drag_to(&self, seconds: f64) {
        if let Ok(mut state) = self.state.lock() {
            if state.dragging {
                state.progress = seconds.clamp(0.0, state.duration);
            }
        }
    }

    /// End the drag and return the position to commit.
    pub fn end_drag(&self) -> f64 {
        match self.state.lock() {
            Ok(mut state) => {
                state.dragging = false;
                state.progress
            }
            Err(_) => 0.0,
        }
    }
}
