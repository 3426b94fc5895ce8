// src/audio/types.rs
//! Shared types for the playback engine: decoded buffers, start
//! parameters, event kinds, and persisted audio settings.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default playback volume for a fresh install.
pub const DEFAULT_VOLUME: f32 = 0.5;

/// Default interval between `tick` events.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// One fully decoded track: interleaved f32 samples plus the stream
/// parameters needed to play them back.
///
/// The sample data sits behind an `Arc`, so cloning is cheap; every seek
/// and restart replays the same decoded buffer.
#[derive(Clone)]
pub struct DecodedBuffer {
    channels: u16,
    sample_rate: u32,
    samples: Arc<Vec<f32>>,
}

impl DecodedBuffer {
    pub fn new(channels: u16, sample_rate: u32, samples: Vec<f32>) -> Self {
        Self {
            channels: channels.max(1),
            sample_rate: sample_rate.max(1),
            samples: Arc::new(samples),
        }
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn samples(&self) -> &Arc<Vec<f32>> {
        &self.samples
    }

    /// Number of interleaved frames (samples per channel).
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    /// Total playable length in seconds.
    pub fn duration_seconds(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }
}

impl fmt::Debug for DecodedBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodedBuffer")
            .field("channels", &self.channels)
            .field("sample_rate", &self.sample_rate)
            .field("frames", &self.frames())
            .finish()
    }
}

/// Options for starting playback of a decoded buffer.
///
/// `offset_seconds` positions the playhead; `duration_limit` caps how much
/// of the buffer plays (ignored while looping, where the span is always the
/// full buffer); `loop_override` takes precedence over the persisted loop
/// flag for this start only.
#[derive(Debug, Clone, Copy, Default)]
pub struct StartParams {
    pub offset_seconds: f64,
    pub duration_limit: Option<f64>,
    pub loop_override: Option<bool>,
}

impl StartParams {
    pub fn at_offset(offset_seconds: f64) -> Self {
        Self {
            offset_seconds,
            ..Self::default()
        }
    }
}

/// The five event kinds the engine emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerEvent {
    Start,
    End,
    Pause,
    Resume,
    Tick,
}

impl fmt::Display for PlayerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PlayerEvent::Start => "start",
            PlayerEvent::End => "end",
            PlayerEvent::Pause => "pause",
            PlayerEvent::Resume => "resume",
            PlayerEvent::Tick => "tick",
        };
        write!(f, "{}", s)
    }
}

/// Callback invoked on the engine thread when its event fires.
pub type EventCallback = Box<dyn FnMut() + Send>;

/// A callback bound to one event kind. Registering a listener for a kind
/// replaces any previous listener for that kind.
pub struct EventListener {
    pub event: PlayerEvent,
    pub callback: EventCallback,
}

impl EventListener {
    pub fn new(event: PlayerEvent, callback: impl FnMut() + Send + 'static) -> Self {
        Self {
            event,
            callback: Box::new(callback),
        }
    }
}

impl fmt::Debug for EventListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventListener")
            .field("event", &self.event)
            .finish()
    }
}

/// Persisted playback settings. Serialized keys keep the store's
/// historical shape (`volume`, `loop`, `muted`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AudioSettings {
    #[serde(default = "default_volume")]
    pub volume: f32,
    #[serde(rename = "loop", default)]
    pub loop_enabled: bool,
    #[serde(default)]
    pub muted: bool,
}

fn default_volume() -> f32 {
    DEFAULT_VOLUME
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            volume: DEFAULT_VOLUME,
            loop_enabled: false,
            muted: false,
        }
    }
}

/// Where decoded audio goes.
///
/// `Silent` keeps every transport and timer semantic but opens no device;
/// engine tests run headless with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    #[default]
    Device,
    Silent,
}

/// Engine construction options.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub settings: AudioSettings,
    pub tick_interval: Duration,
    pub output: OutputMode,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            settings: AudioSettings::default(),
            tick_interval: TICK_INTERVAL,
            output: OutputMode::Device,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_defaults() {
        let s = AudioSettings::default();
        assert_eq!(s.volume, DEFAULT_VOLUME);
        assert!(!s.loop_enabled);
        assert!(!s.muted);
    }

    #[test]
    fn test_settings_serde_key_names() {
        let s = AudioSettings {
            volume: 0.8,
            loop_enabled: true,
            muted: false,
        };
        let json = serde_json::to_string(&s).unwrap();
        assert!(json.contains("\"loop\":true"));
        let back: AudioSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn test_settings_missing_fields_use_defaults() {
        let s: AudioSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(s, AudioSettings::default());
    }

    #[test]
    fn test_decoded_buffer_duration() {
        let buf = DecodedBuffer::new(2, 8000, vec![0.0; 16000]);
        assert_eq!(buf.frames(), 8000);
        assert!((buf.duration_seconds() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_decoded_buffer_guards_zero_channels() {
        let buf = DecodedBuffer::new(0, 0, vec![0.0; 4]);
        assert_eq!(buf.channels(), 1);
        assert_eq!(buf.frames(), 4);
    }

    #[test]
    fn test_start_params_default() {
        let p = StartParams::default();
        assert_eq!(p.offset_seconds, 0.0);
        assert!(p.duration_limit.is_none());
        assert!(p.loop_override.is_none());
    }

    #[test]
    fn test_event_display_names() {
        assert_eq!(PlayerEvent::Start.to_string(), "start");
        assert_eq!(PlayerEvent::Tick.to_string(), "tick");
    }
}
