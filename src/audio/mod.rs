// src/audio/mod.rs
//! Audio module - the playback engine, decoding, and track metadata.

pub mod decode;
pub mod engine;
pub mod metadata;
pub mod output;
pub mod source;
pub mod types;

// Re-export commonly used types
pub use decode::decode_bytes;
pub use engine::AudioEngine;
pub use metadata::{TagEntry, TrackMetadata, load_metadata};
pub use source::BufferSource;
pub use types::{
    AudioSettings, DecodedBuffer, EngineConfig, EventCallback, EventListener, OutputMode,
    PlayerEvent, StartParams, DEFAULT_VOLUME, TICK_INTERVAL,
};
