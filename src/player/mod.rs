// src/player/mod.rs
//! Playback session layer: source fetching, the controller facade, and
//! the slider adapter that keeps a progress bar in sync with the engine.

pub mod controller;
pub mod fetch;
pub mod slider;

pub use controller::{AudioStates, PlayerController};
pub use fetch::{is_remote, DefaultFetch, FileFetch, HttpFetch, TrackFetch};
pub use slider::{SliderState, SliderSync};
