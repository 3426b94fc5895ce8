// src/lib.rs
//! Tremolo - a terminal music player with transport controls.
//!
//! This library provides all the core functionality for the tremolo
//! player: the audio engine, the playback controller, and the TUI.

pub mod app;
pub mod audio;
pub mod config;
pub mod error;
pub mod fs;
pub mod logging;
pub mod player;
pub mod ui;
