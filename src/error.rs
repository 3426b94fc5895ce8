// src/error.rs
//! Error types shared across the crate.

use thiserror::Error;

/// Errors surfaced by the playback engine, the fetch layer, and the
/// settings store.
///
/// Out-of-range volume or seek arguments are deliberately *not* errors:
/// those calls are silent no-ops so UI controls stay callable in any state.
#[derive(Error, Debug)]
pub enum PlayerError {
    /// Bytes could not be decoded as a supported audio encoding.
    #[error("decode error: {0}")]
    Decode(String),

    /// A track source could not be fetched (file read or HTTP).
    #[error("fetch error: {0}")]
    Fetch(String),

    /// The audio output device could not be opened or driven.
    #[error("audio output error: {0}")]
    Output(String),

    /// The settings store could not be read or written.
    #[error("settings error: {0}")]
    Settings(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PlayerError>;
