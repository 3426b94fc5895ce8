// src/audio/output.rs
//! Output device handling and the per-play playback graph.

use rodio::{OutputStream, OutputStreamHandle, Sink, Source};

use crate::error::{PlayerError, Result};

use super::types::OutputMode;

/// The audio thread's handle to the output device.
///
/// The stream is not `Send`, so it is opened and owned on the audio thread
/// and must outlive every sink built from it.
pub(crate) enum AudioOutput {
    Device {
        _stream: OutputStream,
        handle: OutputStreamHandle,
    },
    Silent,
}

impl AudioOutput {
    /// Open the requested output. `Silent` always succeeds.
    pub(crate) fn open(mode: OutputMode) -> Result<Self> {
        match mode {
            OutputMode::Device => {
                let (stream, handle) =
                    OutputStream::try_default().map_err(|e| PlayerError::Output(e.to_string()))?;
                Ok(Self::Device {
                    _stream: stream,
                    handle,
                })
            }
            OutputMode::Silent => Ok(Self::Silent),
        }
    }

    /// Build a fresh graph with the gain preset, optionally starting
    /// paused so a seek-while-paused makes no sound.
    pub(crate) fn build_graph(&self, volume: f32, paused: bool) -> Result<PlaybackGraph> {
        let sink = match self {
            Self::Device { handle, .. } => {
                Some(Sink::try_new(handle).map_err(|e| PlayerError::Output(e.to_string()))?)
            }
            Self::Silent => None,
        };
        let graph = PlaybackGraph { sink };
        graph.set_volume(volume);
        if paused {
            graph.pause();
        }
        Ok(graph)
    }
}

/// The live pipeline: one sink holding the queued buffer window, gain
/// applied at the sink. Dropping the graph stops its audio, which is how
/// the at-most-one-graph invariant is enforced — building a replacement
/// drops the previous graph. In silent mode there is no sink and every
/// operation is a no-op; timer-driven semantics are unaffected.
pub(crate) struct PlaybackGraph {
    sink: Option<Sink>,
}

impl PlaybackGraph {
    pub(crate) fn append(&self, source: impl Source<Item = f32> + Send + 'static) {
        if let Some(sink) = &self.sink {
            sink.append(source);
        }
    }

    pub(crate) fn play(&self) {
        if let Some(sink) = &self.sink {
            sink.play();
        }
    }

    pub(crate) fn pause(&self) {
        if let Some(sink) = &self.sink {
            sink.pause();
        }
    }

    pub(crate) fn set_volume(&self, volume: f32) {
        if let Some(sink) = &self.sink {
            sink.set_volume(volume);
        }
    }
}
