// src/audio/source.rs
//! A cloneable rodio source over a shared decoded buffer.
//!
//! Sinks consume sources, so seeking and restarting need a source that can
//! be recreated from the same samples at any offset. `BufferSource` is a
//! window (start offset, optional length cap) over a `DecodedBuffer`; the
//! loop path queues a second, full-span copy behind the first.

use std::time::Duration;

use rodio::Source;

use super::types::DecodedBuffer;

/// One playable window over a decoded buffer. Positions are raw sample
/// indices, always aligned to a frame boundary.
#[derive(Debug, Clone)]
pub struct BufferSource {
    buffer: DecodedBuffer,
    pos: usize,
    end: usize,
}

impl BufferSource {
    /// A window starting at `offset_seconds`, running to the end of the
    /// buffer or for `duration_limit` seconds, whichever is shorter.
    /// Out-of-range values are clamped, so the window is always valid
    /// (possibly empty).
    pub fn window(buffer: DecodedBuffer, offset_seconds: f64, duration_limit: Option<f64>) -> Self {
        let rate = buffer.sample_rate() as f64;
        let channels = buffer.channels() as usize;
        let total_frames = buffer.frames();

        let offset = offset_seconds.clamp(0.0, buffer.duration_seconds());
        let start_frame = ((offset * rate).round() as usize).min(total_frames);

        let end_frame = match duration_limit {
            Some(limit) => {
                let limit_frames = (limit.max(0.0) * rate).round() as usize;
                start_frame.saturating_add(limit_frames).min(total_frames)
            }
            None => total_frames,
        };

        Self {
            buffer,
            pos: start_frame * channels,
            end: end_frame * channels,
        }
    }

    /// The whole buffer, from the first frame.
    pub fn full(buffer: DecodedBuffer) -> Self {
        Self::window(buffer, 0.0, None)
    }

    /// Seconds left in this window.
    pub fn span_seconds(&self) -> f64 {
        let samples = self.end.saturating_sub(self.pos);
        let frames = samples / self.buffer.channels() as usize;
        frames as f64 / self.buffer.sample_rate() as f64
    }
}

impl Iterator for BufferSource {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        if self.pos >= self.end {
            return None;
        }
        let sample = self.buffer.samples()[self.pos];
        self.pos += 1;
        Some(sample)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end.saturating_sub(self.pos);
        (remaining, Some(remaining))
    }
}

impl Source for BufferSource {
    fn current_frame_len(&self) -> Option<usize> {
        Some(self.end.saturating_sub(self.pos))
    }

    fn channels(&self) -> u16 {
        self.buffer.channels()
    }

    fn sample_rate(&self) -> u32 {
        self.buffer.sample_rate()
    }

    fn total_duration(&self) -> Option<Duration> {
        Some(Duration::from_secs_f64(self.span_seconds()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer_1s_mono() -> DecodedBuffer {
        // Ramp samples make positions recognizable.
        let samples: Vec<f32> = (0..8000).map(|i| i as f32 / 8000.0).collect();
        DecodedBuffer::new(1, 8000, samples)
    }

    #[test]
    fn test_full_window_covers_buffer() {
        let src = BufferSource::full(buffer_1s_mono());
        assert_eq!(src.size_hint().0, 8000);
        assert!((src.span_seconds() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_offset_window_starts_at_offset() {
        let mut src = BufferSource::window(buffer_1s_mono(), 0.5, None);
        assert_eq!(src.size_hint().0, 4000);
        let first = src.next().unwrap();
        assert!((first - 0.5).abs() < 1e-3);
    }

    #[test]
    fn test_duration_limit_caps_window() {
        let src = BufferSource::window(buffer_1s_mono(), 0.25, Some(0.25));
        assert_eq!(src.size_hint().0, 2000);
        assert!((src.span_seconds() - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_offset_past_end_yields_empty_window() {
        let mut src = BufferSource::window(buffer_1s_mono(), 5.0, None);
        assert_eq!(src.span_seconds(), 0.0);
        assert!(src.next().is_none());
    }

    #[test]
    fn test_source_params_pass_through() {
        let buf = DecodedBuffer::new(2, 44100, vec![0.0; 88200]);
        let src = BufferSource::full(buf);
        assert_eq!(src.channels(), 2);
        assert_eq!(src.sample_rate(), 44100);
        assert!((src.total_duration().unwrap().as_secs_f64() - 1.0).abs() < 1e-6);
    }
}
