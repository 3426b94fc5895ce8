// src/audio/decode.rs
//! Whole-buffer decoding of raw track bytes.
//!
//! Purely functional: bytes in, `DecodedBuffer` out. The engine replays
//! the decoded samples on every seek and restart, so the full track is
//! decoded up front instead of streaming from the reader.

use std::io::Cursor;

use rodio::{Decoder, Source};

use crate::error::{PlayerError, Result};

use super::types::DecodedBuffer;

/// Decode raw bytes into an in-memory sample buffer.
///
/// Fails with [`PlayerError::Decode`] when the bytes are not a supported
/// audio encoding or the stream decodes to zero frames.
pub fn decode_bytes(bytes: Vec<u8>) -> Result<DecodedBuffer> {
    let decoder =
        Decoder::new(Cursor::new(bytes)).map_err(|e| PlayerError::Decode(e.to_string()))?;

    let converted = decoder.convert_samples::<f32>();
    let channels = converted.channels();
    let sample_rate = converted.sample_rate();
    let samples: Vec<f32> = converted.collect();

    if samples.is_empty() {
        return Err(PlayerError::Decode(
            "stream contains no audio frames".into(),
        ));
    }

    Ok(DecodedBuffer::new(channels, sample_rate, samples))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wav_bytes(seconds: f64) -> Vec<u8> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut bytes = Vec::new();
        {
            let mut writer = hound::WavWriter::new(Cursor::new(&mut bytes), spec).unwrap();
            let n = (seconds * 8000.0) as usize;
            for i in 0..n {
                let t = i as f32 / 8000.0;
                let v = (t * 440.0 * std::f32::consts::TAU).sin();
                writer.write_sample((v * 0.5 * i16::MAX as f32) as i16).unwrap();
            }
            writer.finalize().unwrap();
        }
        bytes
    }

    #[test]
    fn test_decode_generated_wav() {
        let buf = decode_bytes(wav_bytes(0.5)).unwrap();
        assert_eq!(buf.channels(), 1);
        assert_eq!(buf.sample_rate(), 8000);
        assert!((buf.duration_seconds() - 0.5).abs() < 0.01);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let err = decode_bytes(vec![0x13, 0x37, 0xba, 0xad, 0xf0, 0x0d]).unwrap_err();
        assert!(matches!(err, PlayerError::Decode(_)));
    }

    #[test]
    fn test_decode_rejects_empty_input() {
        assert!(decode_bytes(Vec::new()).is_err());
    }
}
