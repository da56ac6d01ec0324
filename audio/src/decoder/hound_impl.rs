//! Strict WAV reader via hound.

use std::io::Cursor;

use hound::{SampleFormat, WavReader};

use super::DecodeStrategy;
use crate::error::DecodeError;
use crate::signal::InterleavedPcm;

const NAME: &str = "wav";

/// Sample-accurate RIFF/WAVE reader.
///
/// Supports integer PCM of 8-32 bits and 32-bit float. Integer samples are
/// scaled by `2^(bits - 1)` into `[-1, 1)`.
#[derive(Debug, Default, Clone, Copy)]
pub struct WavDecoder;

impl DecodeStrategy for WavDecoder {
    fn name(&self) -> &'static str {
        NAME
    }

    fn decode(&self, bytes: &[u8]) -> Result<InterleavedPcm, DecodeError> {
        let mut reader =
            WavReader::new(Cursor::new(bytes)).map_err(|e| DecodeError::backend(NAME, e))?;
        let spec = reader.spec();

        let samples = match spec.sample_format {
            SampleFormat::Float => reader
                .samples::<f32>()
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| DecodeError::backend(NAME, e))?,
            SampleFormat::Int => {
                let scale = (1i64 << spec.bits_per_sample.saturating_sub(1)).max(1) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / scale))
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|e| DecodeError::backend(NAME, e))?
            }
        };

        Ok(InterleavedPcm {
            samples,
            channels: spec.channels.max(1) as usize,
            sample_rate: spec.sample_rate,
        })
    }
}
