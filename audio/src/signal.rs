//! PCM signal types.
//!
//! Decoders produce [`InterleavedPcm`], which is reduced to a mono
//! [`PcmSignal`] by [`downmix`]. Only a [`CanonicalSignal`] (mono at
//! [`CANONICAL_RATE`]) is accepted by feature extraction.

use std::time::Duration;

use crate::error::ResampleError;
use crate::resampler;

/// The fixed analysis rate, in Hz.
pub const CANONICAL_RATE: u32 = 16000;

/// Interleaved multi-channel samples as produced by a decoder.
#[derive(Debug, Clone, PartialEq)]
pub struct InterleavedPcm {
    /// Samples in `[frame0_ch0, frame0_ch1, ..., frame1_ch0, ...]` order.
    pub samples: Vec<f32>,
    /// Number of channels (at least 1).
    pub channels: usize,
    /// Native sample rate in Hz.
    pub sample_rate: u32,
}

impl InterleavedPcm {
    /// Returns the number of complete frames.
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels.max(1)
    }
}

/// Mono PCM samples tagged with their sample rate.
#[derive(Debug, Clone, PartialEq)]
pub struct PcmSignal {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl PcmSignal {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self { samples, sample_rate }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Returns the signal duration.
    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.samples.len() as f64 / self.sample_rate as f64)
    }

    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }

    /// Resamples to [`CANONICAL_RATE`]. A signal already at that rate is
    /// passed through untouched.
    pub fn into_canonical(self) -> Result<CanonicalSignal, ResampleError> {
        if self.sample_rate == CANONICAL_RATE {
            return Ok(CanonicalSignal { samples: self.samples });
        }
        let samples = resampler::resample(&self.samples, self.sample_rate, CANONICAL_RATE)?;
        Ok(CanonicalSignal { samples })
    }
}

/// Mono signal at [`CANONICAL_RATE`].
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalSignal {
    samples: Vec<f32>,
}

impl CanonicalSignal {
    /// Wraps samples that are already mono at [`CANONICAL_RATE`].
    pub fn from_samples(samples: Vec<f32>) -> Self {
        Self { samples }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        CANONICAL_RATE
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Averages channels sample-wise into a single mono channel.
///
/// Uses the arithmetic mean of each frame. A trailing partial frame is
/// dropped.
pub fn downmix(pcm: InterleavedPcm) -> PcmSignal {
    let InterleavedPcm {
        samples,
        channels,
        sample_rate,
    } = pcm;
    if channels <= 1 {
        return PcmSignal::new(samples, sample_rate);
    }
    let mono = samples
        .chunks_exact(channels)
        .map(|frame| frame.iter().map(|&s| s as f64).sum::<f64>() / channels as f64)
        .map(|s| s as f32)
        .collect();
    PcmSignal::new(mono, sample_rate)
}
