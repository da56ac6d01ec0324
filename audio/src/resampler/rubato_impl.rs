//! Rubato-based resampler implementation.
//!
//! Uses rubato's synchronous FFT resampler, a pure Rust implementation
//! without any FFI dependencies. The whole signal is streamed through in
//! fixed input chunks; the filter delay is trimmed from the front and the
//! output is cut to `ceil(len * to / from)` samples.

use rubato::{FftFixedIn, Resampler};
use tracing::debug;

use crate::error::ResampleError;

/// Input frames per processing block.
const CHUNK_SIZE: usize = 1024;

/// Sub-chunks per block; more sub-chunks trade FFT size for latency.
const SUB_CHUNKS: usize = 2;

/// Lowest accepted sample rate.
pub const MIN_RATE: u32 = 1_000;

/// Highest accepted sample rate.
pub const MAX_RATE: u32 = 768_000;

/// Largest reduced rate (`rate / gcd(from, to)`). The FFT resampler sizes
/// its filter from this value.
const MAX_REDUCED_RATE: u32 = 1 << 16;

/// Converts mono samples from `from_rate` to `to_rate`.
///
/// Returns the input unchanged when the rates are equal. Rates outside
/// [`MIN_RATE`]..=[`MAX_RATE`], or a ratio that does not reduce to small
/// terms, are rejected before any filter is allocated.
pub fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>, ResampleError> {
    check_rates(from_rate, to_rate)?;
    if from_rate == to_rate {
        return Ok(samples.to_vec());
    }
    if samples.is_empty() {
        return Ok(Vec::new());
    }

    let mut resampler = FftFixedIn::<f64>::new(
        from_rate as usize,
        to_rate as usize,
        CHUNK_SIZE,
        SUB_CHUNKS,
        1,
    )?;

    let delay = resampler.output_delay();
    let expected = output_len(samples.len(), from_rate, to_rate);
    let wanted = expected + delay;

    let mut output: Vec<f64> = Vec::with_capacity(wanted);
    let mut chunk: Vec<f64> = Vec::with_capacity(resampler.input_frames_next());
    let mut pos = 0usize;

    while output.len() < wanted {
        let frames_needed = resampler.input_frames_next();
        chunk.clear();
        if pos < samples.len() {
            let end = (pos + frames_needed).min(samples.len());
            chunk.extend(samples[pos..end].iter().map(|&s| s as f64));
        }
        // Zero-pad the tail so the filter flushes.
        chunk.resize(frames_needed, 0.0);
        pos += frames_needed;

        let block = resampler.process(&[&chunk[..]], None)?;
        match block.into_iter().next() {
            Some(ch) if !ch.is_empty() => output.extend_from_slice(&ch),
            _ => {
                return Err(ResampleError::Rubato(
                    "resampler produced no output".to_string(),
                ));
            }
        }
    }

    output.drain(..delay.min(output.len()));
    output.truncate(expected);

    debug!(
        from_rate,
        to_rate,
        input = samples.len(),
        output = output.len(),
        "resampled"
    );

    Ok(output.into_iter().map(|s| s as f32).collect())
}

fn check_rates(from_rate: u32, to_rate: u32) -> Result<(), ResampleError> {
    let invalid = ResampleError::InvalidRate {
        from: from_rate,
        to: to_rate,
    };
    let band = MIN_RATE..=MAX_RATE;
    if !band.contains(&from_rate) || !band.contains(&to_rate) {
        return Err(invalid);
    }
    let g = gcd(from_rate, to_rate);
    if from_rate / g > MAX_REDUCED_RATE || to_rate / g > MAX_REDUCED_RATE {
        return Err(invalid);
    }
    Ok(())
}

fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Number of output samples for `len` input samples: `ceil(len * to / from)`.
fn output_len(len: usize, from_rate: u32, to_rate: u32) -> usize {
    let num = len as u64 * to_rate as u64;
    num.div_ceil(from_rate as u64) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn sine(freq: f64, rate: u32, seconds: f64) -> Vec<f32> {
        let n = (rate as f64 * seconds) as usize;
        (0..n)
            .map(|i| (2.0 * PI * freq * i as f64 / rate as f64).sin() as f32)
            .collect()
    }

    #[test]
    fn test_same_rate_is_identity() {
        let input = sine(440.0, 16000, 0.25);
        let output = resample(&input, 16000, 16000).unwrap();
        assert_eq!(output, input);
    }

    #[test]
    fn test_zero_rate_rejected() {
        assert!(matches!(
            resample(&[0.0; 4], 0, 16000),
            Err(ResampleError::InvalidRate { from: 0, to: 16000 })
        ));
        assert!(matches!(
            resample(&[0.0; 4], 16000, 0),
            Err(ResampleError::InvalidRate { .. })
        ));
    }

    #[test]
    fn test_out_of_band_rate_rejected() {
        for rate in [1, 999, 768_001, 4_294_967_291] {
            assert!(
                matches!(
                    resample(&[0.0; 64], rate, 16000),
                    Err(ResampleError::InvalidRate { .. })
                ),
                "rate {rate}"
            );
        }
        assert!(resample(&[0.0; 64], 16000, 1).is_err());
        assert!(resample(&[0.0; 64], MIN_RATE, 16000).is_ok());
        assert!(resample(&[0.0; 64], MAX_RATE, 16000).is_ok());
    }

    #[test]
    fn test_irreducible_ratio_rejected() {
        // Odd and not a multiple of 5: gcd with 16000 is 1.
        assert!(matches!(
            resample(&[0.0; 64], 767_999, 16000),
            Err(ResampleError::InvalidRate { from: 767_999, to: 16000 })
        ));
        for rate in [8000, 11025, 22050, 44100, 47952, 88200, 192_000, 352_800] {
            assert!(resample(&[0.0; 64], rate, 16000).is_ok(), "rate {rate}");
        }
    }

    #[test]
    fn test_gcd() {
        assert_eq!(gcd(44100, 16000), 100);
        assert_eq!(gcd(48000, 16000), 16000);
        assert_eq!(gcd(767_999, 16000), 1);
    }

    #[test]
    fn test_empty_input() {
        assert!(resample(&[], 44100, 16000).unwrap().is_empty());
    }

    #[test]
    fn test_output_len() {
        assert_eq!(output_len(44100, 44100, 16000), 16000);
        assert_eq!(output_len(48000, 48000, 16000), 16000);
        assert_eq!(output_len(1, 44100, 16000), 1);
        assert_eq!(output_len(3, 8000, 16000), 6);
    }

    #[test]
    fn test_downsample_length() {
        let input = sine(440.0, 44100, 1.0);
        let output = resample(&input, 44100, 16000).unwrap();
        assert_eq!(output.len(), 16000);
    }

    #[test]
    fn test_upsample_length() {
        let input = sine(440.0, 8000, 0.5);
        let output = resample(&input, 8000, 16000).unwrap();
        assert_eq!(output.len(), 8000);
    }

    #[test]
    fn test_downsample_preserves_tone() {
        let input = sine(440.0, 48000, 1.0);
        let output = resample(&input, 48000, 16000).unwrap();
        let reference = sine(440.0, 16000, 1.0);

        // Skip the edges where the filter sees zero padding.
        let mid = 2000..14000;
        let max_err = output[mid.clone()]
            .iter()
            .zip(&reference[mid])
            .map(|(a, b)| (a - b).abs())
            .fold(0.0f32, f32::max);
        assert!(max_err < 0.05, "max error {max_err}");
    }

    #[test]
    fn test_short_input() {
        let output = resample(&[0.5; 10], 44100, 16000).unwrap();
        assert_eq!(output.len(), 4);
    }

    #[test]
    fn test_deterministic() {
        let input = sine(220.0, 22050, 0.3);
        let a = resample(&input, 22050, 16000).unwrap();
        let b = resample(&input, 22050, 16000).unwrap();
        assert_eq!(a, b);
    }
}
