//! Centered framing and the magnitude spectrogram.
//!
//! Frames are centered on multiples of the hop: the signal is padded by
//! `frame_len / 2` on both sides, giving `1 + len / hop` frames.

use std::f64::consts::PI;
use std::sync::Arc;

use realfft::{RealFftPlanner, RealToComplex};

use crate::error::FeatureError;

/// Forward real FFT plan, shareable across threads.
pub(crate) type FftPlan = Arc<dyn RealToComplex<f64>>;

/// Plans a forward real FFT of `n_fft` points.
pub(crate) fn plan_fft(n_fft: usize) -> FftPlan {
    RealFftPlanner::<f64>::new().plan_fft_forward(n_fft)
}

/// How samples outside the signal are filled when framing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Padding {
    /// Zeros.
    Zero,
    /// Repeat the first / last sample.
    Edge,
}

/// Generates a periodic Hann window of the given length.
pub(crate) fn hann_window(n: usize) -> Vec<f64> {
    if n <= 1 {
        return vec![1.0; n];
    }
    (0..n)
        .map(|i| 0.5 - 0.5 * (2.0 * PI * i as f64 / n as f64).cos())
        .collect()
}

/// Number of centered frames for a signal of `len` samples.
pub(crate) fn frame_count(len: usize, hop: usize) -> usize {
    1 + len / hop
}

/// Copies centered frame `t` into `out` (whose length is the frame length).
pub(crate) fn centered_frame(y: &[f64], t: usize, hop: usize, padding: Padding, out: &mut [f64]) {
    let pad = out.len() / 2;
    let start = (t * hop) as isize - pad as isize;
    let last = y.len() as isize - 1;
    for (i, v) in out.iter_mut().enumerate() {
        let j = start + i as isize;
        *v = if (0..=last).contains(&j) {
            y[j as usize]
        } else {
            match padding {
                Padding::Zero => 0.0,
                Padding::Edge if j < 0 => y.first().copied().unwrap_or(0.0),
                Padding::Edge => y.last().copied().unwrap_or(0.0),
            }
        };
    }
}

/// Computes the magnitude spectrogram as `[frames][fft_size / 2 + 1]`.
///
/// Each zero-padded centered frame of `window.len()` samples is windowed
/// and transformed with `fft`, which must be planned for `window.len()`
/// points.
pub(crate) fn magnitude_spectrogram(
    y: &[f64],
    window: &[f64],
    hop: usize,
    fft: &dyn RealToComplex<f64>,
) -> Result<Vec<Vec<f64>>, FeatureError> {
    let frames = frame_count(y.len(), hop);

    let mut input = fft.make_input_vec();
    let mut output = fft.make_output_vec();
    let mut scratch = fft.make_scratch_vec();
    let mut spec = Vec::with_capacity(frames);

    for t in 0..frames {
        centered_frame(y, t, hop, Padding::Zero, &mut input);
        for (s, w) in input.iter_mut().zip(window) {
            *s *= w;
        }
        fft.process_with_scratch(&mut input, &mut output, &mut scratch)?;
        spec.push(output.iter().map(|c| c.norm()).collect());
    }
    Ok(spec)
}
