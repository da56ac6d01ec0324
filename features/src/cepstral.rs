//! Log-mel, DCT and delta computations for cepstral features.

use std::f64::consts::PI;

/// Converts a power spectrogram to decibels in place.
///
/// Computes `10 * log10(max(amin, S))` (reference power 1.0), then raises
/// every value to at least `max - top_db`, where `max` is taken over the
/// whole spectrogram.
pub(crate) fn power_to_db(spec: &mut [Vec<f64>], amin: f64, top_db: Option<f64>) {
    let mut max = f64::NEG_INFINITY;
    for frame in spec.iter_mut() {
        for v in frame.iter_mut() {
            *v = 10.0 * v.max(amin).log10();
            max = max.max(*v);
        }
    }
    if let Some(top_db) = top_db {
        let floor = max - top_db;
        for frame in spec.iter_mut() {
            for v in frame.iter_mut() {
                *v = v.max(floor);
            }
        }
    }
}

/// Builds the first `n_out` rows of the orthonormal DCT-II matrix of size `n_in`.
pub(crate) fn dct_basis(n_out: usize, n_in: usize) -> Vec<Vec<f64>> {
    let n = n_in as f64;
    (0..n_out)
        .map(|k| {
            let scale = if k == 0 { (1.0 / n).sqrt() } else { (2.0 / n).sqrt() };
            (0..n_in)
                .map(|i| scale * (PI * k as f64 * (2 * i + 1) as f64 / (2.0 * n)).cos())
                .collect()
        })
        .collect()
}

/// Projects each log-mel frame onto the DCT basis: `[frames][n_out]`.
pub(crate) fn cepstra(log_mel: &[Vec<f64>], basis: &[Vec<f64>]) -> Vec<Vec<f64>> {
    log_mel
        .iter()
        .map(|frame| {
            basis
                .iter()
                .map(|row| row.iter().zip(frame).map(|(b, x)| b * x).sum())
                .collect()
        })
        .collect()
}

/// First-order delta of a frame sequence `[frames][dims]` along time.
///
/// Each frame takes the least-squares slope over a centered window of
/// `width` frames. Frames closer than `width / 2` to either end reuse the
/// slope of the first or last full window. When the sequence is shorter
/// than `width`, the width shrinks to the largest odd value that fits; with
/// fewer than 3 frames every delta is 0.
pub(crate) fn delta(seq: &[Vec<f64>], width: usize) -> Vec<Vec<f64>> {
    let frames = seq.len();
    let dims = seq.first().map_or(0, |f| f.len());

    let mut width = width.min(frames);
    if width % 2 == 0 {
        width = width.saturating_sub(1);
    }
    if width < 3 {
        return vec![vec![0.0; dims]; frames];
    }

    let half = width / 2;
    let denom: f64 = (1..=half).map(|k| 2.0 * (k * k) as f64).sum();
    let slope_at = |t: usize, d: usize| -> f64 {
        (1..=half)
            .map(|k| k as f64 * (seq[t + k][d] - seq[t - k][d]))
            .sum::<f64>()
            / denom
    };

    (0..frames)
        .map(|t| {
            let center = t.clamp(half, frames - 1 - half);
            (0..dims).map(|d| slope_at(center, d)).collect()
        })
        .collect()
}
