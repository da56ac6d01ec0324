//! Mel-scale utilities and filterbank generation.
//!
//! Uses the Slaney (Auditory Toolbox) mel scale: linear below 1 kHz,
//! logarithmic above, with area-normalized triangular filters.

/// Width of one mel in the linear region, in Hz.
const F_SP: f64 = 200.0 / 3.0;
const MIN_LOG_HZ: f64 = 1000.0;
const MIN_LOG_MEL: f64 = MIN_LOG_HZ / F_SP;

fn log_step() -> f64 {
    6.4f64.ln() / 27.0
}

/// Converts frequency in Hz to the Slaney mel scale.
pub(crate) fn hz_to_mel(hz: f64) -> f64 {
    if hz >= MIN_LOG_HZ {
        MIN_LOG_MEL + (hz / MIN_LOG_HZ).ln() / log_step()
    } else {
        hz / F_SP
    }
}

/// Converts a Slaney mel value back to Hz.
pub(crate) fn mel_to_hz(mel: f64) -> f64 {
    if mel >= MIN_LOG_MEL {
        MIN_LOG_HZ * (log_step() * (mel - MIN_LOG_MEL)).exp()
    } else {
        F_SP * mel
    }
}

/// Creates the mel filterbank matrix.
///
/// Returns `[num_mels][half_fft]` where `half_fft = fft_size / 2 + 1`.
/// Filter `m` is a triangle spanning mel points `m..m+2`, scaled by
/// `2 / (f[m+2] - f[m])` so every filter has unit area.
pub(crate) fn mel_filter_bank(
    num_mels: usize,
    fft_size: usize,
    sample_rate: u32,
    low_freq: f64,
    high_freq: f64,
) -> Vec<Vec<f64>> {
    let half_fft = fft_size / 2 + 1;
    let fft_freqs: Vec<f64> = (0..half_fft)
        .map(|k| k as f64 * sample_rate as f64 / fft_size as f64)
        .collect();

    // num_mels + 2 equally spaced mel points, back in Hz
    let low_mel = hz_to_mel(low_freq);
    let high_mel = hz_to_mel(high_freq);
    let step = (high_mel - low_mel) / (num_mels + 1) as f64;
    let hz_points: Vec<f64> = (0..num_mels + 2)
        .map(|i| mel_to_hz(low_mel + i as f64 * step))
        .collect();

    let mut bank = Vec::with_capacity(num_mels);
    for m in 0..num_mels {
        let (left, center, right) = (hz_points[m], hz_points[m + 1], hz_points[m + 2]);
        let enorm = 2.0 / (right - left);
        let filter = fft_freqs
            .iter()
            .map(|&f| {
                let lower = (f - left) / (center - left);
                let upper = (right - f) / (right - center);
                lower.min(upper).max(0.0) * enorm
            })
            .collect();
        bank.push(filter);
    }
    bank
}
