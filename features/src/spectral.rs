//! Per-frame spectral shape, zero-crossing and energy descriptors.

use crate::stft::{centered_frame, frame_count, Padding};

/// First moment of a magnitude spectrum, in Hz. Returns 0 for a silent frame.
pub(crate) fn centroid(mag: &[f64], freqs: &[f64]) -> f64 {
    let total: f64 = mag.iter().sum();
    if total < f64::MIN_POSITIVE {
        return 0.0;
    }
    mag.iter().zip(freqs).map(|(m, f)| m * f).sum::<f64>() / total
}

/// Second-order spread around `centroid`, in Hz. Returns 0 for a silent frame.
pub(crate) fn bandwidth(mag: &[f64], freqs: &[f64], centroid: f64) -> f64 {
    let total: f64 = mag.iter().sum();
    if total < f64::MIN_POSITIVE {
        return 0.0;
    }
    let spread: f64 = mag
        .iter()
        .zip(freqs)
        .map(|(m, f)| (m / total) * (f - centroid).powi(2))
        .sum();
    spread.sqrt()
}

/// Lowest frequency below which `percent` of the frame's magnitude lies.
pub(crate) fn rolloff(mag: &[f64], freqs: &[f64], percent: f64) -> f64 {
    let total: f64 = mag.iter().sum();
    let threshold = percent * total;
    let mut cumulative = 0.0;
    for (m, f) in mag.iter().zip(freqs) {
        cumulative += m;
        if cumulative >= threshold {
            return *f;
        }
    }
    freqs.last().copied().unwrap_or(0.0)
}

/// Fraction of sign changes per centered, edge-padded frame.
///
/// Samples with `|x| <= threshold` count as zero, and zero counts as
/// positive. Each frame's count is divided by the frame length.
pub(crate) fn zero_crossing_rate(y: &[f64], frame_len: usize, hop: usize, threshold: f64) -> Vec<f64> {
    let negative = |x: f64| x.abs() > threshold && x.is_sign_negative();
    let mut frame = vec![0.0f64; frame_len];
    (0..frame_count(y.len(), hop))
        .map(|t| {
            centered_frame(y, t, hop, Padding::Edge, &mut frame);
            let crossings = frame
                .windows(2)
                .filter(|w| negative(w[0]) != negative(w[1]))
                .count();
            crossings as f64 / frame_len as f64
        })
        .collect()
}

/// Root-mean-square energy per centered, zero-padded frame.
pub(crate) fn rms(y: &[f64], frame_len: usize, hop: usize) -> Vec<f64> {
    let mut frame = vec![0.0f64; frame_len];
    (0..frame_count(y.len(), hop))
        .map(|t| {
            centered_frame(y, t, hop, Padding::Zero, &mut frame);
            let power = frame.iter().map(|x| x * x).sum::<f64>() / frame_len as f64;
            power.sqrt()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn freqs(n: usize) -> Vec<f64> {
        (0..n).map(|k| k as f64 * 100.0).collect()
    }

    #[test]
    fn test_centroid_single_bin() {
        let mut mag = vec![0.0; 10];
        mag[3] = 2.0;
        assert!((centroid(&mag, &freqs(10)) - 300.0).abs() < 1e-10);
    }

    #[test]
    fn test_centroid_and_bandwidth_two_bins() {
        let mut mag = vec![0.0; 10];
        mag[2] = 1.0;
        mag[6] = 1.0;
        let f = freqs(10);
        let c = centroid(&mag, &f);
        assert!((c - 400.0).abs() < 1e-10);
        assert!((bandwidth(&mag, &f, c) - 200.0).abs() < 1e-10);
    }

    #[test]
    fn test_silent_frame_descriptors() {
        let mag = vec![0.0; 10];
        let f = freqs(10);
        assert_eq!(centroid(&mag, &f), 0.0);
        assert_eq!(bandwidth(&mag, &f, 0.0), 0.0);
        assert_eq!(rolloff(&mag, &f, 0.85), 0.0);
    }

    #[test]
    fn test_rolloff() {
        let mag = vec![1.0; 10];
        // cumulative reaches 8.5 at the 9th bin (index 8)
        assert!((rolloff(&mag, &freqs(10), 0.85) - 800.0).abs() < 1e-10);
    }

    #[test]
    fn test_zcr_alternating() {
        let y: Vec<f64> = (0..64).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        let zcr = zero_crossing_rate(&y, 16, 8, 1e-10);
        assert_eq!(zcr.len(), 9);
        // Interior frames cross between every pair of samples.
        assert!((zcr[4] - 15.0 / 16.0).abs() < 1e-12);
    }

    #[test]
    fn test_zcr_ignores_tiny_values() {
        let y = vec![1e-12, -1e-12, 1e-12, -1e-12, 0.5, 0.5, 0.5, 0.5];
        let zcr = zero_crossing_rate(&y, 4, 4, 1e-10);
        assert!(zcr.iter().all(|&z| z == 0.0));
    }

    #[test]
    fn test_zcr_sine() {
        let sr = 16000.0;
        let y: Vec<f64> = (0..16000)
            .map(|i| (2.0 * PI * 400.0 * i as f64 / sr + 0.1).sin())
            .collect();
        let zcr = zero_crossing_rate(&y, 2048, 512, 1e-10);
        let mid = zcr[zcr.len() / 2];
        // 800 crossings per second
        assert!((mid - 800.0 / sr).abs() < 0.002, "zcr {mid}");
    }

    #[test]
    fn test_rms_constant() {
        let y = vec![0.5; 4096];
        let r = rms(&y, 1024, 256);
        assert_eq!(r.len(), 17);
        // Fully covered frames
        assert!((r[8] - 0.5).abs() < 1e-12);
        // First frame is half padding
        assert!((r[0] - (0.125f64).sqrt()).abs() < 1e-12);
    }
}
