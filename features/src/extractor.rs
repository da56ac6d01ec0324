//! Feature extraction from canonical 16 kHz signals.

use tracing::debug;
use voicescreen_audio::{CanonicalSignal, CANONICAL_RATE};

use crate::cepstral;
use crate::error::FeatureError;
use crate::mel;
use crate::spectral;
use crate::stft::{self, FftPlan};
use crate::vector::{FeatureVector, N_MFCC};

/// Peak magnitude at or below which a signal is treated as silence and left
/// unnormalized.
pub const SILENCE_PEAK: f64 = 1e-10;

/// Configuration for feature extraction.
///
/// These values are part of the contract with trained artifacts: changing
/// any of them changes every feature vector.
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// FFT size and analysis frame length (default: 2048).
    pub n_fft: usize,
    /// Hop between frames (default: 512).
    pub hop: usize,
    /// Number of mel bands before the DCT (default: 128).
    pub n_mels: usize,
    /// Lowest mel band edge in Hz (default: 0).
    pub fmin: f64,
    /// Highest mel band edge in Hz (default: Nyquist).
    pub fmax: f64,
    /// Power floor before taking logs (default: 1e-10).
    pub amin: f64,
    /// Dynamic range kept below the loudest bin, in dB (default: 80).
    pub top_db: Option<f64>,
    /// Frames in the delta regression window (default: 9).
    pub delta_width: usize,
    /// Energy fraction for spectral roll-off (default: 0.85).
    pub rolloff_percent: f64,
    /// Magnitudes at or below this count as zero for zero crossings (default: 1e-10).
    pub zcr_threshold: f64,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            n_fft: 2048,
            hop: 512,
            n_mels: 128,
            fmin: 0.0,
            fmax: CANONICAL_RATE as f64 / 2.0,
            amin: 1e-10,
            top_db: Some(80.0),
            delta_width: 9,
            rolloff_percent: 0.85,
            zcr_threshold: 1e-10,
        }
    }
}

impl ExtractorConfig {
    fn validate(&self) -> Result<(), FeatureError> {
        let invalid = |msg: String| Err(FeatureError::InvalidConfig(msg));
        if self.n_fft < 2 || !self.n_fft.is_power_of_two() {
            return invalid(format!("n_fft must be a power of two, got {}", self.n_fft));
        }
        if self.hop == 0 {
            return invalid("hop must be positive".into());
        }
        if self.n_mels < N_MFCC {
            return invalid(format!("n_mels must be at least {N_MFCC}, got {}", self.n_mels));
        }
        let nyquist = CANONICAL_RATE as f64 / 2.0;
        if !(0.0 <= self.fmin && self.fmin < self.fmax && self.fmax <= nyquist) {
            return invalid(format!(
                "mel range must satisfy 0 <= fmin < fmax <= {nyquist}, got {}..{}",
                self.fmin, self.fmax
            ));
        }
        if self.amin <= 0.0 {
            return invalid("amin must be positive".into());
        }
        if !(0.0..=1.0).contains(&self.rolloff_percent) {
            return invalid(format!("rolloff_percent must be in [0, 1], got {}", self.rolloff_percent));
        }
        Ok(())
    }
}

/// Computes [`FeatureVector`]s from canonical signals.
///
/// Holds only precomputed, read-only tables (FFT plan, window, mel
/// filterbank, DCT basis), so one extractor can be shared across threads;
/// every call allocates its own working buffers.
pub struct Extractor {
    cfg: ExtractorConfig,
    fft: FftPlan,
    window: Vec<f64>,
    mel_bank: Vec<Vec<f64>>,
    dct: Vec<Vec<f64>>,
    freqs: Vec<f64>,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::build(ExtractorConfig::default())
    }
}

impl Extractor {
    /// Creates an extractor with the given config.
    pub fn new(cfg: ExtractorConfig) -> Result<Self, FeatureError> {
        cfg.validate()?;
        Ok(Self::build(cfg))
    }

    fn build(cfg: ExtractorConfig) -> Self {
        let fft = stft::plan_fft(cfg.n_fft);
        let window = stft::hann_window(cfg.n_fft);
        let mel_bank = mel::mel_filter_bank(cfg.n_mels, cfg.n_fft, CANONICAL_RATE, cfg.fmin, cfg.fmax);
        let dct = cepstral::dct_basis(N_MFCC, cfg.n_mels);
        let freqs = (0..cfg.n_fft / 2 + 1)
            .map(|k| k as f64 * CANONICAL_RATE as f64 / cfg.n_fft as f64)
            .collect();
        Self {
            cfg,
            fft,
            window,
            mel_bank,
            dct,
            freqs,
        }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.cfg
    }

    /// Extracts the feature vector of a canonical signal.
    pub fn extract(&self, signal: &CanonicalSignal) -> Result<FeatureVector, FeatureError> {
        self.extract_samples(signal.samples())
    }

    /// Extracts features from mono samples at the canonical rate.
    pub fn extract_samples(&self, samples: &[f32]) -> Result<FeatureVector, FeatureError> {
        if samples.is_empty() {
            return Err(FeatureError::EmptySignal);
        }
        if let Some(index) = samples.iter().position(|s| !s.is_finite()) {
            return Err(FeatureError::NonFiniteSample { index });
        }

        let y = normalize_peak(samples);
        let cfg = &self.cfg;

        // Magnitude spectrogram shared by the cepstral and spectral paths.
        let mag = stft::magnitude_spectrogram(&y, &self.window, cfg.hop, self.fft.as_ref())?;

        let mut log_mel: Vec<Vec<f64>> = mag
            .iter()
            .map(|frame| {
                self.mel_bank
                    .iter()
                    .map(|filter| filter.iter().zip(frame).map(|(w, m)| w * m * m).sum())
                    .collect()
            })
            .collect();
        cepstral::power_to_db(&mut log_mel, cfg.amin, cfg.top_db);

        let mfcc = cepstral::cepstra(&log_mel, &self.dct);
        let deltas = cepstral::delta(&mfcc, cfg.delta_width);
        let (mfcc_mean, mfcc_std) = column_stats(&mfcc);
        let (delta_mean, delta_std) = column_stats(&deltas);

        let mut centroids = Vec::with_capacity(mag.len());
        let mut bandwidths = Vec::with_capacity(mag.len());
        let mut rolloffs = Vec::with_capacity(mag.len());
        for frame in &mag {
            let c = spectral::centroid(frame, &self.freqs);
            centroids.push(c);
            bandwidths.push(spectral::bandwidth(frame, &self.freqs, c));
            rolloffs.push(spectral::rolloff(frame, &self.freqs, cfg.rolloff_percent));
        }

        let zcr = spectral::zero_crossing_rate(&y, cfg.n_fft, cfg.hop, cfg.zcr_threshold);
        let rms = spectral::rms(&y, cfg.n_fft, cfg.hop);
        let (rms_mean, rms_std) = mean_std(&rms);

        debug!(
            samples = samples.len(),
            frames = mag.len(),
            "extracted features"
        );

        Ok(FeatureVector {
            mfcc_mean,
            mfcc_std,
            delta_mean,
            delta_std,
            zero_crossing_rate: mean_std(&zcr).0 as f32,
            spectral_centroid: mean_std(&centroids).0 as f32,
            spectral_bandwidth: mean_std(&bandwidths).0 as f32,
            spectral_rolloff: mean_std(&rolloffs).0 as f32,
            rms_mean: rms_mean as f32,
            rms_std: rms_std as f32,
        })
    }
}

/// Scales samples so the peak magnitude is 1.0. Silence is returned as is.
fn normalize_peak(samples: &[f32]) -> Vec<f64> {
    let peak = samples.iter().fold(0.0f64, |m, &s| m.max((s as f64).abs()));
    if peak <= SILENCE_PEAK {
        return samples.iter().map(|&s| s as f64).collect();
    }
    samples.iter().map(|&s| s as f64 / peak).collect()
}

/// Mean and population standard deviation.
fn mean_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, var.sqrt())
}

/// Per-coefficient mean and standard deviation across frames.
fn column_stats(frames: &[Vec<f64>]) -> ([f32; N_MFCC], [f32; N_MFCC]) {
    let mut mean = [0.0f32; N_MFCC];
    let mut std = [0.0f32; N_MFCC];
    let mut column = Vec::with_capacity(frames.len());
    for c in 0..N_MFCC {
        column.clear();
        column.extend(frames.iter().map(|f| f[c]));
        let (m, s) = mean_std(&column);
        mean[c] = m as f32;
        std[c] = s as f32;
    }
    (mean, std)
}
