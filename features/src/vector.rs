//! The named feature vector and its positional layout.
//!
//! Downstream scalers and classifiers index features by position only, so
//! the vector is built as a named structure and flattened in exactly one
//! place, [`FeatureVector::to_array`].

/// Number of cepstral coefficients per frame.
pub const N_MFCC: usize = 20;

/// Length of the flattened feature vector.
pub const FEATURE_LEN: usize = 4 * N_MFCC + 4 + 2;

/// Per-recording features, one named slot per dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    pub mfcc_mean: [f32; N_MFCC],
    pub mfcc_std: [f32; N_MFCC],
    pub delta_mean: [f32; N_MFCC],
    pub delta_std: [f32; N_MFCC],
    pub zero_crossing_rate: f32,
    pub spectral_centroid: f32,
    pub spectral_bandwidth: f32,
    pub spectral_rolloff: f32,
    pub rms_mean: f32,
    pub rms_std: f32,
}

impl FeatureVector {
    pub const LEN: usize = FEATURE_LEN;

    /// Flattens into the fixed order:
    /// `[mfcc_mean, mfcc_std, delta_mean, delta_std, zcr, centroid,
    /// bandwidth, rolloff, rms_mean, rms_std]`.
    pub fn to_array(&self) -> [f32; FEATURE_LEN] {
        let mut out = [0.0f32; FEATURE_LEN];
        let blocks = [&self.mfcc_mean, &self.mfcc_std, &self.delta_mean, &self.delta_std];
        for (i, block) in blocks.iter().enumerate() {
            out[i * N_MFCC..(i + 1) * N_MFCC].copy_from_slice(&block[..]);
        }
        out[4 * N_MFCC..].copy_from_slice(&[
            self.zero_crossing_rate,
            self.spectral_centroid,
            self.spectral_bandwidth,
            self.spectral_rolloff,
            self.rms_mean,
            self.rms_std,
        ]);
        out
    }

    pub fn to_vec(&self) -> Vec<f32> {
        self.to_array().to_vec()
    }

    /// Slot names in positional order.
    pub fn names() -> Vec<String> {
        let mut names = Vec::with_capacity(FEATURE_LEN);
        for prefix in ["mfcc_mean", "mfcc_std", "delta_mean", "delta_std"] {
            names.extend((0..N_MFCC).map(|i| format!("{prefix}_{i}")));
        }
        names.extend(
            [
                "zero_crossing_rate",
                "spectral_centroid",
                "spectral_bandwidth",
                "spectral_rolloff",
                "rms_mean",
                "rms_std",
            ]
            .map(String::from),
        );
        names
    }
}
