//! Audio bytes to feature vector: decode, resample, extract.

use tracing::debug;
use voicescreen_audio::{CanonicalSignal, DecoderChain};
use voicescreen_features::{Extractor, FeatureVector};

use crate::error::PredictionError;

/// The front half of screening, shared by serving and offline featurization
/// so that both produce identical feature vectors for the same audio.
#[derive(Default)]
pub struct FeaturePipeline {
    decoders: DecoderChain,
    extractor: Extractor,
}

impl FeaturePipeline {
    pub fn new(decoders: DecoderChain) -> Self {
        Self {
            decoders,
            extractor: Extractor::default(),
        }
    }

    pub fn decoders(&self) -> &DecoderChain {
        &self.decoders
    }

    /// Decodes to mono and resamples to the canonical rate.
    pub fn canonical(&self, bytes: &[u8]) -> Result<CanonicalSignal, PredictionError> {
        let signal = self.decoders.decode(bytes)?;
        debug!(
            sample_rate = signal.sample_rate(),
            samples = signal.len(),
            duration_ms = signal.duration().as_millis() as u64,
            "decoded"
        );
        let canonical = signal.into_canonical()?;
        debug!(samples = canonical.len(), "resampled");
        Ok(canonical)
    }

    pub fn features(&self, bytes: &[u8]) -> Result<FeatureVector, PredictionError> {
        let canonical = self.canonical(bytes)?;
        Ok(self.extractor.extract(&canonical)?)
    }
}
