//! End-to-end screening of one recording.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;
use voicescreen_audio::DecoderChain;
use voicescreen_features::FeatureVector;

use crate::artifacts::Artifacts;
use crate::error::PredictionError;
use crate::pipeline::FeaturePipeline;

/// Probabilities at or above this are classified as likely.
pub const THRESHOLD: f32 = 0.5;

pub const DISCLAIMER: &str = "This is a research screening tool and not a medical diagnosis.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    ParkinsonsLikely,
    ParkinsonsUnlikely,
}

impl Classification {
    pub fn from_probability(p: f32) -> Self {
        if p >= THRESHOLD {
            Classification::ParkinsonsLikely
        } else {
            Classification::ParkinsonsUnlikely
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::ParkinsonsLikely => "parkinsons_likely",
            Classification::ParkinsonsUnlikely => "parkinsons_unlikely",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of screening one recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub probability: f64,
    /// Probability in percent, rounded to two decimals.
    pub percentage: f64,
    pub classification: Classification,
    pub disclaimer: String,
}

impl PredictionResult {
    pub fn from_probability(p: f32) -> Self {
        let probability = p as f64;
        Self {
            probability,
            percentage: (probability * 100.0 * 100.0).round() / 100.0,
            classification: Classification::from_probability(p),
            disclaimer: DISCLAIMER.to_string(),
        }
    }
}

/// Runs the full pipeline against a shared set of artifacts.
///
/// Holds no mutable state; one screener can serve any number of concurrent
/// callers.
pub struct Screener {
    artifacts: Arc<Artifacts>,
    pipeline: FeaturePipeline,
}

impl Screener {
    pub fn new(artifacts: Arc<Artifacts>) -> Self {
        Self::with_decoders(artifacts, DecoderChain::default())
    }

    pub fn with_decoders(artifacts: Arc<Artifacts>, decoders: DecoderChain) -> Self {
        Self {
            artifacts,
            pipeline: FeaturePipeline::new(decoders),
        }
    }

    pub fn artifacts(&self) -> &Artifacts {
        &self.artifacts
    }

    pub fn pipeline(&self) -> &FeaturePipeline {
        &self.pipeline
    }

    /// Decodes, resamples and extracts features without classifying.
    pub fn features(&self, bytes: &[u8]) -> Result<FeatureVector, PredictionError> {
        self.pipeline.features(bytes)
    }

    /// Screens raw audio bytes.
    pub fn predict(&self, bytes: &[u8]) -> Result<PredictionResult, PredictionError> {
        let features = self.pipeline.features(bytes)?;
        self.predict_features(&features)
    }

    /// Scales and classifies an already extracted feature vector.
    pub fn predict_features(&self, features: &FeatureVector) -> Result<PredictionResult, PredictionError> {
        let scaled = self.artifacts.scaler().transform(&features.to_array())?;
        let p = self.artifacts.classifier().predict(&scaled)?;
        let result = PredictionResult::from_probability(p);
        debug!(
            probability = result.probability,
            classification = %result.classification,
            "classified"
        );
        Ok(result)
    }
}
