//! Voice screening: artifacts, scaling, classification and the end-to-end
//! prediction pipeline.
//!
//! A [`Screener`] owns a [`FeaturePipeline`] (decode, resample, extract) and
//! shares one immutable [`Artifacts`] handle (scaler and classifier) loaded
//! at startup:
//!
//! ```text
//! bytes -> DecoderChain -> resample(16 kHz) -> Extractor -> Scaler -> Classifier
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use voicescreen_screening::{ArtifactPaths, Artifacts, Screener};
//!
//! let artifacts = Artifacts::load(&ArtifactPaths::in_dir("models")).unwrap();
//! let screener = Screener::new(Arc::new(artifacts));
//! let result = screener.predict(&std::fs::read("sample.wav").unwrap()).unwrap();
//! println!("{} ({}%)", result.classification, result.percentage);
//! ```

mod artifacts;
mod classifier;
pub mod dataset;
mod error;
mod pipeline;
mod scaler;
mod screener;

pub use artifacts::{ArtifactPaths, Artifacts};
pub use classifier::{Activation, Classifier, DenseLayer, DenseNetwork};
pub use error::{
    ArtifactLoadError, ClassifierError, DatasetError, PredictionError, ScalerError,
};
pub use pipeline::FeaturePipeline;
pub use scaler::Scaler;
pub use screener::{Classification, PredictionResult, Screener, DISCLAIMER, THRESHOLD};
