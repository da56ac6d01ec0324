use std::path::PathBuf;

use thiserror::Error;
use voicescreen_audio::{DecodeError, ResampleError};
use voicescreen_features::FeatureError;

/// Errors from fitting or applying a [`Scaler`](crate::Scaler).
#[derive(Debug, Error)]
pub enum ScalerError {
    #[error("scaler: mean has {mean} entries but std has {std}")]
    LengthMismatch { mean: usize, std: usize },

    #[error("scaler: expected {expected} features, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("scaler: invalid parameter at index {index}")]
    InvalidParameter { index: usize },

    #[error("scaler: no samples to fit")]
    NoSamples,
}

/// Errors from building or evaluating a [`Classifier`](crate::Classifier).
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("classifier: expected {expected} inputs, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("classifier: invalid model: {0}")]
    InvalidModel(String),

    #[error("classifier: output {0} is not a probability")]
    InvalidOutput(f32),
}

/// Startup-time failures loading the scaler and classifier artifacts.
///
/// These are fatal: a process that cannot load its artifacts must not
/// serve predictions.
#[derive(Debug, Error)]
pub enum ArtifactLoadError {
    #[error("artifacts: read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("artifacts: parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("artifacts: scaler width {scaler} does not match classifier input width {classifier}")]
    WidthMismatch { scaler: usize, classifier: usize },

    #[error("artifacts: {what} width is {got}, feature vectors have {expected}")]
    UnexpectedWidth {
        what: &'static str,
        expected: usize,
        got: usize,
    },
}

/// Single failure surface for one prediction, wrapping the stage that failed.
#[derive(Debug, Error)]
pub enum PredictionError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Resample(#[from] ResampleError),

    #[error(transparent)]
    Feature(#[from] FeatureError),

    #[error(transparent)]
    Scaler(#[from] ScalerError),

    #[error(transparent)]
    Classifier(#[from] ClassifierError),
}

impl PredictionError {
    /// Name of the pipeline stage that failed.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Decode(_) => "decode",
            Self::Resample(_) => "resample",
            Self::Feature(_) => "extract",
            Self::Scaler(_) => "scale",
            Self::Classifier(_) => "classify",
        }
    }
}

/// Errors from offline featurization and scaler fitting.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("dataset: {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("dataset: csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("dataset: metadata must contain {0} column")]
    MissingColumn(&'static str),

    #[error("dataset: row {row}: invalid label {value:?}, expected 0 or 1")]
    InvalidLabel { row: usize, value: String },

    #[error("dataset: remote path {0} is not supported, download it first")]
    RemotePath(String),

    #[error("dataset: line {line}: {source}")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("dataset: io: {0}")]
    Stream(#[source] std::io::Error),

    #[error("dataset: {}: {source}", path.display())]
    Featurize {
        path: PathBuf,
        #[source]
        source: PredictionError,
    },

    #[error("dataset: record {index} has {got} features, expected {expected}")]
    Width {
        index: usize,
        expected: usize,
        got: usize,
    },

    #[error(transparent)]
    Scaler(#[from] ScalerError),
}
