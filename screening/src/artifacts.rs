//! Loading and validating the trained scaler and classifier.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tracing::info;
use voicescreen_features::FEATURE_LEN;

use crate::classifier::{Classifier, DenseNetwork};
use crate::error::ArtifactLoadError;
use crate::scaler::Scaler;

/// Locations of the artifact files written by training.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub model: PathBuf,
    pub scaler: PathBuf,
}

impl ArtifactPaths {
    /// Conventional `model.json` / `scaler.json` pair inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            model: dir.join("model.json"),
            scaler: dir.join("scaler.json"),
        }
    }
}

/// The immutable scaler and classifier shared by every prediction.
///
/// Construction checks that both agree with each other and with the
/// feature vector width, so a mismatched pair never reaches a request.
pub struct Artifacts {
    scaler: Scaler,
    classifier: Box<dyn Classifier>,
}

impl fmt::Debug for Artifacts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Artifacts")
            .field("width", &self.scaler.width())
            .finish_non_exhaustive()
    }
}

impl Artifacts {
    pub fn new(scaler: Scaler, classifier: Box<dyn Classifier>) -> Result<Self, ArtifactLoadError> {
        if scaler.width() != classifier.input_width() {
            return Err(ArtifactLoadError::WidthMismatch {
                scaler: scaler.width(),
                classifier: classifier.input_width(),
            });
        }
        if scaler.width() != FEATURE_LEN {
            return Err(ArtifactLoadError::UnexpectedWidth {
                what: "scaler",
                expected: FEATURE_LEN,
                got: scaler.width(),
            });
        }
        Ok(Self { scaler, classifier })
    }

    /// Reads both artifact files and validates them together.
    pub fn load(paths: &ArtifactPaths) -> Result<Self, ArtifactLoadError> {
        let scaler: Scaler = read_json(&paths.scaler)?;
        let network: DenseNetwork = read_json(&paths.model)?;
        let layers = network.layers().len();
        let artifacts = Self::new(scaler, Box::new(network))?;
        info!(
            model = %paths.model.display(),
            scaler = %paths.scaler.display(),
            layers,
            width = artifacts.scaler.width(),
            "loaded artifacts"
        );
        Ok(artifacts)
    }

    pub fn scaler(&self) -> &Scaler {
        &self.scaler
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactLoadError> {
    let data = std::fs::read(path).map_err(|source| ArtifactLoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&data).map_err(|source| ArtifactLoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
