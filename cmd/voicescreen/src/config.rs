//! Service configuration file.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use voicescreen_audio::{DecoderChain, DecoderKind};
use voicescreen_screening::ArtifactPaths;

/// Configuration file format (`voicescreen.yaml`).
///
/// Every field is optional; missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Listen address, e.g. `:8000` or `127.0.0.1:8000`.
    pub listen: String,
    pub model_path: PathBuf,
    pub scaler_path: PathBuf,
    /// Decoder strategies in the order they are tried.
    pub decoders: Vec<String>,
    pub max_upload_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: ":8000".to_string(),
            model_path: PathBuf::from("models/model.json"),
            scaler_path: PathBuf::from("models/scaler.json"),
            decoders: vec!["symphonia".to_string(), "wav".to_string()],
            max_upload_bytes: 25 * 1024 * 1024,
        }
    }
}

impl Config {
    /// Loads the config file, or the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        Self::from_yaml(&data).with_context(|| format!("parse config {}", path.display()))
    }

    pub fn from_yaml(data: &str) -> Result<Self> {
        if data.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(data)?)
    }

    pub fn artifact_paths(&self) -> ArtifactPaths {
        ArtifactPaths {
            model: self.model_path.clone(),
            scaler: self.scaler_path.clone(),
        }
    }

    pub fn decoder_chain(&self) -> Result<DecoderChain> {
        if self.decoders.is_empty() {
            bail!("at least one decoder is required");
        }
        let kinds = self
            .decoders
            .iter()
            .map(|name| name.parse::<DecoderKind>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(anyhow::Error::msg)?;
        Ok(DecoderChain::from_kinds(&kinds))
    }
}
