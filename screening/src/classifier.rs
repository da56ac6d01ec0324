//! The classifier seam and a dense feed-forward implementation.

use serde::{Deserialize, Serialize};

use crate::error::ClassifierError;

/// Maps a standardized feature vector to a probability in `[0, 1]`.
///
/// # Thread Safety
///
/// Implementations are shared read-only across concurrent predictions and
/// must be safe for concurrent use.
pub trait Classifier: Send + Sync {
    /// Number of features the classifier expects.
    fn input_width(&self) -> usize;

    /// Returns the positive-class probability.
    fn predict(&self, features: &[f32]) -> Result<f32, ClassifierError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    Relu,
    Sigmoid,
    Tanh,
    Linear,
}

impl Activation {
    fn apply(self, x: f32) -> f32 {
        match self {
            Activation::Relu => x.max(0.0),
            Activation::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            Activation::Tanh => x.tanh(),
            Activation::Linear => x,
        }
    }
}

/// A fully connected layer: `activation(weights · x + bias)`.
///
/// `weights` holds one row per output unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseLayer {
    pub weights: Vec<Vec<f32>>,
    pub bias: Vec<f32>,
    pub activation: Activation,
}

impl DenseLayer {
    pub fn inputs(&self) -> usize {
        self.weights.first().map_or(0, |row| row.len())
    }

    pub fn outputs(&self) -> usize {
        self.weights.len()
    }

    fn forward(&self, x: &[f32]) -> Vec<f32> {
        self.weights
            .iter()
            .zip(&self.bias)
            .map(|(row, b)| {
                let z = row.iter().zip(x).map(|(w, v)| w * v).sum::<f32>() + b;
                self.activation.apply(z)
            })
            .collect()
    }
}

/// Feed-forward network of dense layers ending in a single unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "NetworkFile")]
pub struct DenseNetwork {
    layers: Vec<DenseLayer>,
}

#[derive(Deserialize)]
struct NetworkFile {
    layers: Vec<DenseLayer>,
}

impl TryFrom<NetworkFile> for DenseNetwork {
    type Error = ClassifierError;

    fn try_from(file: NetworkFile) -> Result<Self, Self::Error> {
        DenseNetwork::new(file.layers)
    }
}

impl DenseNetwork {
    /// Validates layer shapes and builds the network.
    pub fn new(layers: Vec<DenseLayer>) -> Result<Self, ClassifierError> {
        let invalid = |msg: String| Err(ClassifierError::InvalidModel(msg));
        if layers.is_empty() {
            return invalid("no layers".into());
        }
        for (i, layer) in layers.iter().enumerate() {
            let inputs = layer.inputs();
            if layer.outputs() == 0 || inputs == 0 {
                return invalid(format!("layer {i} is empty"));
            }
            if layer.weights.iter().any(|row| row.len() != inputs) {
                return invalid(format!("layer {i} has ragged weight rows"));
            }
            if layer.bias.len() != layer.outputs() {
                return invalid(format!(
                    "layer {i} has {} biases for {} units",
                    layer.bias.len(),
                    layer.outputs()
                ));
            }
            let finite = layer.weights.iter().flatten().chain(&layer.bias).all(|v| v.is_finite());
            if !finite {
                return invalid(format!("layer {i} has non-finite parameters"));
            }
            if i > 0 && layers[i - 1].outputs() != inputs {
                return invalid(format!(
                    "layer {i} takes {inputs} inputs but layer {} produces {}",
                    i - 1,
                    layers[i - 1].outputs()
                ));
            }
        }
        let last = layers.len() - 1;
        if layers[last].outputs() != 1 {
            return invalid(format!("final layer has {} units, expected 1", layers[last].outputs()));
        }
        Ok(Self { layers })
    }

    pub fn layers(&self) -> &[DenseLayer] {
        &self.layers
    }
}

impl Classifier for DenseNetwork {
    fn input_width(&self) -> usize {
        self.layers[0].inputs()
    }

    fn predict(&self, features: &[f32]) -> Result<f32, ClassifierError> {
        if features.len() != self.input_width() {
            return Err(ClassifierError::DimensionMismatch {
                expected: self.input_width(),
                got: features.len(),
            });
        }
        let mut x = features.to_vec();
        for layer in &self.layers {
            x = layer.forward(&x);
        }
        let p = x[0];
        if !p.is_finite() || !(0.0..=1.0).contains(&p) {
            return Err(ClassifierError::InvalidOutput(p));
        }
        Ok(p)
    }
}
