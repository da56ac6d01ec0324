//! Per-dimension standardization fitted on training features.

use serde::{Deserialize, Serialize};

use crate::error::ScalerError;

/// Standardizes feature vectors as `(x - mean) / std`.
///
/// Dimensions whose training standard deviation is zero map to 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ScalerFile")]
pub struct Scaler {
    mean: Vec<f64>,
    std: Vec<f64>,
}

#[derive(Deserialize)]
struct ScalerFile {
    mean: Vec<f64>,
    #[serde(alias = "scale")]
    std: Vec<f64>,
}

impl TryFrom<ScalerFile> for Scaler {
    type Error = ScalerError;

    fn try_from(file: ScalerFile) -> Result<Self, Self::Error> {
        Scaler::new(file.mean, file.std)
    }
}

impl Scaler {
    pub fn new(mean: Vec<f64>, std: Vec<f64>) -> Result<Self, ScalerError> {
        if mean.len() != std.len() {
            return Err(ScalerError::LengthMismatch {
                mean: mean.len(),
                std: std.len(),
            });
        }
        let bad = mean
            .iter()
            .zip(&std)
            .position(|(m, s)| !m.is_finite() || !s.is_finite() || *s < 0.0);
        if let Some(index) = bad {
            return Err(ScalerError::InvalidParameter { index });
        }
        Ok(Self { mean, std })
    }

    /// Fits mean and population standard deviation over `rows`.
    pub fn fit<R: AsRef<[f32]>>(rows: &[R]) -> Result<Self, ScalerError> {
        let first = rows.first().ok_or(ScalerError::NoSamples)?;
        let width = first.as_ref().len();
        let n = rows.len() as f64;

        let mut mean = vec![0.0f64; width];
        for row in rows {
            let row = row.as_ref();
            if row.len() != width {
                return Err(ScalerError::DimensionMismatch {
                    expected: width,
                    got: row.len(),
                });
            }
            for (m, &x) in mean.iter_mut().zip(row) {
                *m += x as f64;
            }
        }
        mean.iter_mut().for_each(|m| *m /= n);

        let mut var = vec![0.0f64; width];
        for row in rows {
            for ((v, &x), m) in var.iter_mut().zip(row.as_ref()).zip(&mean) {
                *v += (x as f64 - m).powi(2);
            }
        }
        let std = var.into_iter().map(|v| (v / n).sqrt()).collect();

        Self::new(mean, std)
    }

    pub fn width(&self) -> usize {
        self.mean.len()
    }

    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    pub fn std(&self) -> &[f64] {
        &self.std
    }

    pub fn transform(&self, features: &[f32]) -> Result<Vec<f32>, ScalerError> {
        if features.len() != self.width() {
            return Err(ScalerError::DimensionMismatch {
                expected: self.width(),
                got: features.len(),
            });
        }
        Ok(features
            .iter()
            .zip(self.mean.iter().zip(&self.std))
            .map(|(&x, (m, s))| {
                if *s == 0.0 {
                    0.0
                } else {
                    ((x as f64 - m) / s) as f32
                }
            })
            .collect())
    }
}
