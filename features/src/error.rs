use thiserror::Error;

/// Errors returned by feature extraction.
#[derive(Debug, Error)]
pub enum FeatureError {
    #[error("features: empty signal")]
    EmptySignal,

    #[error("features: non-finite sample at index {index}")]
    NonFiniteSample { index: usize },

    #[error("features: invalid config: {0}")]
    InvalidConfig(String),

    #[error("features: fft: {0}")]
    Fft(String),
}

impl From<realfft::FftError> for FeatureError {
    fn from(err: realfft::FftError) -> Self {
        FeatureError::Fft(err.to_string())
    }
}
