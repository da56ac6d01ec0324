use thiserror::Error;

/// Errors returned while turning audio bytes into PCM.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("decode: empty input")]
    EmptyInput,

    #[error("decode: audio has no samples")]
    NoSamples,

    #[error("decode: {decoder}: {message}")]
    Backend {
        decoder: &'static str,
        message: String,
    },

    #[error("decode: no decoder accepted the audio ({})", .attempts.join("; "))]
    Exhausted { attempts: Vec<String> },
}

impl DecodeError {
    pub(crate) fn backend(decoder: &'static str, message: impl ToString) -> Self {
        DecodeError::Backend {
            decoder,
            message: message.to_string(),
        }
    }
}

/// Errors returned by sample rate conversion.
#[derive(Debug, Error)]
pub enum ResampleError {
    #[error("resample: invalid rate {from} Hz -> {to} Hz")]
    InvalidRate { from: u32, to: u32 },

    #[error("resample: rubato error: {0}")]
    Rubato(String),
}

impl From<rubato::ResamplerConstructionError> for ResampleError {
    fn from(e: rubato::ResamplerConstructionError) -> Self {
        ResampleError::Rubato(e.to_string())
    }
}

impl From<rubato::ResampleError> for ResampleError {
    fn from(e: rubato::ResampleError) -> Self {
        ResampleError::Rubato(e.to_string())
    }
}
