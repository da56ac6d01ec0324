//! Band-limited sample rate conversion.
//!
//! The same routine is used when featurizing training data and when serving,
//! so both paths feed the extractor identical signals.
//!
//! # Example
//!
//! ```
//! use voicescreen_audio::resampler::resample;
//!
//! let input = vec![0.0f32; 44100];
//! let output = resample(&input, 44100, 16000).unwrap();
//! assert_eq!(output.len(), 16000);
//! ```

mod rubato_impl;

pub use rubato_impl::{resample, MAX_RATE, MIN_RATE};
