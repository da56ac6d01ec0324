//! Fixed-length acoustic features for voice screening.
//!
//! Every recording, whatever its duration, maps to an 86-dimensional
//! [`FeatureVector`]:
//!
//! | slots  | content                                   |
//! |--------|-------------------------------------------|
//! | 0-19   | MFCC means                                |
//! | 20-39  | MFCC standard deviations                  |
//! | 40-59  | MFCC delta means                          |
//! | 60-79  | MFCC delta standard deviations            |
//! | 80     | zero-crossing rate                        |
//! | 81     | spectral centroid (Hz)                    |
//! | 82     | spectral bandwidth (Hz)                   |
//! | 83     | spectral roll-off (Hz)                    |
//! | 84-85  | RMS energy mean and standard deviation    |
//!
//! # Example
//!
//! ```rust
//! use voicescreen_audio::CanonicalSignal;
//! use voicescreen_features::{Extractor, FEATURE_LEN};
//!
//! let tone: Vec<f32> = (0..16000).map(|i| (i as f32 * 0.1).sin()).collect();
//! let features = Extractor::default()
//!     .extract(&CanonicalSignal::from_samples(tone))
//!     .unwrap();
//! assert_eq!(features.to_array().len(), FEATURE_LEN);
//! ```

mod cepstral;
mod error;
pub mod extractor;
mod mel;
mod spectral;
mod stft;
pub mod vector;

pub use error::FeatureError;
pub use extractor::{Extractor, ExtractorConfig};
pub use vector::{FeatureVector, FEATURE_LEN, N_MFCC};
