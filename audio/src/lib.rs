//! Audio front end for voice screening.
//!
//! This crate turns uploaded audio bytes into the canonical signal consumed
//! by feature extraction:
//!
//! - `decoder`: ordered chain of decoding strategies (symphonia, then a
//!   strict WAV reader) with mono downmixing
//! - `resampler`: band-limited conversion to the 16 kHz analysis rate
//! - `signal`: PCM signal types
//! - `wav`: 16-bit WAV encoding for fixtures
//!
//! # Example
//!
//! ```rust
//! use voicescreen_audio::{encode_wav, DecoderChain, CANONICAL_RATE};
//!
//! let tone: Vec<f32> = (0..4410).map(|i| (i as f32 * 0.06).sin() * 0.5).collect();
//! let bytes = encode_wav(&tone, 1, 44100).unwrap();
//!
//! let signal = DecoderChain::default().decode(&bytes).unwrap();
//! assert_eq!(signal.sample_rate(), 44100);
//!
//! let canonical = signal.into_canonical().unwrap();
//! assert_eq!(canonical.sample_rate(), CANONICAL_RATE);
//! assert_eq!(canonical.len(), 1600);
//! ```

pub mod decoder;
mod error;
pub mod resampler;
pub mod signal;
pub mod wav;

pub use decoder::{DecodeStrategy, DecoderChain, DecoderKind, SymphoniaDecoder, WavDecoder};
pub use error::{DecodeError, ResampleError};
pub use signal::{downmix, CanonicalSignal, InterleavedPcm, PcmSignal, CANONICAL_RATE};
pub use wav::encode_wav;
