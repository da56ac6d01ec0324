//! Audio decoding with an ordered fallback chain.
//!
//! Container support differs between decoding backends, so bytes are offered
//! to a list of [`DecodeStrategy`] implementations in order. The first one
//! that yields samples wins; its output is downmixed to mono.
//!
//! The default order is the general-purpose [`SymphoniaDecoder`] followed by
//! the strict, sample-accurate [`WavDecoder`].

mod hound_impl;
mod symphonia_impl;

use std::fmt;
use std::str::FromStr;

use tracing::{debug, warn};

use crate::error::DecodeError;
use crate::signal::{downmix, InterleavedPcm, PcmSignal};

pub use hound_impl::WavDecoder;
pub use symphonia_impl::SymphoniaDecoder;

/// One way of turning encoded bytes into interleaved PCM.
///
/// Implementations must be pure: no state is kept between calls.
pub trait DecodeStrategy: Send + Sync {
    /// Short name used in logs and error messages.
    fn name(&self) -> &'static str;

    /// Decodes the bytes at their native sample rate and channel count.
    fn decode(&self, bytes: &[u8]) -> Result<InterleavedPcm, DecodeError>;
}

/// Names of the built-in decoding strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderKind {
    Symphonia,
    Wav,
}

impl DecoderKind {
    fn strategy(self) -> Box<dyn DecodeStrategy> {
        match self {
            DecoderKind::Symphonia => Box::new(SymphoniaDecoder),
            DecoderKind::Wav => Box::new(WavDecoder),
        }
    }
}

impl fmt::Display for DecoderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecoderKind::Symphonia => write!(f, "symphonia"),
            DecoderKind::Wav => write!(f, "wav"),
        }
    }
}

impl FromStr for DecoderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "symphonia" => Ok(DecoderKind::Symphonia),
            "wav" | "hound" => Ok(DecoderKind::Wav),
            other => Err(format!("unknown decoder {other:?}")),
        }
    }
}

/// Ordered list of decoding strategies.
pub struct DecoderChain {
    strategies: Vec<Box<dyn DecodeStrategy>>,
}

impl Default for DecoderChain {
    fn default() -> Self {
        Self::from_kinds(&[DecoderKind::Symphonia, DecoderKind::Wav])
    }
}

impl DecoderChain {
    /// Creates a chain from explicit strategies, tried in the given order.
    pub fn new(strategies: Vec<Box<dyn DecodeStrategy>>) -> Self {
        Self { strategies }
    }

    /// Creates a chain of built-in strategies. Duplicates are ignored.
    pub fn from_kinds(kinds: &[DecoderKind]) -> Self {
        let mut seen = Vec::with_capacity(kinds.len());
        for &kind in kinds {
            if !seen.contains(&kind) {
                seen.push(kind);
            }
        }
        Self::new(seen.into_iter().map(DecoderKind::strategy).collect())
    }

    /// Returns the strategy names in the order they are tried.
    pub fn names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Decodes the bytes into a mono signal at the native sample rate.
    ///
    /// A strategy that fails or yields no samples hands over to the next one.
    /// Returns [`DecodeError::NoSamples`] when every strategy parsed the input
    /// but found it empty.
    pub fn decode(&self, bytes: &[u8]) -> Result<PcmSignal, DecodeError> {
        if bytes.is_empty() {
            return Err(DecodeError::EmptyInput);
        }

        let mut attempts = Vec::with_capacity(self.strategies.len());
        let mut all_empty = true;

        for strategy in &self.strategies {
            match strategy.decode(bytes) {
                Ok(pcm) if pcm.sample_rate == 0 => {
                    all_empty = false;
                    warn!(decoder = strategy.name(), "decoder reported a zero sample rate");
                    attempts.push(format!("{}: zero sample rate", strategy.name()));
                }
                Ok(pcm) if pcm.frames() > 0 => {
                    debug!(
                        decoder = strategy.name(),
                        sample_rate = pcm.sample_rate,
                        channels = pcm.channels,
                        frames = pcm.frames(),
                        "decoded audio"
                    );
                    return Ok(downmix(pcm));
                }
                Ok(_) => {
                    warn!(decoder = strategy.name(), "decoder produced no samples");
                    attempts.push(format!("{}: no samples", strategy.name()));
                }
                Err(e) => {
                    all_empty = false;
                    warn!(decoder = strategy.name(), error = %e, "decoder failed, trying next");
                    attempts.push(e.to_string());
                }
            }
        }

        if all_empty && !attempts.is_empty() {
            return Err(DecodeError::NoSamples);
        }
        Err(DecodeError::Exhausted { attempts })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wav::encode_wav;

    struct Fails;

    impl DecodeStrategy for Fails {
        fn name(&self) -> &'static str {
            "fails"
        }

        fn decode(&self, _bytes: &[u8]) -> Result<InterleavedPcm, DecodeError> {
            Err(DecodeError::backend("fails", "unsupported container"))
        }
    }

    struct Fixed(InterleavedPcm);

    impl DecodeStrategy for Fixed {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn decode(&self, _bytes: &[u8]) -> Result<InterleavedPcm, DecodeError> {
            Ok(self.0.clone())
        }
    }

    fn stereo_pcm() -> InterleavedPcm {
        InterleavedPcm {
            samples: vec![0.0, 0.8, 0.0, -0.8],
            channels: 2,
            sample_rate: 22050,
        }
    }

    #[test]
    fn test_empty_bytes() {
        let chain = DecoderChain::default();
        assert!(matches!(chain.decode(&[]), Err(DecodeError::EmptyInput)));
    }

    #[test]
    fn test_garbage_exhausts_chain() {
        let chain = DecoderChain::default();
        let err = chain.decode(&[1, 2, 3, 4, 5, 6, 7, 8]).unwrap_err();
        match err {
            DecodeError::Exhausted { attempts } => assert_eq!(attempts.len(), 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_fallback_used_after_failure() {
        let chain = DecoderChain::new(vec![Box::new(Fails), Box::new(Fixed(stereo_pcm()))]);
        let signal = chain.decode(b"anything").unwrap();
        assert_eq!(signal.sample_rate(), 22050);
        assert_eq!(signal.samples(), &[0.4, -0.4]);
    }

    #[test]
    fn test_first_success_wins() {
        let first = InterleavedPcm {
            samples: vec![0.25; 4],
            channels: 1,
            sample_rate: 8000,
        };
        let chain = DecoderChain::new(vec![Box::new(Fixed(first)), Box::new(Fixed(stereo_pcm()))]);
        let signal = chain.decode(b"x").unwrap();
        assert_eq!(signal.sample_rate(), 8000);
        assert_eq!(signal.len(), 4);
    }

    #[test]
    fn test_all_empty_is_no_samples() {
        let empty = InterleavedPcm {
            samples: vec![],
            channels: 1,
            sample_rate: 16000,
        };
        let chain = DecoderChain::new(vec![Box::new(Fixed(empty))]);
        assert!(matches!(chain.decode(b"x"), Err(DecodeError::NoSamples)));
    }

    #[test]
    fn test_wav_decodes_through_default_chain() {
        let samples: Vec<f32> = (0..1600).map(|i| (i as f32 * 0.05).sin() * 0.5).collect();
        let bytes = encode_wav(&samples, 1, 16000).unwrap();
        let signal = DecoderChain::default().decode(&bytes).unwrap();
        assert_eq!(signal.sample_rate(), 16000);
        assert_eq!(signal.len(), 1600);
    }

    #[test]
    fn test_wav_first_order() {
        let bytes = encode_wav(&[0.1; 320], 2, 8000).unwrap();
        let chain = DecoderChain::from_kinds(&[DecoderKind::Wav, DecoderKind::Symphonia]);
        assert_eq!(chain.names(), vec!["wav", "symphonia"]);
        let signal = chain.decode(&bytes).unwrap();
        assert_eq!(signal.len(), 160);
    }

    #[test]
    fn test_from_kinds_dedupes() {
        let chain = DecoderChain::from_kinds(&[DecoderKind::Wav, DecoderKind::Wav]);
        assert_eq!(chain.names(), vec!["wav"]);
    }

    #[test]
    fn test_decoder_kind_parse() {
        assert_eq!("symphonia".parse::<DecoderKind>(), Ok(DecoderKind::Symphonia));
        assert_eq!("WAV".parse::<DecoderKind>(), Ok(DecoderKind::Wav));
        assert_eq!("hound".parse::<DecoderKind>(), Ok(DecoderKind::Wav));
        assert!("ffmpeg".parse::<DecoderKind>().is_err());
        assert_eq!(DecoderKind::Symphonia.to_string(), "symphonia");
    }
}
