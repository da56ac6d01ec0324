//! General-purpose decoding via symphonia.

use std::io::{Cursor, ErrorKind};

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use super::DecodeStrategy;
use crate::error::DecodeError;
use crate::signal::InterleavedPcm;

const NAME: &str = "symphonia";

/// Probes the container and decodes the first audio track.
///
/// Keeps the native sample rate and channel layout. Corrupt packets are
/// skipped, matching how players treat recoverable decode errors.
#[derive(Debug, Default, Clone, Copy)]
pub struct SymphoniaDecoder;

impl DecodeStrategy for SymphoniaDecoder {
    fn name(&self) -> &'static str {
        NAME
    }

    fn decode(&self, bytes: &[u8]) -> Result<InterleavedPcm, DecodeError> {
        let source = Cursor::new(bytes.to_vec());
        let mss = MediaSourceStream::new(Box::new(source), Default::default());

        let probed = symphonia::default::get_probe()
            .format(
                &Hint::new(),
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| DecodeError::backend(NAME, format!("unsupported container: {e}")))?;
        let mut format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| DecodeError::backend(NAME, "no audio track"))?;
        let track_id = track.id;
        let mut sample_rate = track.codec_params.sample_rate.unwrap_or(0);
        let mut channels = track.codec_params.channels.map(|c| c.count()).unwrap_or(0);

        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| DecodeError::backend(NAME, format!("unsupported codec: {e}")))?;

        let mut samples: Vec<f32> = Vec::new();

        loop {
            let packet = match format.next_packet() {
                Ok(p) => p,
                Err(SymphoniaError::IoError(e)) if e.kind() == ErrorKind::UnexpectedEof => break,
                Err(SymphoniaError::ResetRequired) => {
                    decoder.reset();
                    continue;
                }
                Err(e) => return Err(DecodeError::backend(NAME, e)),
            };

            if packet.track_id() != track_id {
                continue;
            }

            let decoded = match decoder.decode(&packet) {
                Ok(d) => d,
                Err(SymphoniaError::DecodeError(_)) => continue,
                Err(SymphoniaError::IoError(e)) if e.kind() == ErrorKind::UnexpectedEof => break,
                Err(e) => return Err(DecodeError::backend(NAME, e)),
            };

            let spec = *decoded.spec();
            let packet_channels = spec.channels.count();
            if channels == 0 {
                channels = packet_channels;
            } else if packet_channels != channels {
                return Err(DecodeError::backend(
                    NAME,
                    format!("channel count changed from {channels} to {packet_channels}"),
                ));
            }
            if sample_rate == 0 {
                sample_rate = spec.rate;
            }

            let mut buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
            buf.copy_interleaved_ref(decoded);
            samples.extend_from_slice(buf.samples());
        }

        Ok(InterleavedPcm {
            samples,
            channels: channels.max(1),
            sample_rate,
        })
    }
}
