//! WAV encoding for fixtures and tooling.

use std::io::Cursor;

use hound::{SampleFormat, WavSpec, WavWriter};

/// Encodes interleaved `[-1, 1]` samples as 16-bit PCM WAV bytes.
///
/// Samples outside the range are clipped.
pub fn encode_wav(samples: &[f32], channels: u16, sample_rate: u32) -> Result<Vec<u8>, hound::Error> {
    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(&mut cursor, spec)?;
        for &s in samples {
            let v = (s.clamp(-1.0, 1.0) * 32767.0).round() as i16;
            writer.write_sample(v)?;
        }
        writer.finalize()?;
    }
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_header() {
        let bytes = encode_wav(&[0.0; 16], 1, 16000).unwrap();
        assert_eq!(&bytes[..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WAVE");
        // 44-byte header + 16 samples * 2 bytes
        assert_eq!(bytes.len(), 44 + 32);
    }

    #[test]
    fn test_encode_clips() {
        let bytes = encode_wav(&[2.0, -2.0], 1, 8000).unwrap();
        let mut reader = hound::WavReader::new(Cursor::new(bytes)).unwrap();
        let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(samples, vec![32767, -32767]);
    }
}
