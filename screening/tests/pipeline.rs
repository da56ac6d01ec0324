//! End-to-end screening tests over synthesized WAV recordings.

use std::f64::consts::PI;
use std::sync::Arc;
use std::thread;

use voicescreen_audio::{
    encode_wav, resampler::resample, DecodeError, DecoderChain, ResampleError, CANONICAL_RATE,
};
use voicescreen_features::{FeatureVector, FEATURE_LEN};
use voicescreen_screening::{
    Activation, ArtifactLoadError, ArtifactPaths, Artifacts, Classification, DenseLayer,
    DenseNetwork, FeaturePipeline, PredictionError, Scaler, Screener,
};

const SECONDS: usize = 3;

/// 220 Hz tone with 50 ms raised-cosine fades at both ends.
fn tone(sample_rate: u32) -> Vec<f32> {
    let n = SECONDS * sample_rate as usize;
    let fade = sample_rate as usize / 20;
    (0..n)
        .map(|i| {
            let t = i as f64 / sample_rate as f64;
            let edge = i.min(n - 1 - i);
            let gain = if edge < fade {
                0.5 - 0.5 * (PI * edge as f64 / fade as f64).cos()
            } else {
                1.0
            };
            (0.6 * gain * (2.0 * PI * 220.0 * t).sin()) as f32
        })
        .collect()
}

fn identity_scaler() -> Scaler {
    Scaler::new(vec![0.0; FEATURE_LEN], vec![1.0; FEATURE_LEN]).unwrap()
}

/// Zero weights into a sigmoid: always exactly 0.5.
fn boundary_network() -> DenseNetwork {
    DenseNetwork::new(vec![DenseLayer {
        weights: vec![vec![0.0; FEATURE_LEN]],
        bias: vec![0.0],
        activation: Activation::Sigmoid,
    }])
    .unwrap()
}

/// Same shape as the trained network, with small deterministic weights.
fn reference_network() -> DenseNetwork {
    let dense = |inputs: usize, outputs: usize, activation| DenseLayer {
        weights: (0..outputs)
            .map(|o| (0..inputs).map(|i| ((o * 31 + i * 7) % 13) as f32 * 0.001 - 0.006).collect())
            .collect(),
        bias: vec![0.01; outputs],
        activation,
    };
    DenseNetwork::new(vec![
        dense(FEATURE_LEN, 128, Activation::Relu),
        dense(128, 64, Activation::Relu),
        dense(64, 32, Activation::Relu),
        dense(32, 1, Activation::Sigmoid),
    ])
    .unwrap()
}

fn screener(network: DenseNetwork) -> Screener {
    let artifacts = Artifacts::new(identity_scaler(), Box::new(network)).unwrap();
    Screener::new(Arc::new(artifacts))
}

fn assert_close(a: &FeatureVector, b: &FeatureVector) {
    let (a, b) = (a.to_array(), b.to_array());
    let names = FeatureVector::names();
    for i in 0..FEATURE_LEN {
        let (x, y) = (a[i], b[i]);
        let tol = match names[i].as_str() {
            "zero_crossing_rate" | "rms_mean" | "rms_std" => 0.01,
            // A pure tone's bandwidth sits on the noise floor, which
            // 16-bit encoding and resampling both move.
            "spectral_bandwidth" => 0.25 * x.abs().max(y.abs()),
            _ => 0.05 * x.abs().max(y.abs()) + 0.5,
        };
        assert!((x - y).abs() <= tol, "{}: {x} vs {y}", names[i]);
    }
}

#[test]
fn scenario_a_native_rate_sine() {
    let bytes = encode_wav(&tone(CANONICAL_RATE), 1, CANONICAL_RATE).unwrap();

    let result = screener(boundary_network()).predict(&bytes).unwrap();
    assert_eq!(result.probability, 0.5);
    assert_eq!(result.percentage, 50.0);
    assert_eq!(result.classification, Classification::ParkinsonsLikely);
    assert!(!result.disclaimer.is_empty());

    let result = screener(reference_network()).predict(&bytes).unwrap();
    assert!((0.0..=1.0).contains(&result.probability));
    assert_eq!(
        result.classification,
        Classification::from_probability(result.probability as f32)
    );
}

#[test]
fn scenario_b_resampled_input_matches_native() {
    let native = tone(CANONICAL_RATE);
    let upsampled = resample(&native, CANONICAL_RATE, 44100).unwrap();

    let pipeline = FeaturePipeline::default();
    let a = pipeline.features(&encode_wav(&native, 1, CANONICAL_RATE).unwrap()).unwrap();
    let b = pipeline.features(&encode_wav(&upsampled, 1, 44100).unwrap()).unwrap();
    assert_close(&a, &b);
}

#[test]
fn scenario_c_empty_bytes_fail() {
    let err = screener(boundary_network()).predict(&[]).unwrap_err();
    assert!(matches!(err, PredictionError::Decode(DecodeError::EmptyInput)));
}

#[test]
fn scenario_d_stereo_is_averaged() {
    let right = tone(CANONICAL_RATE);
    let interleaved: Vec<f32> = right.iter().flat_map(|&r| [0.0, r]).collect();
    let stereo = encode_wav(&interleaved, 2, CANONICAL_RATE).unwrap();
    let mono = encode_wav(&right, 1, CANONICAL_RATE).unwrap();

    let chain = DecoderChain::default();
    let mixed = chain.decode(&stereo).unwrap();
    let right_only = chain.decode(&mono).unwrap();
    assert_eq!(mixed.len(), right_only.len());
    // Mean of silence and the tone: half the tone, not either channel.
    for (m, r) in mixed.samples().iter().zip(right_only.samples()) {
        assert!((m - 0.5 * r).abs() < 1e-6);
    }
    assert!(mixed.samples().iter().any(|&m| m != 0.0));
    assert_ne!(mixed.samples(), right_only.samples());

    let pipeline = FeaturePipeline::default();
    let features = pipeline.features(&stereo).unwrap();
    let silent_left = encode_wav(&vec![0.0; right.len()], 1, CANONICAL_RATE).unwrap();
    assert_ne!(features, pipeline.features(&silent_left).unwrap());
}

/// Rewrites the sample rate field of a canonical 44-byte WAV header.
fn with_header_rate(mut bytes: Vec<u8>, rate: u32) -> Vec<u8> {
    bytes[24..28].copy_from_slice(&rate.to_le_bytes());
    bytes
}

#[test]
fn extreme_header_rate_is_a_request_error() {
    let bytes = encode_wav(&[0.1; 64], 1, CANONICAL_RATE).unwrap();
    let screener = screener(boundary_network());

    let huge = with_header_rate(bytes.clone(), 4_294_967_291);
    let err = screener.predict(&huge).unwrap_err();
    assert!(
        matches!(err, PredictionError::Resample(ResampleError::InvalidRate { .. })),
        "{err}"
    );
    assert_eq!(err.stage(), "resample");

    let tiny = with_header_rate(bytes, 1);
    let err = FeaturePipeline::default().features(&tiny).unwrap_err();
    assert!(
        matches!(err, PredictionError::Resample(_) | PredictionError::Decode(_)),
        "{err}"
    );
}

#[test]
fn concurrent_predictions_agree() {
    let screener = Arc::new(screener(reference_network()));
    let bytes = Arc::new(encode_wav(&tone(22050), 1, 22050).unwrap());
    let expected = screener.predict(&bytes).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let screener = Arc::clone(&screener);
            let bytes = Arc::clone(&bytes);
            thread::spawn(move || screener.predict(&bytes).unwrap())
        })
        .collect();
    for h in handles {
        assert_eq!(h.join().unwrap(), expected);
    }
}

#[test]
fn features_are_deterministic() {
    let bytes = encode_wav(&tone(48000), 2, 24000).unwrap();
    let pipeline = FeaturePipeline::default();
    let a = pipeline.features(&bytes).unwrap();
    let b = pipeline.features(&bytes).unwrap();
    assert_eq!(a.to_array(), b.to_array());
}

#[test]
fn zero_std_dimension_scales_to_zero() {
    let bytes = encode_wav(&tone(CANONICAL_RATE), 1, CANONICAL_RATE).unwrap();
    let mut std = vec![1.0; FEATURE_LEN];
    std[81] = 0.0;
    let scaler = Scaler::new(vec![0.0; FEATURE_LEN], std).unwrap();

    let features = FeaturePipeline::default().features(&bytes).unwrap();
    let scaled = scaler.transform(&features.to_array()).unwrap();
    assert_eq!(scaled[81], 0.0);
    assert!(scaled.iter().all(|v| v.is_finite()));

    let artifacts = Artifacts::new(scaler, Box::new(boundary_network())).unwrap();
    let result = Screener::new(Arc::new(artifacts)).predict(&bytes).unwrap();
    assert_eq!(result.probability, 0.5);
}

#[test]
fn artifacts_load_and_fail_fast() {
    let dir = tempfile::tempdir().unwrap();
    let paths = ArtifactPaths::in_dir(dir.path());

    // Missing files.
    assert!(matches!(Artifacts::load(&paths), Err(ArtifactLoadError::Read { .. })));

    // Corrupt model.
    std::fs::write(&paths.scaler, serde_json::to_vec(&identity_scaler()).unwrap()).unwrap();
    std::fs::write(&paths.model, b"{\"layers\": [").unwrap();
    assert!(matches!(Artifacts::load(&paths), Err(ArtifactLoadError::Parse { .. })));

    // Well-formed but the wrong width.
    let narrow = DenseNetwork::new(vec![DenseLayer {
        weights: vec![vec![0.0; 40]],
        bias: vec![0.0],
        activation: Activation::Sigmoid,
    }])
    .unwrap();
    std::fs::write(&paths.model, serde_json::to_vec(&narrow).unwrap()).unwrap();
    assert!(matches!(
        Artifacts::load(&paths),
        Err(ArtifactLoadError::WidthMismatch { scaler: 86, classifier: 40 })
    ));

    // Valid pair.
    std::fs::write(&paths.model, serde_json::to_vec(&reference_network()).unwrap()).unwrap();
    let artifacts = Artifacts::load(&paths).unwrap();
    let bytes = encode_wav(&tone(CANONICAL_RATE), 1, CANONICAL_RATE).unwrap();
    let result = Screener::new(Arc::new(artifacts)).predict(&bytes).unwrap();
    assert!((0.0..=1.0).contains(&result.probability));
}

#[test]
fn fallback_decoder_order_is_respected() {
    use voicescreen_audio::DecoderKind;

    let bytes = encode_wav(&tone(CANONICAL_RATE), 1, CANONICAL_RATE).unwrap();
    let wav_first = DecoderChain::from_kinds(&[DecoderKind::Wav, DecoderKind::Symphonia]);
    let artifacts = Arc::new(Artifacts::new(identity_scaler(), Box::new(boundary_network())).unwrap());

    let a = Screener::with_decoders(Arc::clone(&artifacts), wav_first).features(&bytes).unwrap();
    let b = Screener::new(artifacts).features(&bytes).unwrap();
    assert_eq!(a.to_array(), b.to_array());
}
