//! End-to-end tests through the public API
//!
//! WAV bytes → decode/resample → validation → features → scoring → result.

use voice_detector::analysis::features::FeatureName;
use voice_detector::analysis::scoring::ScorerKind;
use voice_detector::audio::{decode_wav_bytes, resample_linear};
use voice_detector::error::{AudioError, ErrorCode};
use voice_detector::fixtures::{encode_wav, speech_like, tone, white_noise, DEFAULT_SEED};
use voice_detector::{AppConfig, Classification, VoiceDetector};

fn detector(kind: ScorerKind) -> VoiceDetector {
    VoiceDetector::with_scorer(&AppConfig::default(), kind).expect("default calibration")
}

#[test]
fn test_resampled_tone_is_ai_generated() {
    let config = AppConfig::default();
    let bytes = encode_wav(&tone(200.0, 0.8, 2_000, 44_100), 44_100).unwrap();
    let waveform = decode_wav_bytes(&bytes, &config.detector).unwrap();
    assert_eq!(waveform.sample_rate(), 16_000);

    let result = detector(ScorerKind::SignalWeighted).detect(&waveform);
    assert_eq!(result.classification, Classification::AiGenerated);
}

#[test]
fn test_speech_like_is_human_under_both_scorers() {
    let config = AppConfig::default();
    let bytes = encode_wav(&speech_like(4_000, 16_000, DEFAULT_SEED), 16_000).unwrap();
    let waveform = decode_wav_bytes(&bytes, &config.detector).unwrap();

    let report = detector(ScorerKind::SignalWeighted).analyze(&waveform);
    println!(
        "signal-weighted: {:?} weighted={:.3}",
        report.result, report.weighted_score
    );
    assert_eq!(report.result.classification, Classification::Human);
    assert!(report.features.get(FeatureName::PitchStd) > 15.0);

    let baseline = detector(ScorerKind::Baseline).detect(&waveform);
    println!("baseline: {:?}", baseline);
    assert_eq!(baseline.classification, Classification::Human);
}

#[test]
fn test_confidence_always_within_clamp() {
    let inputs = [
        tone(440.0, 0.3, 1_000, 16_000),
        white_noise(0.5, 1_000, 16_000, 3),
        speech_like(1_000, 16_000, 4),
    ];
    for samples in inputs {
        let bytes = encode_wav(&samples, 16_000).unwrap();
        let waveform = decode_wav_bytes(&bytes, &AppConfig::default().detector).unwrap();

        let result = detector(ScorerKind::SignalWeighted).detect(&waveform);
        assert!((0.55..=0.99).contains(&result.confidence), "{:?}", result);

        let result = detector(ScorerKind::Baseline).detect(&waveform);
        assert!((0.51..=0.99).contains(&result.confidence), "{:?}", result);
    }
}

#[test]
fn test_invalid_recordings_are_rejected_before_analysis() {
    let config = AppConfig::default();

    let silent = encode_wav(&vec![0.0; 16_000], 16_000).unwrap();
    let err = decode_wav_bytes(&silent, &config.detector).unwrap_err();
    assert!(matches!(err, AudioError::Silent { .. }));
    assert_eq!(err.code(), 1003);

    let short = encode_wav(&tone(200.0, 0.8, 400, 16_000), 16_000).unwrap();
    let err = decode_wav_bytes(&short, &config.detector).unwrap_err();
    assert!(err.message().contains("Minimum 0.5 seconds"));
}

#[test]
fn test_resample_preserves_tone_frequency() {
    let resampled = resample_linear(&tone(300.0, 0.8, 1_000, 48_000), 48_000, 16_000);
    assert_eq!(resampled.len(), 16_000);

    let crossings = resampled
        .windows(2)
        .filter(|w| (w[0] >= 0.0) != (w[1] >= 0.0))
        .count();
    // 300 Hz → ~600 zero crossings per second
    assert!((590..=610).contains(&crossings), "crossings {}", crossings);
}
