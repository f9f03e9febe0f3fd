use super::*;
use crate::analysis::features::FeatureName;
use crate::fixtures::{self, DEFAULT_SEED};

const SR: u32 = 16_000;

fn detector() -> VoiceDetector {
    VoiceDetector::new(&AppConfig::default()).expect("default calibration is valid")
}

fn tone_waveform() -> Waveform {
    Waveform::unchecked(fixtures::tone(200.0, 0.8, 2_000, SR), SR)
}

fn speech_waveform() -> Waveform {
    Waveform::unchecked(fixtures::speech_like(3_000, SR, DEFAULT_SEED), SR)
}

#[test]
fn test_sustained_tone_is_ai_generated() {
    let report = detector().analyze(&tone_waveform());

    println!(
        "Tone: {:?} weighted={:.3} agreement={:.3}",
        report.result, report.weighted_score, report.agreement
    );
    assert_eq!(report.result.classification, Classification::AiGenerated);
    assert!(report.result.confidence >= 0.55);
    assert!(report.result.confidence <= 0.99);
    assert!(!report.result.explanation.is_empty());
}

#[test]
fn test_speech_like_signal_is_human() {
    let report = detector().analyze(&speech_waveform());

    println!(
        "Speech-like: {:?} weighted={:.3} features={}",
        report.result,
        report.weighted_score,
        serde_json::to_string(&report.features).unwrap()
    );
    assert!(report.features.get(FeatureName::PitchCv) > 0.12);
    assert_eq!(report.result.classification, Classification::Human);
    assert!(report.result.confidence >= 0.55);
}

#[test]
fn test_very_short_input_still_decides() {
    let waveform = Waveform::unchecked(fixtures::tone(200.0, 0.8, 20, SR), SR);
    assert_eq!(waveform.samples().len(), 320);

    let result = detector().detect(&waveform);
    assert!(result.confidence >= 0.55 && result.confidence <= 0.99);
    assert!(!result.explanation.is_empty());
}

#[test]
fn test_detection_is_deterministic() {
    let detector = detector();
    let waveform = speech_waveform();
    assert_eq!(detector.analyze(&waveform), detector.analyze(&waveform));
}

#[test]
fn test_report_carries_all_categories() {
    let report = detector().analyze(&tone_waveform());
    assert_eq!(report.scorer, "signal-weighted");
    assert_eq!(report.features.len(), FeatureName::ALL.len());
    let order: Vec<_> = report.categories.iter().map(|c| c.category).collect();
    assert_eq!(order, scoring::Category::ALL.to_vec());
}

#[test]
fn test_baseline_scorer_selectable() {
    let detector = VoiceDetector::with_scorer(&AppConfig::default(), ScorerKind::Baseline)
        .expect("default calibration is valid");
    assert_eq!(detector.scorer_name(), "baseline");

    let result = detector.detect(&tone_waveform());
    assert_eq!(result.classification, Classification::AiGenerated);
    assert!(result.confidence >= 0.51 && result.confidence <= 0.99);
}

#[test]
fn test_invalid_calibration_is_rejected() {
    let mut config = AppConfig::default();
    config.signal_weighted.weights.pitch = 0.9;
    assert!(matches!(
        VoiceDetector::new(&config),
        Err(CalibrationError::WeightsNotNormalized { .. })
    ));
}

#[test]
fn test_other_sample_rates_are_analysed_in_hz() {
    let waveform = Waveform::unchecked(fixtures::tone(200.0, 0.8, 1_000, 22_050), 22_050);
    let features = detector().features(&waveform);
    assert!((features.get(FeatureName::PitchMean) - 200.0).abs() < 8.0);
}

#[test]
fn test_result_serialises_with_wire_names() {
    let result = DetectionResult {
        classification: Classification::AiGenerated,
        confidence: 0.87,
        explanation: "Unnaturally consistent pitch detected".to_string(),
    };
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["classification"], "AI_GENERATED");
    assert_eq!(json["explanation"], "Unnaturally consistent pitch detected");
    assert!((json["confidenceScore"].as_f64().unwrap() - 0.87).abs() < 1e-6);

    let parsed: DetectionResult = serde_json::from_value(json).unwrap();
    assert_eq!(parsed, result);
    assert_eq!(Classification::Human.to_string(), "HUMAN");
}
