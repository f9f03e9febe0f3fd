// Analysis module - detection pipeline from waveform to decision
//
// This module wires the stages of one detection request together. Every
// request owns its own FeatureVector, category scores and tallies; nothing
// survives between calls, so a single VoiceDetector can serve concurrent
// requests without locking.
//
// Architecture:
// - Pipeline: Waveform → FeatureExtractor → Scorer (category analyzers →
//   Aggregator → ExplanationGenerator) → DetectionResult
// - VoiceDetector: owns the extractor and the configured scoring strategy

pub mod features;
pub mod scoring;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::audio::Waveform;
use crate::config::{AppConfig, FeatureConfig};
use crate::error::{log_calibration_error, CalibrationError};
use features::{FeatureExtractor, FeatureVector};
use scoring::{CategoryScore, Scorer, ScorerKind};

/// Final label of a detection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Classification {
    #[serde(rename = "AI_GENERATED")]
    AiGenerated,
    #[serde(rename = "HUMAN")]
    Human,
}

impl Classification {
    pub fn as_str(self) -> &'static str {
        match self {
            Classification::AiGenerated => "AI_GENERATED",
            Classification::Human => "HUMAN",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal output of one detection request
///
/// Serialised with the field names the HTTP surface reports
/// (`classification`, `confidenceScore`, `explanation`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    pub classification: Classification,
    /// Confidence in the label, within the scorer's clamp, 2 decimals
    #[serde(rename = "confidenceScore")]
    pub confidence: f32,
    pub explanation: String,
}

/// Decision plus the intermediate values behind it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionReport {
    pub result: DetectionResult,
    pub scorer: &'static str,
    pub weighted_score: f32,
    pub agreement: f32,
    pub features: FeatureVector,
    pub categories: Vec<CategoryScore>,
}

/// Detection pipeline with one configured scoring strategy
pub struct VoiceDetector {
    feature_config: FeatureConfig,
    extractor: FeatureExtractor,
    scorer: Box<dyn Scorer>,
}

impl VoiceDetector {
    /// Create a detector using the scorer named in `config.detector.scorer`
    ///
    /// # Returns
    /// `CalibrationError` when either scorer calibration is inconsistent
    pub fn new(config: &AppConfig) -> Result<Self, CalibrationError> {
        Self::with_scorer(config, config.detector.scorer)
    }

    /// Create a detector with an explicit scoring strategy
    pub fn with_scorer(config: &AppConfig, kind: ScorerKind) -> Result<Self, CalibrationError> {
        if let Err(err) = config.validate() {
            log_calibration_error(&err, "VoiceDetector::with_scorer");
            return Err(err);
        }

        log::info!(
            "[VoiceDetector] Using {} scorer at {} Hz",
            kind,
            config.detector.target_sample_rate
        );

        Ok(Self {
            feature_config: config.features.clone(),
            extractor: FeatureExtractor::new(config.detector.target_sample_rate, &config.features),
            scorer: kind.build(config),
        })
    }

    pub fn scorer_name(&self) -> &'static str {
        self.scorer.name()
    }

    /// Sample rate the extractor was built for
    pub fn sample_rate(&self) -> u32 {
        self.extractor.sample_rate()
    }

    /// Extract the feature vector only
    ///
    /// Waveforms at another rate than the detector's get a one-off extractor
    /// so frequency-dependent features stay in Hz.
    pub fn features(&self, waveform: &Waveform) -> FeatureVector {
        if waveform.sample_rate() == self.extractor.sample_rate() {
            self.extractor.extract(waveform.samples())
        } else {
            log::debug!(
                "[VoiceDetector] Waveform at {} Hz, building extractor for that rate",
                waveform.sample_rate()
            );
            FeatureExtractor::new(waveform.sample_rate(), &self.feature_config)
                .extract(waveform.samples())
        }
    }

    /// Classify a waveform
    pub fn detect(&self, waveform: &Waveform) -> DetectionResult {
        self.analyze(waveform).result
    }

    /// Classify a waveform and keep the diagnostics
    pub fn analyze(&self, waveform: &Waveform) -> DetectionReport {
        let features = self.features(waveform);
        let assessment = self.scorer.score(&features);

        log::info!(
            "[VoiceDetector] {:.2}s via {}: {} ({:.2}) - {}",
            waveform.duration_secs(),
            self.scorer.name(),
            assessment.result.classification,
            assessment.result.confidence,
            assessment.result.explanation
        );

        DetectionReport {
            result: assessment.result,
            scorer: self.scorer.name(),
            weighted_score: assessment.weighted_score,
            agreement: assessment.agreement,
            features,
            categories: assessment.categories,
        }
    }
}

#[cfg(test)]
mod tests;
