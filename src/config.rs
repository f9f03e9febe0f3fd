//! Configuration management for detector calibration
//!
//! This module provides runtime configuration loading from JSON files,
//! so thresholds, category weights and DSP parameters can be tuned
//! without recompilation. Every section has defaults equal to the
//! shipped calibration; a partial JSON file only overrides what it names.

use crate::analysis::scoring::{Category, ScorerKind};
use crate::error::CalibrationError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Environment variables whose values replace `http.api_keys`
pub const API_KEY_ENV_VARS: [&str; 2] = ["API_KEY", "API_KEY_2"];

/// Tolerance when checking that category weights sum to 1.0
const WEIGHT_SUM_TOLERANCE: f32 = 1e-3;

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub detector: DetectorConfig,
    pub features: FeatureConfig,
    pub signal_weighted: SignalWeightedCalibration,
    pub baseline: BaselineCalibration,
    pub http: HttpConfig,
}

/// Pipeline-level settings and input validation bounds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Which scoring strategy classifies recordings
    pub scorer: ScorerKind,
    /// Sample rate every waveform is resampled to before analysis
    pub target_sample_rate: u32,
    pub min_duration_secs: f32,
    pub max_duration_secs: f32,
    /// Peak absolute amplitude below which a recording counts as silent
    pub min_peak: f32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            scorer: ScorerKind::SignalWeighted,
            target_sample_rate: 16_000,
            min_duration_secs: 0.5,
            max_duration_secs: 300.0,
            min_peak: 0.001,
        }
    }
}

/// DSP parameters for feature extraction
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// FFT window size in samples
    pub n_fft: usize,
    /// Hop size between STFT frames
    pub hop_length: usize,
    pub n_mels: usize,
    pub n_mfcc: usize,
    /// Dynamic range kept below the loudest mel cell, in dB
    pub top_db: f32,
    /// Frames in the delta regression window (odd)
    pub delta_width: usize,
    pub pitch_fmin: f32,
    pub pitch_fmax: f32,
    /// Fraction of the frame maximum a pitch candidate must exceed
    pub pitch_threshold: f32,
    /// Fewer voiced frames than this zero every pitch descriptor
    pub min_voiced_frames: usize,
    /// Frame-to-frame pitch change counted as a jump, in Hz
    pub pitch_jump_hz: f32,
    /// Frame length for zero-crossing rate and RMS
    pub frame_length: usize,
    /// Fraction of the global peak below which a sample is silent
    pub silence_threshold: f32,
    pub tempo_min_bpm: f32,
    pub tempo_max_bpm: f32,
    pub tempo_start_bpm: f32,
    pub tempo_max_lag_secs: f32,
    /// Median filter length for harmonic/percussive separation
    pub hpss_kernel: usize,
    pub harmonic_ratio_cap: f32,
    pub jitter_frame_ms: f32,
    pub jitter_hop_ms: f32,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            n_fft: 2048,
            hop_length: 512,
            n_mels: 128,
            n_mfcc: 13,
            top_db: 80.0,
            delta_width: 9,
            pitch_fmin: 50.0,
            pitch_fmax: 500.0,
            pitch_threshold: 0.1,
            min_voiced_frames: 10,
            pitch_jump_hz: 50.0,
            frame_length: 2048,
            silence_threshold: 0.02,
            tempo_min_bpm: 30.0,
            tempo_max_bpm: 320.0,
            tempo_start_bpm: 120.0,
            tempo_max_lag_secs: 8.0,
            hpss_kernel: 31,
            harmonic_ratio_cap: 100.0,
            jitter_frame_ms: 25.0,
            jitter_hop_ms: 10.0,
        }
    }
}

/// Relative importance of each analysis category
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryWeights {
    pub pitch: f32,
    pub cepstral: f32,
    pub spectral: f32,
    pub temporal: f32,
    pub voice_quality: f32,
}

impl CategoryWeights {
    pub fn weight(&self, category: Category) -> f32 {
        match category {
            Category::Pitch => self.pitch,
            Category::Cepstral => self.cepstral,
            Category::Spectral => self.spectral,
            Category::Temporal => self.temporal,
            Category::VoiceQuality => self.voice_quality,
        }
    }

    pub fn sum(&self) -> f32 {
        Category::ALL.iter().map(|&c| self.weight(c)).sum()
    }

    fn validate(&self) -> Result<(), CalibrationError> {
        for category in Category::ALL {
            check_finite(&format!("weights.{}", category.as_str()), self.weight(category))?;
        }
        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(CalibrationError::WeightsNotNormalized { sum });
        }
        Ok(())
    }
}

/// Confidence boost applied when more than `above` of the signals agree
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoostTier {
    pub above: f32,
    pub boost: f32,
}

/// Thresholds and aggregation constants for the signal-weighted scorer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalWeightedCalibration {
    pub weights: CategoryWeights,

    pub pitch_cv_synthetic_below: f32,
    pub pitch_cv_human_above: f32,
    pub pitch_std_hz: f32,
    pub pitch_range_hz: f32,

    pub mfcc_variance: f32,
    pub mfcc_delta_std: f32,
    pub mfcc_std_mean: f32,

    pub spectral_flatness: f32,
    pub spectral_centroid_std: f32,
    pub spectral_contrast: f32,

    /// Silence ratios strictly inside (low, high) read as natural pauses
    pub silence_band_low: f32,
    pub silence_band_high: f32,
    pub rms_cv: f32,
    pub zcr_std: f32,

    pub jitter: f32,
    pub shimmer: f32,
    pub harmonic_ratio: f32,

    /// Aggregate scores at or above this are labelled synthetic
    pub decision_boundary: f32,
    pub confidence_floor: f32,
    pub confidence_ceiling: f32,
    /// Checked in order; the first tier exceeded wins
    pub boost_tiers: Vec<BoostTier>,
    /// Indicators joined into the explanation sentence
    pub explanation_indicators: usize,
}

impl Default for SignalWeightedCalibration {
    fn default() -> Self {
        Self {
            weights: CategoryWeights {
                pitch: 0.30,
                cepstral: 0.20,
                spectral: 0.15,
                temporal: 0.15,
                voice_quality: 0.20,
            },
            pitch_cv_synthetic_below: 0.08,
            pitch_cv_human_above: 0.12,
            pitch_std_hz: 15.0,
            pitch_range_hz: 50.0,
            mfcc_variance: 80.0,
            mfcc_delta_std: 10.0,
            mfcc_std_mean: 10.0,
            spectral_flatness: 0.05,
            spectral_centroid_std: 200.0,
            spectral_contrast: 20.0,
            silence_band_low: 0.05,
            silence_band_high: 0.30,
            rms_cv: 0.4,
            zcr_std: 0.02,
            jitter: 0.02,
            shimmer: 0.30,
            harmonic_ratio: 50.0,
            decision_boundary: 0.50,
            confidence_floor: 0.55,
            confidence_ceiling: 0.99,
            boost_tiers: vec![
                BoostTier { above: 0.75, boost: 0.25 },
                BoostTier { above: 0.65, boost: 0.15 },
                BoostTier { above: 0.55, boost: 0.08 },
            ],
            explanation_indicators: 2,
        }
    }
}

impl SignalWeightedCalibration {
    pub fn validate(&self) -> Result<(), CalibrationError> {
        self.weights.validate()?;
        for (name, value) in [
            ("pitch_cv_synthetic_below", self.pitch_cv_synthetic_below),
            ("pitch_cv_human_above", self.pitch_cv_human_above),
            ("pitch_std_hz", self.pitch_std_hz),
            ("pitch_range_hz", self.pitch_range_hz),
            ("mfcc_variance", self.mfcc_variance),
            ("mfcc_delta_std", self.mfcc_delta_std),
            ("mfcc_std_mean", self.mfcc_std_mean),
            ("spectral_flatness", self.spectral_flatness),
            ("spectral_centroid_std", self.spectral_centroid_std),
            ("spectral_contrast", self.spectral_contrast),
            ("silence_band_low", self.silence_band_low),
            ("silence_band_high", self.silence_band_high),
            ("rms_cv", self.rms_cv),
            ("zcr_std", self.zcr_std),
            ("jitter", self.jitter),
            ("shimmer", self.shimmer),
            ("harmonic_ratio", self.harmonic_ratio),
            ("decision_boundary", self.decision_boundary),
        ] {
            check_finite(name, value)?;
        }
        for (i, tier) in self.boost_tiers.iter().enumerate() {
            check_finite(&format!("boost_tiers[{}].above", i), tier.above)?;
            check_finite(&format!("boost_tiers[{}].boost", i), tier.boost)?;
        }
        check_band("pitch_cv", self.pitch_cv_synthetic_below, self.pitch_cv_human_above)?;
        check_band("silence", self.silence_band_low, self.silence_band_high)?;
        check_bounds(self.confidence_floor, self.confidence_ceiling)
    }
}

/// Thresholds and aggregation constants for the baseline scorer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BaselineCalibration {
    pub weights: CategoryWeights,
    pub pitch_cv_strong: f32,
    pub pitch_cv_weak: f32,
    pub pitch_std_hz: f32,
    pub mfcc_variance: f32,
    pub mfcc_delta_std: f32,
    pub spectral_flatness: f32,
    pub spectral_centroid_std: f32,
    pub silence_low: f32,
    pub silence_high: f32,
    pub jitter: f32,
    pub harmonic_ratio: f32,
    pub decision_boundary: f32,
    pub confidence_floor: f32,
    pub confidence_ceiling: f32,
    pub explanation_indicators: usize,
}

impl Default for BaselineCalibration {
    fn default() -> Self {
        Self {
            weights: CategoryWeights {
                pitch: 0.25,
                cepstral: 0.20,
                spectral: 0.20,
                temporal: 0.15,
                voice_quality: 0.20,
            },
            pitch_cv_strong: 0.08,
            pitch_cv_weak: 0.12,
            pitch_std_hz: 15.0,
            mfcc_variance: 80.0,
            mfcc_delta_std: 10.0,
            spectral_flatness: 0.05,
            spectral_centroid_std: 200.0,
            silence_low: 0.03,
            silence_high: 0.35,
            jitter: 0.02,
            harmonic_ratio: 50.0,
            decision_boundary: 0.55,
            confidence_floor: 0.51,
            confidence_ceiling: 0.99,
            explanation_indicators: 1,
        }
    }
}

impl BaselineCalibration {
    pub fn validate(&self) -> Result<(), CalibrationError> {
        self.weights.validate()?;
        for (name, value) in [
            ("pitch_cv_strong", self.pitch_cv_strong),
            ("pitch_cv_weak", self.pitch_cv_weak),
            ("pitch_std_hz", self.pitch_std_hz),
            ("mfcc_variance", self.mfcc_variance),
            ("mfcc_delta_std", self.mfcc_delta_std),
            ("spectral_flatness", self.spectral_flatness),
            ("spectral_centroid_std", self.spectral_centroid_std),
            ("silence_low", self.silence_low),
            ("silence_high", self.silence_high),
            ("jitter", self.jitter),
            ("harmonic_ratio", self.harmonic_ratio),
            ("decision_boundary", self.decision_boundary),
        ] {
            check_finite(name, value)?;
        }
        check_band("pitch_cv", self.pitch_cv_strong, self.pitch_cv_weak)?;
        check_band("silence", self.silence_low, self.silence_high)?;
        check_bounds(self.confidence_floor, self.confidence_ceiling)
    }
}

/// HTTP service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
    /// Accepted values of the `x-api-key` header
    pub api_keys: Vec<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            api_keys: vec!["sk_test_123456789".to_string()],
        }
    }
}

fn check_finite(name: &str, value: f32) -> Result<(), CalibrationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(CalibrationError::NonFiniteThreshold {
            name: name.to_string(),
        })
    }
}

fn check_band(name: &str, low: f32, high: f32) -> Result<(), CalibrationError> {
    if low > high {
        return Err(CalibrationError::InvertedBand {
            name: name.to_string(),
            low,
            high,
        });
    }
    Ok(())
}

fn check_bounds(floor: f32, ceiling: f32) -> Result<(), CalibrationError> {
    let in_unit = |v: f32| v.is_finite() && (0.0..=1.0).contains(&v);
    if !in_unit(floor) || !in_unit(ceiling) || floor > ceiling {
        return Err(CalibrationError::InvalidConfidenceBounds { floor, ceiling });
    }
    Ok(())
}

impl AppConfig {
    /// Load configuration from JSON file
    ///
    /// # Arguments
    /// * `path` - Path to JSON config file
    ///
    /// # Returns
    /// The parsed configuration, or defaults when the file is missing or
    /// its JSON is invalid
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    log::info!("[Config] Loaded configuration from {:?}", path.as_ref());
                    config
                }
                Err(err) => {
                    log::warn!(
                        "[Config] Failed to parse JSON from {:?}: {}. Using defaults.",
                        path.as_ref(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!(
                    "[Config] Failed to read config file {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }

    /// Load configuration from the bundled assets directory
    pub fn load() -> Self {
        Self::load_from_file("assets/detector_config.json")
    }

    /// Apply `API_KEY`/`API_KEY_2` from the process environment
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|name| std::env::var(name).ok())
    }

    /// Apply environment overrides read through `lookup`
    ///
    /// When any of [`API_KEY_ENV_VARS`] is set to a non-empty value, the
    /// configured API keys are replaced by those values.
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let keys: Vec<String> = API_KEY_ENV_VARS
            .iter()
            .filter_map(|name| lookup(name))
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .collect();

        if !keys.is_empty() {
            log::info!(
                "[Config] Using {} API key(s) from the environment",
                keys.len()
            );
            self.http.api_keys = keys;
        }
        self
    }

    /// Check both scorer calibrations for internal consistency
    pub fn validate(&self) -> Result<(), CalibrationError> {
        self.signal_weighted.validate()?;
        self.baseline.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.detector.scorer, ScorerKind::SignalWeighted);
        assert_eq!(config.detector.target_sample_rate, 16_000);
        assert_eq!(config.features.n_fft, 2048);
        assert_eq!(config.signal_weighted.decision_boundary, 0.50);
        assert_eq!(config.baseline.decision_boundary, 0.55);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_json_roundtrip() {
        let config = AppConfig::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.features.hop_length, config.features.hop_length);
        assert_eq!(
            parsed.signal_weighted.boost_tiers,
            config.signal_weighted.boost_tiers
        );
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let parsed: AppConfig =
            serde_json::from_str(r#"{"detector": {"scorer": "baseline"}}"#).unwrap();
        assert_eq!(parsed.detector.scorer, ScorerKind::Baseline);
        assert_eq!(parsed.detector.min_duration_secs, 0.5);
        assert_eq!(parsed.signal_weighted.jitter, 0.02);
    }

    #[test]
    fn test_env_api_keys_replace_configured_keys() {
        let config = AppConfig::default().with_overrides_from(|name| match name {
            "API_KEY" => Some("sk_prod_primary".to_string()),
            "API_KEY_2" => Some("sk_prod_secondary".to_string()),
            _ => None,
        });
        assert_eq!(
            config.http.api_keys,
            vec!["sk_prod_primary".to_string(), "sk_prod_secondary".to_string()]
        );
        assert!(!config
            .http
            .api_keys
            .contains(&"sk_test_123456789".to_string()));
    }

    #[test]
    fn test_unset_or_blank_env_keeps_configured_keys() {
        let unset = AppConfig::default().with_overrides_from(|_| None);
        assert_eq!(unset.http.api_keys, vec!["sk_test_123456789".to_string()]);

        let blank = AppConfig::default().with_overrides_from(|_| Some("  ".to_string()));
        assert_eq!(blank.http.api_keys, vec!["sk_test_123456789".to_string()]);

        let second_only = AppConfig::default().with_overrides_from(|name| {
            (name == "API_KEY_2").then(|| "sk_live_only".to_string())
        });
        assert_eq!(second_only.http.api_keys, vec!["sk_live_only".to_string()]);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = AppConfig::load_from_file("/nonexistent/detector_config.json");
        assert_eq!(config.features.n_mfcc, 13);
    }

    #[test]
    fn test_validate_rejects_unnormalized_weights() {
        let mut config = AppConfig::default();
        config.signal_weighted.weights.pitch = 0.5;
        match config.validate() {
            Err(CalibrationError::WeightsNotNormalized { sum }) => {
                assert!((sum - 1.2).abs() < 1e-4)
            }
            other => panic!("expected WeightsNotNormalized, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_inverted_silence_band() {
        let mut config = AppConfig::default();
        config.signal_weighted.silence_band_low = 0.4;
        assert!(matches!(
            config.validate(),
            Err(CalibrationError::InvertedBand { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_bad_confidence_bounds() {
        let mut config = AppConfig::default();
        config.baseline.confidence_floor = 1.5;
        assert!(matches!(
            config.validate(),
            Err(CalibrationError::InvalidConfidenceBounds { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_nan_threshold() {
        let mut config = AppConfig::default();
        config.signal_weighted.jitter = f32::NAN;
        assert!(matches!(
            config.validate(),
            Err(CalibrationError::NonFiniteThreshold { .. })
        ));
    }

    #[test]
    fn test_bundled_config_matches_defaults() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("assets/detector_config.json");
        let bundled = AppConfig::load_from_file(&path);
        let defaults = AppConfig::default();

        assert!(bundled.validate().is_ok());
        assert_eq!(
            serde_json::to_value(&bundled).unwrap(),
            serde_json::to_value(&defaults).unwrap()
        );
    }
}
