// SignalWeightedScorer - evidence accumulation over independent threshold tests
//
// Every category runs a few tests against the calibration. A test that fires
// adds its weight to the synthetic or human side, emits one indicator and
// counts toward the signal tally. The category score is the synthetic share
// of the accumulated weight (0.5 when nothing fired). The aggregator then
// boosts confidence when most fired signals agree.

use super::{
    Aggregator, Category, CategoryScore, Evidence, ExplanationGenerator, Scorer, Signal,
};
use crate::analysis::features::{FeatureName, FeatureVector};
use crate::config::SignalWeightedCalibration;
use std::cmp::Ordering;

const CONSISTENT_PITCH: Signal = Signal::synthetic(0.4, "Unnaturally consistent pitch detected");
const VARIED_PITCH: Signal = Signal::human(0.4, "Natural pitch variation present");
const MODERATE_PITCH: Signal = Signal::human(0.2, "Moderate pitch variation observed");
const NARROW_DEVIATION: Signal = Signal::synthetic(0.3, "Limited pitch deviation detected");
const NATURAL_DEVIATION: Signal = Signal::human(0.3, "Natural pitch deviation present");
const LIMITED_RANGE: Signal = Signal::synthetic(0.2, "Limited pitch range");
const WIDE_RANGE: Signal = Signal::human(0.3, "Wide natural pitch range");

const LOW_COMPLEXITY: Signal = Signal::synthetic(0.4, "Low spectral complexity detected");
const RICH_TEXTURE: Signal = Signal::human(0.4, "Rich cepstral texture present");
const LIMITED_DYNAMICS: Signal = Signal::synthetic(0.3, "Limited dynamic speech patterns");
const NATURAL_DYNAMICS: Signal = Signal::human(0.3, "Natural articulation dynamics present");
const UNIFORM_TIMBRE: Signal = Signal::synthetic(0.2, "Uniform timbre across frames");
const RICH_TIMBRE: Signal = Signal::human(0.3, "Rich timbral variation present");

const HARMONIC_STRUCTURE: Signal = Signal::human(0.35, "Natural harmonic spectral structure");
const UNUSUAL_SPECTRUM: Signal = Signal::synthetic(0.25, "Unusual spectral characteristics");
const STATIC_SPECTRUM: Signal = Signal::synthetic(0.3, "Limited spectral movement");
const MOVING_SPECTRUM: Signal = Signal::human(0.35, "Natural spectral movement present");
const LOW_CONTRAST: Signal = Signal::synthetic(0.2, "Low spectral contrast");
const RICH_CONTRAST: Signal = Signal::human(0.3, "Rich spectral contrast present");

const BREATHING_PAUSES: Signal = Signal::human(0.5, "Natural breathing pauses present");
const NO_PAUSES: Signal = Signal::synthetic(0.4, "Lack of natural breathing pauses");
const ODD_PAUSES: Signal = Signal::synthetic(0.3, "Unusual pause patterns detected");
const STEADY_LOUDNESS: Signal = Signal::synthetic(0.25, "Unnaturally steady loudness");
const LOUDNESS_DYNAMICS: Signal = Signal::human(0.3, "Natural loudness dynamics present");
const FEW_TRANSITIONS: Signal = Signal::synthetic(0.15, "Limited voicing transitions");
const VOICING_TRANSITIONS: Signal = Signal::human(0.2, "Natural voicing transitions present");

const NO_MICRO_VARIATION: Signal = Signal::synthetic(0.4, "Missing natural voice micro-variations");
const TREMOR: Signal = Signal::human(0.4, "Natural voice tremor patterns present");
const NO_SHIMMER: Signal = Signal::synthetic(0.3, "Lacking natural amplitude shimmer");
const SHIMMER: Signal = Signal::human(0.3, "Natural amplitude shimmer present");
const BREATH_NOISE: Signal = Signal::human(0.25, "Natural breath noise present");
const CLEAN_SIGNAL: Signal = Signal::synthetic(0.25, "Unusually clean audio signal");

/// Default scoring strategy: weighted evidence with agreement boost
pub struct SignalWeightedScorer {
    calibration: SignalWeightedCalibration,
    aggregator: Aggregator,
    explainer: ExplanationGenerator,
}

impl SignalWeightedScorer {
    pub fn new(calibration: SignalWeightedCalibration) -> Self {
        let aggregator = Aggregator::new(
            calibration.weights,
            calibration.decision_boundary,
            calibration.confidence_floor,
            calibration.confidence_ceiling,
            calibration.boost_tiers.clone(),
        );
        let explainer = ExplanationGenerator::new(calibration.explanation_indicators);
        Self {
            calibration,
            aggregator,
            explainer,
        }
    }

    pub fn calibration(&self) -> &SignalWeightedCalibration {
        &self.calibration
    }

    fn analyze_pitch(&self, features: &FeatureVector) -> CategoryScore {
        let cal = &self.calibration;
        let mut evidence = Evidence::new(Category::Pitch);

        let cv = features.get(FeatureName::PitchCv);
        match (
            cv.partial_cmp(&cal.pitch_cv_synthetic_below),
            cv.partial_cmp(&cal.pitch_cv_human_above),
        ) {
            (Some(Ordering::Less), _) => evidence.record(CONSISTENT_PITCH),
            (_, Some(Ordering::Greater)) => evidence.record(VARIED_PITCH),
            // the human-above threshold closes the moderate band
            (Some(Ordering::Greater), Some(Ordering::Less | Ordering::Equal)) => {
                evidence.record(MODERATE_PITCH)
            }
            _ => {}
        }

        // std == 0 means no voiced frames and reads as human
        let std = features.get(FeatureName::PitchStd);
        if std == 0.0 {
            evidence.record(NATURAL_DEVIATION);
        } else {
            evidence.compare(std, cal.pitch_std_hz, NARROW_DEVIATION, NATURAL_DEVIATION);
        }

        evidence.compare(
            features.get(FeatureName::PitchRange),
            cal.pitch_range_hz,
            LIMITED_RANGE,
            WIDE_RANGE,
        );

        evidence.finish()
    }

    fn analyze_cepstral(&self, features: &FeatureVector) -> CategoryScore {
        let cal = &self.calibration;
        let mut evidence = Evidence::new(Category::Cepstral);

        evidence.compare(
            features.get(FeatureName::MfccVariance),
            cal.mfcc_variance,
            LOW_COMPLEXITY,
            RICH_TEXTURE,
        );
        evidence.compare(
            features.get(FeatureName::MfccDeltaStd),
            cal.mfcc_delta_std,
            LIMITED_DYNAMICS,
            NATURAL_DYNAMICS,
        );
        evidence.compare(
            features.get(FeatureName::MfccStdMean),
            cal.mfcc_std_mean,
            UNIFORM_TIMBRE,
            RICH_TIMBRE,
        );

        evidence.finish()
    }

    fn analyze_spectral(&self, features: &FeatureVector) -> CategoryScore {
        let cal = &self.calibration;
        let mut evidence = Evidence::new(Category::Spectral);

        evidence.compare(
            features.get(FeatureName::SpectralFlatnessMean),
            cal.spectral_flatness,
            HARMONIC_STRUCTURE,
            UNUSUAL_SPECTRUM,
        );
        evidence.compare(
            features.get(FeatureName::SpectralCentroidStd),
            cal.spectral_centroid_std,
            STATIC_SPECTRUM,
            MOVING_SPECTRUM,
        );
        evidence.compare(
            features.get(FeatureName::SpectralContrastMean),
            cal.spectral_contrast,
            LOW_CONTRAST,
            RICH_CONTRAST,
        );

        evidence.finish()
    }

    fn analyze_temporal(&self, features: &FeatureVector) -> CategoryScore {
        let cal = &self.calibration;
        let mut evidence = Evidence::new(Category::Temporal);

        let silence = features.get(FeatureName::SilenceRatio);
        if silence > cal.silence_band_low && silence < cal.silence_band_high {
            evidence.record(BREATHING_PAUSES);
        } else if silence < cal.silence_band_low {
            evidence.record(NO_PAUSES);
        } else if silence > cal.silence_band_high {
            evidence.record(ODD_PAUSES);
        }

        evidence.compare(
            features.get(FeatureName::RmsCv),
            cal.rms_cv,
            STEADY_LOUDNESS,
            LOUDNESS_DYNAMICS,
        );
        evidence.compare(
            features.get(FeatureName::ZcrStd),
            cal.zcr_std,
            FEW_TRANSITIONS,
            VOICING_TRANSITIONS,
        );

        evidence.finish()
    }

    fn analyze_voice_quality(&self, features: &FeatureVector) -> CategoryScore {
        let cal = &self.calibration;
        let mut evidence = Evidence::new(Category::VoiceQuality);

        evidence.compare(
            features.get(FeatureName::Jitter),
            cal.jitter,
            NO_MICRO_VARIATION,
            TREMOR,
        );
        evidence.compare(
            features.get(FeatureName::Shimmer),
            cal.shimmer,
            NO_SHIMMER,
            SHIMMER,
        );
        evidence.compare(
            features.get(FeatureName::HarmonicRatio),
            cal.harmonic_ratio,
            BREATH_NOISE,
            CLEAN_SIGNAL,
        );

        evidence.finish()
    }
}

impl Scorer for SignalWeightedScorer {
    fn name(&self) -> &'static str {
        "signal-weighted"
    }

    fn score_categories(&self, features: &FeatureVector) -> Vec<CategoryScore> {
        let categories = vec![
            self.analyze_pitch(features),
            self.analyze_cepstral(features),
            self.analyze_spectral(features),
            self.analyze_temporal(features),
            self.analyze_voice_quality(features),
        ];
        for c in &categories {
            log::debug!(
                "[SignalWeightedScorer] {} score={:.3} ({} indicators)",
                c.category,
                c.score,
                c.indicators.len()
            );
        }
        categories
    }

    fn aggregator(&self) -> &Aggregator {
        &self.aggregator
    }

    fn explainer(&self) -> &ExplanationGenerator {
        &self.explainer
    }
}

#[cfg(test)]
#[path = "signal_weighted_tests.rs"]
mod tests;
