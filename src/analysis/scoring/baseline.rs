// BaselineScorer - fixed base scores with capped bonuses
//
// Each category's primary test selects a base synthetic likelihood; secondary
// tests add a bonus up to a per-category cap. Category scores are combined
// by weighted mean with no agreement boost and a looser confidence floor.

use super::{
    Aggregator, Category, CategoryScore, ExplanationGenerator, Indicator, Polarity, Scorer,
    SignalTally,
};
use crate::analysis::features::{FeatureName, FeatureVector};
use crate::config::BaselineCalibration;

/// Category score under construction
struct BaseScore {
    category: Category,
    score: f32,
    indicators: Vec<Indicator>,
    tally: SignalTally,
}

impl BaseScore {
    fn new(category: Category, score: f32) -> Self {
        Self {
            category,
            score,
            indicators: Vec::new(),
            tally: SignalTally::default(),
        }
    }

    fn indicate(&mut self, polarity: Polarity, message: &'static str) {
        self.indicators.push(Indicator {
            category: self.category,
            polarity,
            message,
        });
        self.tally.record(polarity);
    }

    fn bonus(&mut self, amount: f32, cap: f32) {
        self.score = (self.score + amount).min(cap);
    }

    /// Baseline scores are direct likelihoods; the weights mirror them
    fn finish(self) -> CategoryScore {
        CategoryScore {
            category: self.category,
            score: self.score,
            synthetic_weight: self.score,
            human_weight: 1.0 - self.score,
            indicators: self.indicators,
            tally: self.tally,
        }
    }
}

/// Second scoring strategy with the service's first calibration
pub struct BaselineScorer {
    calibration: BaselineCalibration,
    aggregator: Aggregator,
    explainer: ExplanationGenerator,
}

impl BaselineScorer {
    pub fn new(calibration: BaselineCalibration) -> Self {
        let aggregator = Aggregator::new(
            calibration.weights,
            calibration.decision_boundary,
            calibration.confidence_floor,
            calibration.confidence_ceiling,
            Vec::new(),
        );
        let explainer = ExplanationGenerator::new(calibration.explanation_indicators);
        Self {
            calibration,
            aggregator,
            explainer,
        }
    }

    fn analyze_pitch(&self, features: &FeatureVector) -> CategoryScore {
        let cal = &self.calibration;
        let cv = features.get(FeatureName::PitchCv);
        let std = features.get(FeatureName::PitchStd);

        let mut score = if cv < cal.pitch_cv_strong {
            let mut s = BaseScore::new(Category::Pitch, 0.85);
            s.indicate(Polarity::Synthetic, "Unnaturally consistent pitch detected");
            s
        } else if cv < cal.pitch_cv_weak {
            let mut s = BaseScore::new(Category::Pitch, 0.65);
            s.indicate(Polarity::Synthetic, "Limited pitch variation observed");
            s
        } else {
            let mut s = BaseScore::new(Category::Pitch, 0.25);
            s.indicate(Polarity::Human, "Natural pitch variation present");
            s
        };

        if std > 0.0 && std < cal.pitch_std_hz {
            score.bonus(0.1, 0.95);
        }
        score.finish()
    }

    fn analyze_cepstral(&self, features: &FeatureVector) -> CategoryScore {
        let cal = &self.calibration;
        let mut score = if features.get(FeatureName::MfccVariance) < cal.mfcc_variance {
            let mut s = BaseScore::new(Category::Cepstral, 0.75);
            s.indicate(Polarity::Synthetic, "Low spectral complexity detected");
            s
        } else {
            BaseScore::new(Category::Cepstral, 0.35)
        };

        if features.get(FeatureName::MfccDeltaStd) < cal.mfcc_delta_std {
            score.bonus(0.15, 0.9);
            score.indicate(Polarity::Synthetic, "Limited dynamic speech patterns");
        }
        score.finish()
    }

    fn analyze_spectral(&self, features: &FeatureVector) -> CategoryScore {
        let cal = &self.calibration;
        let mut score = if features.get(FeatureName::SpectralFlatnessMean) > cal.spectral_flatness {
            let mut s = BaseScore::new(Category::Spectral, 0.7);
            s.indicate(Polarity::Synthetic, "Unusual spectral characteristics");
            s
        } else {
            BaseScore::new(Category::Spectral, 0.4)
        };

        if features.get(FeatureName::SpectralCentroidStd) < cal.spectral_centroid_std {
            score.bonus(0.1, 0.85);
        }
        score.finish()
    }

    fn analyze_temporal(&self, features: &FeatureVector) -> CategoryScore {
        let cal = &self.calibration;
        let silence = features.get(FeatureName::SilenceRatio);

        let mut score;
        if silence < cal.silence_low {
            score = BaseScore::new(Category::Temporal, 0.8);
            score.indicate(Polarity::Synthetic, "Lack of natural breathing pauses");
        } else if silence > cal.silence_high {
            score = BaseScore::new(Category::Temporal, 0.65);
            score.indicate(Polarity::Synthetic, "Unusual pause patterns detected");
        } else {
            score = BaseScore::new(Category::Temporal, 0.3);
            score.indicate(Polarity::Human, "Natural speech rhythm detected");
        }
        score.finish()
    }

    fn analyze_voice_quality(&self, features: &FeatureVector) -> CategoryScore {
        let cal = &self.calibration;
        let mut score = if features.get(FeatureName::Jitter) < cal.jitter {
            let mut s = BaseScore::new(Category::VoiceQuality, 0.8);
            s.indicate(Polarity::Synthetic, "Missing natural voice micro-variations");
            s
        } else {
            let mut s = BaseScore::new(Category::VoiceQuality, 0.3);
            s.indicate(Polarity::Human, "Natural voice tremor patterns present");
            s
        };

        if features.get(FeatureName::HarmonicRatio) > cal.harmonic_ratio {
            score.bonus(0.1, 0.9);
            score.indicate(Polarity::Synthetic, "Unusually clean audio signal");
        }
        score.finish()
    }
}

impl Scorer for BaselineScorer {
    fn name(&self) -> &'static str {
        "baseline"
    }

    fn score_categories(&self, features: &FeatureVector) -> Vec<CategoryScore> {
        let categories = vec![
            self.analyze_pitch(features),
            self.analyze_cepstral(features),
            self.analyze_spectral(features),
            self.analyze_temporal(features),
            self.analyze_voice_quality(features),
        ];
        log::debug!(
            "[BaselineScorer] scores: {}",
            categories
                .iter()
                .map(|c| format!("{}={:.2}", c.category, c.score))
                .collect::<Vec<_>>()
                .join(" ")
        );
        categories
    }

    fn aggregator(&self) -> &Aggregator {
        &self.aggregator
    }

    fn explainer(&self) -> &ExplanationGenerator {
        &self.explainer
    }
}
