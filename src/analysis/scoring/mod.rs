// Scoring - category analyzers, aggregation and explanation
//
// A scorer reads an immutable FeatureVector and produces one CategoryScore
// per analysis category. Each score carries the indicators that fired and a
// tally of synthetic- and human-leaning signals; the Aggregator merges those
// values into a label and confidence, and the ExplanationGenerator turns the
// indicators into one sentence.
//
// Two calibrated strategies implement the Scorer trait:
// - SignalWeightedScorer: evidence accumulation with agreement boost (default)
// - BaselineScorer: fixed base scores per category with capped bonuses

mod aggregate;
mod baseline;
mod explanation;
mod signal_weighted;

pub use aggregate::{Aggregate, Aggregator};
pub use baseline::BaselineScorer;
pub use explanation::ExplanationGenerator;
pub use signal_weighted::SignalWeightedScorer;

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use super::features::stats::safe_ratio;
use super::features::FeatureVector;
use super::{Classification, DetectionResult};
use crate::config::AppConfig;

/// Analysis category, in aggregation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Pitch,
    Cepstral,
    Spectral,
    Temporal,
    VoiceQuality,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Pitch,
        Category::Cepstral,
        Category::Spectral,
        Category::Temporal,
        Category::VoiceQuality,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Pitch => "pitch",
            Category::Cepstral => "cepstral",
            Category::Spectral => "spectral",
            Category::Temporal => "temporal",
            Category::VoiceQuality => "voice_quality",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction an indicator leans
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    Synthetic,
    Human,
}

impl Polarity {
    /// Polarity that supports `classification`
    pub fn supporting(classification: Classification) -> Self {
        match classification {
            Classification::AiGenerated => Polarity::Synthetic,
            Classification::Human => Polarity::Human,
        }
    }
}

/// Descriptive evidence emitted when a threshold test fires
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Indicator {
    pub category: Category,
    pub polarity: Polarity,
    pub message: &'static str,
}

/// Count of fired synthetic- and human-leaning tests
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SignalTally {
    pub synthetic: u32,
    pub human: u32,
}

impl SignalTally {
    pub fn record(&mut self, polarity: Polarity) {
        match polarity {
            Polarity::Synthetic => self.synthetic += 1,
            Polarity::Human => self.human += 1,
        }
    }

    pub fn merge(self, other: SignalTally) -> SignalTally {
        SignalTally {
            synthetic: self.synthetic + other.synthetic,
            human: self.human + other.human,
        }
    }

    pub fn total(&self) -> u32 {
        self.synthetic + self.human
    }

    /// Share of the majority polarity, 0.0 when no test fired
    pub fn agreement_ratio(&self) -> f32 {
        safe_ratio(
            self.synthetic.max(self.human) as f32,
            self.total() as f32,
            0.0,
        )
    }
}

/// Outcome of one category analyzer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryScore {
    pub category: Category,
    /// Synthetic likelihood in [0, 1]; 0.5 means no signal
    pub score: f32,
    pub synthetic_weight: f32,
    pub human_weight: f32,
    pub indicators: Vec<Indicator>,
    pub tally: SignalTally,
}

/// One weighted outcome of a threshold test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Signal {
    pub polarity: Polarity,
    pub weight: f32,
    pub message: &'static str,
}

impl Signal {
    pub const fn synthetic(weight: f32, message: &'static str) -> Self {
        Self {
            polarity: Polarity::Synthetic,
            weight,
            message,
        }
    }

    pub const fn human(weight: f32, message: &'static str) -> Self {
        Self {
            polarity: Polarity::Human,
            weight,
            message,
        }
    }
}

/// Per-category accumulator of weighted signals
///
/// Analyzers record signals and `finish` into a CategoryScore; nothing is
/// shared between categories until the Aggregator merges the results.
#[derive(Debug, Clone)]
pub struct Evidence {
    category: Category,
    synthetic_weight: f32,
    human_weight: f32,
    indicators: Vec<Indicator>,
    tally: SignalTally,
}

impl Evidence {
    pub fn new(category: Category) -> Self {
        Self {
            category,
            synthetic_weight: 0.0,
            human_weight: 0.0,
            indicators: Vec::new(),
            tally: SignalTally::default(),
        }
    }

    /// Add a fired signal: weight, indicator and tally
    pub fn record(&mut self, signal: Signal) {
        match signal.polarity {
            Polarity::Synthetic => self.synthetic_weight += signal.weight,
            Polarity::Human => self.human_weight += signal.weight,
        }
        self.indicators.push(Indicator {
            category: self.category,
            polarity: signal.polarity,
            message: signal.message,
        });
        self.tally.record(signal.polarity);
    }

    /// Record `below` when `value < threshold`, `above` when `value > threshold`
    ///
    /// A value exactly on the threshold (or NaN) records nothing.
    pub fn compare(&mut self, value: f32, threshold: f32, below: Signal, above: Signal) {
        match value.partial_cmp(&threshold) {
            Some(Ordering::Less) => self.record(below),
            Some(Ordering::Greater) => self.record(above),
            _ => {}
        }
    }

    pub fn finish(self) -> CategoryScore {
        let total = self.synthetic_weight + self.human_weight;
        CategoryScore {
            category: self.category,
            score: safe_ratio(self.synthetic_weight, total, 0.5),
            synthetic_weight: self.synthetic_weight,
            human_weight: self.human_weight,
            indicators: self.indicators,
            tally: self.tally,
        }
    }
}

/// Label, confidence and the category scores behind them
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assessment {
    pub result: DetectionResult,
    pub weighted_score: f32,
    pub agreement: f32,
    pub categories: Vec<CategoryScore>,
}

/// A calibrated scoring strategy
pub trait Scorer: Send + Sync {
    fn name(&self) -> &'static str;

    /// Run every category analyzer over `features`, in `Category::ALL` order
    fn score_categories(&self, features: &FeatureVector) -> Vec<CategoryScore>;

    fn aggregator(&self) -> &Aggregator;

    fn explainer(&self) -> &ExplanationGenerator;

    /// Score, aggregate and explain
    fn score(&self, features: &FeatureVector) -> Assessment {
        let categories = self.score_categories(features);
        let aggregate = self.aggregator().aggregate(&categories);
        let explanation = self
            .explainer()
            .explain(aggregate.classification, &categories);

        Assessment {
            result: DetectionResult {
                classification: aggregate.classification,
                confidence: aggregate.confidence,
                explanation,
            },
            weighted_score: aggregate.weighted_score,
            agreement: aggregate.agreement,
            categories,
        }
    }
}

/// Selectable scoring strategy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScorerKind {
    #[default]
    SignalWeighted,
    Baseline,
}

impl ScorerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ScorerKind::SignalWeighted => "signal-weighted",
            ScorerKind::Baseline => "baseline",
        }
    }

    /// Build the scorer with its calibration from `config`
    pub fn build(self, config: &AppConfig) -> Box<dyn Scorer> {
        match self {
            ScorerKind::SignalWeighted => {
                Box::new(SignalWeightedScorer::new(config.signal_weighted.clone()))
            }
            ScorerKind::Baseline => Box::new(BaselineScorer::new(config.baseline.clone())),
        }
    }
}

impl fmt::Display for ScorerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScorerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "signal-weighted" | "signal_weighted" => Ok(ScorerKind::SignalWeighted),
            "baseline" => Ok(ScorerKind::Baseline),
            other => Err(format!(
                "unknown scorer '{}' (expected signal-weighted or baseline)",
                other
            )),
        }
    }
}
