// Aggregator - weighted category fusion into a label and confidence

use super::{CategoryScore, SignalTally};
use crate::analysis::features::stats::safe_ratio;
use crate::analysis::Classification;
use crate::config::{BoostTier, CategoryWeights};

/// Decision produced from a set of category scores
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aggregate {
    pub classification: Classification,
    /// Confidence in the label, clamped and rounded to 2 decimals
    pub confidence: f32,
    /// Weighted synthetic likelihood in [0, 1]
    pub weighted_score: f32,
    /// Majority share of fired signals (0.0 when none fired)
    pub agreement: f32,
}

/// Weighted-mean aggregation with optional agreement boost
#[derive(Debug, Clone)]
pub struct Aggregator {
    weights: CategoryWeights,
    decision_boundary: f32,
    confidence_floor: f32,
    confidence_ceiling: f32,
    boost_tiers: Vec<BoostTier>,
}

impl Aggregator {
    /// # Arguments
    /// * `weights` - Per-category weights (sum to 1.0)
    /// * `decision_boundary` - Weighted scores at or above this are synthetic
    /// * `confidence_floor` / `confidence_ceiling` - Clamp applied after boosting
    /// * `boost_tiers` - Checked in order; the first tier whose `above` the
    ///   agreement ratio strictly exceeds adds its boost
    pub fn new(
        weights: CategoryWeights,
        decision_boundary: f32,
        confidence_floor: f32,
        confidence_ceiling: f32,
        boost_tiers: Vec<BoostTier>,
    ) -> Self {
        Self {
            weights,
            decision_boundary,
            confidence_floor,
            confidence_ceiling,
            boost_tiers,
        }
    }

    /// Weighted mean over the categories present, renormalised by their weights
    pub fn weighted_score(&self, categories: &[CategoryScore]) -> f32 {
        let (total, weight) = categories.iter().fold((0.0, 0.0), |(total, weight), c| {
            let w = self.weights.weight(c.category);
            (total + c.score * w, weight + w)
        });
        safe_ratio(total, weight, 0.5)
    }

    fn boost(&self, agreement: f32) -> f32 {
        self.boost_tiers
            .iter()
            .find(|tier| agreement > tier.above)
            .map(|tier| tier.boost)
            .unwrap_or(0.0)
    }

    pub fn aggregate(&self, categories: &[CategoryScore]) -> Aggregate {
        let weighted_score = self.weighted_score(categories);
        let tally = categories
            .iter()
            .fold(SignalTally::default(), |acc, c| acc.merge(c.tally));
        let agreement = tally.agreement_ratio();

        let (classification, raw) = if weighted_score >= self.decision_boundary {
            (Classification::AiGenerated, weighted_score)
        } else {
            (Classification::Human, 1.0 - weighted_score)
        };

        let boosted = raw + self.boost(agreement);
        let clamped = boosted.clamp(self.confidence_floor, self.confidence_ceiling);
        let confidence = (clamped * 100.0).round() / 100.0;

        log::debug!(
            "[Aggregator] weighted={:.4} agreement={:.2} ({} synthetic / {} human) -> {} {:.2}",
            weighted_score,
            agreement,
            tally.synthetic,
            tally.human,
            classification,
            confidence
        );

        Aggregate {
            classification,
            confidence,
            weighted_score,
            agreement,
        }
    }
}
