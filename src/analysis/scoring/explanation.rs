// ExplanationGenerator - one human-readable sentence per decision
//
// Indicators whose polarity supports the label are preferred, in the order
// the analyzers emitted them. When none fired the sentence falls back to the
// category that pushed hardest toward the label.

use super::{Category, CategoryScore, Polarity};
use crate::analysis::Classification;

fn synthetic_sentence(category: Category) -> &'static str {
    match category {
        Category::Pitch => "Unnatural pitch consistency and robotic speech patterns detected",
        Category::Cepstral => "Synthetic spectral patterns identified in voice analysis",
        Category::Spectral => "Artificial frequency distribution detected",
        Category::Temporal => "Mechanical timing patterns without natural rhythm",
        Category::VoiceQuality => "Missing natural voice micro-variations and tremors",
    }
}

fn human_sentence(category: Category) -> &'static str {
    match category {
        Category::Pitch => "Natural pitch variation consistent with human speech",
        Category::Cepstral => "Complex spectral patterns typical of human voice",
        Category::Spectral => "Natural frequency characteristics detected",
        Category::Temporal => "Organic speech rhythm with natural pauses",
        Category::VoiceQuality => "Natural voice micro-variations and breathing detected",
    }
}

const GENERIC_SYNTHETIC: &str = "Synthetic speech patterns detected in audio analysis";
const GENERIC_HUMAN: &str = "Natural human speech characteristics identified";

/// Builds the explanation sentence for a decision
#[derive(Debug, Clone)]
pub struct ExplanationGenerator {
    /// Supporting indicators joined into one sentence (at most 2 are used)
    join_limit: usize,
}

impl ExplanationGenerator {
    pub fn new(join_limit: usize) -> Self {
        Self {
            join_limit: join_limit.clamp(1, 2),
        }
    }

    /// Explain `classification` from the category scores that produced it
    ///
    /// # Returns
    /// - two supporting indicators as `"<first> and <second, lowercased>"`
    /// - a single supporting indicator verbatim
    /// - otherwise the static sentence of the most extreme category, or a
    ///   generic sentence for the label when no category is present
    pub fn explain(&self, classification: Classification, categories: &[CategoryScore]) -> String {
        let polarity = Polarity::supporting(classification);
        let mut supporting = categories
            .iter()
            .flat_map(|c| c.indicators.iter())
            .filter(|indicator| indicator.polarity == polarity)
            .map(|indicator| indicator.message);

        match (supporting.next(), supporting.next()) {
            (Some(first), Some(second)) if self.join_limit >= 2 => {
                format!("{} and {}", first, second.to_lowercase())
            }
            (Some(first), _) => first.to_string(),
            (None, _) => self.fallback(classification, categories).to_string(),
        }
    }

    fn fallback(
        &self,
        classification: Classification,
        categories: &[CategoryScore],
    ) -> &'static str {
        match classification {
            Classification::AiGenerated => {
                // first category wins ties
                let strongest = categories
                    .iter()
                    .fold(None::<&CategoryScore>, |best, c| match best {
                        Some(b) if b.score >= c.score => Some(b),
                        _ => Some(c),
                    });
                strongest
                    .map(|c| synthetic_sentence(c.category))
                    .unwrap_or(GENERIC_SYNTHETIC)
            }
            Classification::Human => {
                let weakest = categories
                    .iter()
                    .fold(None::<&CategoryScore>, |best, c| match best {
                        Some(b) if b.score <= c.score => Some(b),
                        _ => Some(c),
                    });
                weakest
                    .map(|c| human_sentence(c.category))
                    .unwrap_or(GENERIC_HUMAN)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::scoring::{Indicator, SignalTally};

    fn category(
        category: Category,
        score: f32,
        indicators: &[(Polarity, &'static str)],
    ) -> CategoryScore {
        CategoryScore {
            category,
            score,
            synthetic_weight: 0.0,
            human_weight: 0.0,
            indicators: indicators
                .iter()
                .map(|&(polarity, message)| Indicator {
                    category,
                    polarity,
                    message,
                })
                .collect(),
            tally: SignalTally::default(),
        }
    }

    #[test]
    fn test_two_indicators_are_joined() {
        let categories = vec![
            category(
                Category::Pitch,
                0.9,
                &[(Polarity::Synthetic, "Unnaturally consistent pitch detected")],
            ),
            category(
                Category::Temporal,
                0.2,
                &[(Polarity::Human, "Natural breathing pauses present")],
            ),
            category(
                Category::VoiceQuality,
                0.8,
                &[(Polarity::Synthetic, "Missing natural voice micro-variations")],
            ),
        ];
        let text = ExplanationGenerator::new(2).explain(Classification::AiGenerated, &categories);
        assert_eq!(
            text,
            "Unnaturally consistent pitch detected and missing natural voice micro-variations"
        );
    }

    #[test]
    fn test_join_limit_one_uses_first() {
        let categories = vec![category(
            Category::Pitch,
            0.1,
            &[
                (Polarity::Human, "Natural pitch variation present"),
                (Polarity::Human, "Wide natural pitch range"),
            ],
        )];
        let text = ExplanationGenerator::new(1).explain(Classification::Human, &categories);
        assert_eq!(text, "Natural pitch variation present");
    }

    #[test]
    fn test_single_indicator_is_verbatim() {
        let categories = vec![category(
            Category::Spectral,
            0.2,
            &[(Polarity::Human, "Natural spectral movement present")],
        )];
        let text = ExplanationGenerator::new(2).explain(Classification::Human, &categories);
        assert_eq!(text, "Natural spectral movement present");
    }

    #[test]
    fn test_polarity_filter_ignores_wording() {
        // a synthetic indicator containing "natural" must not explain a HUMAN label
        let categories = vec![
            category(
                Category::Pitch,
                0.4,
                &[(Polarity::Synthetic, "Lack of natural breathing pauses")],
            ),
            category(Category::Cepstral, 0.3, &[]),
        ];
        let text = ExplanationGenerator::new(2).explain(Classification::Human, &categories);
        assert_eq!(text, "Complex spectral patterns typical of human voice");
    }

    #[test]
    fn test_fallback_ties_go_to_first_category() {
        let categories: Vec<CategoryScore> = Category::ALL
            .iter()
            .map(|&c| category(c, 0.5, &[]))
            .collect();
        let generator = ExplanationGenerator::new(2);
        assert_eq!(
            generator.explain(Classification::AiGenerated, &categories),
            "Unnatural pitch consistency and robotic speech patterns detected"
        );
        assert_eq!(
            generator.explain(Classification::Human, &categories),
            "Natural pitch variation consistent with human speech"
        );
    }

    #[test]
    fn test_generic_fallback_without_categories() {
        let generator = ExplanationGenerator::new(2);
        assert_eq!(
            generator.explain(Classification::AiGenerated, &[]),
            GENERIC_SYNTHETIC
        );
        assert_eq!(generator.explain(Classification::Human, &[]), GENERIC_HUMAN);
    }
}
