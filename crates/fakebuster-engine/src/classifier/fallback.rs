//! Rule-based fake review estimator used when no trained model is loaded.

/// Phrases that show up disproportionately in paid or templated reviews.
pub const FAKE_REVIEW_PHRASES: &[&str] = &[
    "amazing",
    "perfect",
    "best ever",
    "life changing",
    "highly recommend",
    "must buy",
    "incredible",
    "outstanding",
    "excellent quality",
    "fast shipping",
];

/// The heuristic never claims more than this probability of fake.
pub const MAX_FAKE_PROBABILITY: f64 = 0.9;

const HITS_PER_CERTAINTY: f64 = 5.0;

#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackClassifier;

impl FallbackClassifier {
    /// Number of distinct lexicon phrases present in `text`, case-insensitively.
    #[must_use]
    pub fn phrase_hits(text: &str) -> usize {
        let lower = text.to_lowercase();
        FAKE_REVIEW_PHRASES
            .iter()
            .filter(|phrase| lower.contains(*phrase))
            .count()
    }

    /// `[P(legitimate), P(fake)]` for `text`.
    #[must_use]
    pub fn predict_proba(&self, text: &str) -> [f64; 2] {
        #[allow(clippy::cast_precision_loss)]
        let hits = Self::phrase_hits(text) as f64;
        let fake = (hits / HITS_PER_CERTAINTY).min(MAX_FAKE_PROBABILITY);
        [1.0 - fake, fake]
    }
}
