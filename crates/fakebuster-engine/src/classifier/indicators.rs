use crate::features::NamedFeatures;

const MAX_EXCLAMATIONS: usize = 3;
const MAX_UPPERCASE_RATIO: f64 = 0.3;
const MAX_PHRASE_HITS: usize = 2;
const MAX_POLARITY: f64 = 0.8;

/// Human-readable reasons attached to a review classification, in a fixed
/// check order.
pub(crate) fn review_indicators(features: &NamedFeatures, phrase_hits: usize) -> Vec<String> {
    let checks = [
        (features.has_email, "Contains email address"),
        (features.has_url, "Contains URL or link"),
        (
            features.exclamation_count > MAX_EXCLAMATIONS,
            "Excessive exclamation marks",
        ),
        (
            features.uppercase_ratio > MAX_UPPERCASE_RATIO,
            "Excessive capitalization",
        ),
        (
            phrase_hits > MAX_PHRASE_HITS,
            "Contains multiple fake review phrases",
        ),
        (
            features.sentiment_polarity > MAX_POLARITY,
            "Unnaturally positive language",
        ),
    ];

    checks
        .into_iter()
        .filter(|(hit, _)| *hit)
        .map(|(_, message)| message.to_string())
        .collect()
}
