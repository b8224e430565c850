//! Deterministic feature extraction from review text.
//!
//! The numeric vector feeds the trained classifier and its layout is part of
//! the model contract: any change to [`FEATURE_LAYOUT`] (adding, removing or
//! reordering a feature) must bump [`FEATURE_VERSION`] and ship with a
//! retrained artifact.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::Serialize;

use crate::sentiment::SentimentAnalyzer;

/// Current feature layout version.
pub const FEATURE_VERSION: u8 = 1;

pub const FEATURE_COUNT: usize = 10;

/// Feature names in the exact order they appear in a [`FeatureVector`].
pub const FEATURE_LAYOUT: [&str; FEATURE_COUNT] = [
    "text_length",
    "word_count",
    "avg_word_length",
    "uppercase_ratio",
    "digit_ratio",
    "punctuation_ratio",
    "exclamation_count",
    "question_count",
    "has_email",
    "has_url",
];

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").expect("valid email regex")
});

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i:https?)://\S+").expect("valid url regex"));

/// Fixed-order numeric encoding of a text, laid out per [`FEATURE_LAYOUT`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    #[must_use]
    pub fn from_values(values: [f64; FEATURE_COUNT]) -> Self {
        Self(values)
    }

    #[must_use]
    pub fn values(&self) -> &[f64; FEATURE_COUNT] {
        &self.0
    }

    /// Look up a feature by its layout name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<f64> {
        FEATURE_LAYOUT
            .iter()
            .position(|n| *n == name)
            .map(|idx| self.0[idx])
    }
}

/// Human-facing feature set used to explain a classification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NamedFeatures {
    pub text_length: usize,
    pub word_count: usize,
    pub avg_word_length: f64,
    pub uppercase_ratio: f64,
    pub digit_ratio: f64,
    pub punctuation_ratio: f64,
    pub exclamation_count: usize,
    pub question_count: usize,
    pub has_email: bool,
    pub has_url: bool,
    pub caps_words_count: usize,
    pub sentiment_polarity: f64,
    pub sentiment_subjectivity: f64,
}

impl NamedFeatures {
    /// Project onto the classifier layout.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn to_vector(&self) -> FeatureVector {
        FeatureVector([
            self.text_length as f64,
            self.word_count as f64,
            self.avg_word_length,
            self.uppercase_ratio,
            self.digit_ratio,
            self.punctuation_ratio,
            self.exclamation_count as f64,
            self.question_count as f64,
            f64::from(u8::from(self.has_email)),
            f64::from(u8::from(self.has_url)),
        ])
    }
}

/// Feature extractor with an optional sentiment capability.
///
/// Without an analyzer the sentiment features are reported as `0.0`.
#[derive(Clone, Default)]
pub struct FeatureExtractor {
    sentiment: Option<Arc<dyn SentimentAnalyzer>>,
}

impl std::fmt::Debug for FeatureExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeatureExtractor")
            .field("sentiment", &self.sentiment.is_some())
            .finish()
    }
}

impl FeatureExtractor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_sentiment(analyzer: Arc<dyn SentimentAnalyzer>) -> Self {
        Self {
            sentiment: Some(analyzer),
        }
    }

    #[must_use]
    pub fn has_sentiment(&self) -> bool {
        self.sentiment.is_some()
    }

    #[must_use]
    pub fn extract(&self, text: &str) -> (FeatureVector, NamedFeatures) {
        let named = self.named(text);
        (named.to_vector(), named)
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn named(&self, text: &str) -> NamedFeatures {
        let text_length = text.chars().count();
        let words: Vec<&str> = text.split_whitespace().collect();

        let ratio = |count: usize| -> f64 {
            if text_length == 0 {
                0.0
            } else {
                count as f64 / text_length as f64
            }
        };

        let avg_word_length = if words.is_empty() {
            0.0
        } else {
            let total: usize = words.iter().map(|w| w.chars().count()).sum();
            total as f64 / words.len() as f64
        };

        let uppercase = text.chars().filter(|c| c.is_uppercase()).count();
        let digits = text.chars().filter(char::is_ascii_digit).count();
        let punctuation = text.chars().filter(char::is_ascii_punctuation).count();
        let caps_words_count = words.iter().filter(|w| is_caps_word(w)).count();

        let sentiment = self
            .sentiment
            .as_ref()
            .map(|analyzer| analyzer.analyze(text))
            .unwrap_or_default();

        NamedFeatures {
            text_length,
            word_count: words.len(),
            avg_word_length,
            uppercase_ratio: ratio(uppercase),
            digit_ratio: ratio(digits),
            punctuation_ratio: ratio(punctuation),
            exclamation_count: text.matches('!').count(),
            question_count: text.matches('?').count(),
            has_email: EMAIL_RE.is_match(text),
            has_url: URL_RE.is_match(text),
            caps_words_count,
            sentiment_polarity: sentiment.polarity,
            sentiment_subjectivity: sentiment.subjectivity,
        }
    }
}

/// Extract features without a sentiment analyzer.
#[must_use]
pub fn extract_features(text: &str) -> (FeatureVector, NamedFeatures) {
    FeatureExtractor::default().extract(text)
}

// A shouted token: more than one character, some uppercase, nothing lowercase.
fn is_caps_word(word: &str) -> bool {
    word.chars().count() > 1
        && word.chars().any(char::is_uppercase)
        && !word.chars().any(char::is_lowercase)
}
