//! Optional sentiment capability used for review explanations.

use serde::Serialize;

/// Polarity in `[-1.0, 1.0]` and subjectivity in `[0.0, 1.0]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Sentiment {
    pub polarity: f64,
    pub subjectivity: f64,
}

/// Anything able to score the sentiment of a piece of text.
pub trait SentimentAnalyzer: Send + Sync {
    fn analyze(&self, text: &str) -> Sentiment;
}

/// Review-domain word weights.
///
/// Keys are lowercase single words. Values in `(0.0, 1.0]` are positive,
/// in `[-1.0, 0.0)` are negative. The summed polarity is clamped to `[-1.0, 1.0]`.
pub(crate) const LEXICON: &[(&str, f64)] = &[
    // Positive signals
    ("amazing", 0.6),
    ("awesome", 0.5),
    ("best", 0.5),
    ("excellent", 0.5),
    ("fantastic", 0.5),
    ("flawless", 0.5),
    ("good", 0.3),
    ("great", 0.4),
    ("happy", 0.4),
    ("incredible", 0.6),
    ("love", 0.5),
    ("loved", 0.5),
    ("nice", 0.3),
    ("outstanding", 0.6),
    ("perfect", 0.6),
    ("recommend", 0.4),
    ("superb", 0.5),
    ("wonderful", 0.5),
    // Negative signals
    ("awful", -0.6),
    ("bad", -0.4),
    ("broken", -0.5),
    ("cheap", -0.2),
    ("defective", -0.6),
    ("disappointed", -0.5),
    ("disappointing", -0.5),
    ("fake", -0.5),
    ("horrible", -0.6),
    ("poor", -0.4),
    ("refund", -0.3),
    ("scam", -0.7),
    ("terrible", -0.6),
    ("useless", -0.6),
    ("waste", -0.5),
    ("worst", -0.6),
];

/// Lexicon-backed analyzer.
///
/// Polarity is the clamped sum of matching word weights; subjectivity is the
/// share of tokens that carry any weight at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexiconSentiment;

impl SentimentAnalyzer for LexiconSentiment {
    fn analyze(&self, text: &str) -> Sentiment {
        let mut polarity = 0.0_f64;
        let mut tokens = 0_usize;
        let mut opinionated = 0_usize;

        for word in text.split_whitespace() {
            tokens += 1;
            let w = word
                .trim_matches(|c: char| !c.is_alphabetic())
                .to_lowercase();
            if let Some(&(_, weight)) = LEXICON.iter().find(|(lex_word, _)| *lex_word == w) {
                polarity += weight;
                opinionated += 1;
            }
        }

        if tokens == 0 {
            return Sentiment::default();
        }

        #[allow(clippy::cast_precision_loss)]
        let subjectivity = opinionated as f64 / tokens as f64;

        Sentiment {
            polarity: polarity.clamp(-1.0, 1.0),
            subjectivity,
        }
    }
}
