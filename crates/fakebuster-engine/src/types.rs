use serde::{Deserialize, Serialize};

use crate::classifier::ClassifierMethod;

/// A review submitted for scoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewInput {
    pub text: String,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub author: Option<String>,
    /// Review date as supplied by the client; never parsed by the engine.
    #[serde(default)]
    pub date: Option<String>,
}

impl ReviewInput {
    #[must_use]
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            rating: None,
            author: None,
            date: None,
        }
    }
}

/// Categorical severity shared by the trust scorer and the text scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "low"),
            RiskLevel::Medium => write!(f, "medium"),
            RiskLevel::High => write!(f, "high"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Medium,
    High,
}

/// Outcome of classifying one piece of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// P(fake), within `[0, 1]`.
    pub fake_probability: f64,
    /// Probability of the winning class: `max(p, 1 - p)`.
    pub confidence: f64,
    pub is_fake: bool,
    pub indicators: Vec<String>,
    pub method: ClassifierMethod,
}

impl ClassificationResult {
    /// Build a result from a raw probability, applying the decision threshold
    /// belonging to `method`.
    #[must_use]
    pub fn from_probability(
        fake_probability: f64,
        method: ClassifierMethod,
        indicators: Vec<String>,
    ) -> Self {
        let p = fake_probability.clamp(0.0, 1.0);
        Self {
            fake_probability: p,
            confidence: p.max(1.0 - p),
            is_fake: p > method.fake_threshold(),
            indicators,
            method,
        }
    }
}
