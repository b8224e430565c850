//! Review-level entry points built on the classifier and the aggregator.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::classifier::Classifier;
use crate::error::EngineError;
use crate::features::NamedFeatures;
use crate::summary::summarize;
use crate::types::{ClassificationResult, ReviewInput};

/// Per-review entry in a batch response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewDetail {
    pub review_index: usize,
    #[serde(flatten)]
    pub result: ClassificationResult,
    pub features: NamedFeatures,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewBatchAnalysis {
    pub fake_reviews: usize,
    pub total_reviews: usize,
    pub confidence: f64,
    pub fake_review_indicators: Vec<String>,
    pub detailed_analysis: Vec<ReviewDetail>,
}

/// Plain record handed to whatever persists analysis history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewAuditRecord {
    pub url: String,
    pub total_reviews: usize,
    pub fake_reviews: usize,
    pub analyzed_at: DateTime<Utc>,
}

impl ReviewBatchAnalysis {
    #[must_use]
    pub fn audit_record(&self, url: &str) -> ReviewAuditRecord {
        ReviewAuditRecord {
            url: url.to_string(),
            total_reviews: self.total_reviews,
            fake_reviews: self.fake_reviews,
            analyzed_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SingleReviewAnalysis {
    pub is_fake_probability: f64,
    pub confidence: f64,
    pub indicators: Vec<String>,
}

/// Classify a batch of reviews and summarise it.
///
/// The whole batch is validated before any review is scored, and any
/// per-review failure fails the batch; results keep input order.
///
/// # Errors
///
/// Returns [`EngineError::NoInput`] for an empty batch or a blank review,
/// [`EngineError::BatchTooLarge`] above `max_batch_size`, and
/// [`EngineError::PredictionFailed`] if the model fails on any review.
pub fn analyze_reviews(
    classifier: &Classifier,
    reviews: &[ReviewInput],
    max_batch_size: usize,
) -> Result<ReviewBatchAnalysis, EngineError> {
    if reviews.is_empty() {
        return Err(EngineError::NoInput("no reviews provided".to_string()));
    }
    if reviews.len() > max_batch_size {
        return Err(EngineError::BatchTooLarge {
            size: reviews.len(),
            limit: max_batch_size,
        });
    }
    if let Some(idx) = reviews.iter().position(|r| r.text.trim().is_empty()) {
        return Err(EngineError::NoInput(format!("review {idx} has empty text")));
    }

    let scored = reviews
        .iter()
        .map(|review| classifier.classify_with_features(&review.text))
        .collect::<Result<Vec<_>, _>>()?;

    let (results, features): (Vec<ClassificationResult>, Vec<NamedFeatures>) =
        scored.into_iter().unzip();

    let summary = summarize(results)?;

    let detailed_analysis = summary
        .detailed_analysis
        .into_iter()
        .zip(features)
        .enumerate()
        .map(|(review_index, (result, features))| ReviewDetail {
            review_index,
            result,
            features,
        })
        .collect();

    Ok(ReviewBatchAnalysis {
        fake_reviews: summary.fake_reviews,
        total_reviews: summary.total_reviews,
        confidence: summary.confidence,
        fake_review_indicators: summary.fake_review_indicators,
        detailed_analysis,
    })
}

/// Classify one review.
///
/// # Errors
///
/// Same as [`Classifier::classify`].
pub fn analyze_single_review(
    classifier: &Classifier,
    text: &str,
) -> Result<SingleReviewAnalysis, EngineError> {
    let result = classifier.classify(text)?;
    Ok(SingleReviewAnalysis {
        is_fake_probability: result.fake_probability,
        confidence: result.confidence,
        indicators: result.indicators,
    })
}
