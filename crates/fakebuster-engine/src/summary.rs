//! Batch summarisation of per-item classification results.

use serde::Serialize;

use crate::error::EngineError;
use crate::types::ClassificationResult;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSummary {
    pub fake_reviews: usize,
    pub total_reviews: usize,
    /// Mean of the per-item confidences.
    pub confidence: f64,
    /// Every item's indicators, concatenated in item order.
    pub fake_review_indicators: Vec<String>,
    pub detailed_analysis: Vec<ClassificationResult>,
}

/// Summarise an ordered batch of classification results.
///
/// # Errors
///
/// Returns [`EngineError::NoInput`] for an empty batch.
pub fn summarize(results: Vec<ClassificationResult>) -> Result<BatchSummary, EngineError> {
    if results.is_empty() {
        return Err(EngineError::NoInput("no reviews provided".to_string()));
    }

    let fake_reviews = results.iter().filter(|r| r.is_fake).count();

    #[allow(clippy::cast_precision_loss)]
    let confidence = results.iter().map(|r| r.confidence).sum::<f64>() / results.len() as f64;

    let fake_review_indicators = results
        .iter()
        .flat_map(|r| r.indicators.iter().cloned())
        .collect();

    Ok(BatchSummary {
        fake_reviews,
        total_reviews: results.len(),
        confidence,
        fake_review_indicators,
        detailed_analysis: results,
    })
}
