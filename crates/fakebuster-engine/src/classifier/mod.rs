//! Review classifier: a trained model when one is available, the rule-based
//! fallback otherwise.
//!
//! The variant is chosen once at construction. Afterwards a [`Classifier`] is
//! immutable and can be shared behind an `Arc` by any number of concurrent
//! callers.

pub mod ensemble;
pub mod fallback;
mod indicators;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, ModelError};
use crate::features::{FeatureExtractor, FeatureVector, NamedFeatures, FEATURE_VERSION};
use crate::types::ClassificationResult;

pub use ensemble::TreeEnsemble;
pub use fallback::FallbackClassifier;

/// A fitted model able to score one feature vector.
pub trait ProbabilityModel: Send + Sync {
    /// `[P(legitimate), P(fake)]` for a single sample.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError`] when the model cannot produce a prediction.
    fn predict_proba(&self, features: &FeatureVector) -> Result<[f64; 2], ModelError>;

    fn name(&self) -> &str;

    fn artifact_sha256(&self) -> Option<&str> {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierMethod {
    Trained,
    Fallback,
}

impl ClassifierMethod {
    /// P(fake) must exceed this to flag a review.
    ///
    /// The two variants are calibrated differently, so they keep separate
    /// thresholds.
    #[must_use]
    pub fn fake_threshold(self) -> f64 {
        match self {
            ClassifierMethod::Trained => 0.7,
            ClassifierMethod::Fallback => 0.5,
        }
    }
}

impl std::fmt::Display for ClassifierMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClassifierMethod::Trained => write!(f, "trained"),
            ClassifierMethod::Fallback => write!(f, "fallback"),
        }
    }
}

/// Snapshot of the classifier configuration for health/status output.
#[derive(Debug, Clone, Serialize)]
pub struct ModelStatus {
    pub method: ClassifierMethod,
    pub model_name: Option<String>,
    pub artifact_sha256: Option<String>,
    pub feature_version: u8,
    pub sentiment_enabled: bool,
}

enum Backend {
    Trained(Box<dyn ProbabilityModel>),
    Fallback(FallbackClassifier),
}

pub struct Classifier {
    backend: Backend,
    extractor: FeatureExtractor,
}

impl std::fmt::Debug for Classifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Classifier")
            .field("method", &self.method())
            .field("extractor", &self.extractor)
            .finish()
    }
}

impl Classifier {
    #[must_use]
    pub fn fallback(extractor: FeatureExtractor) -> Self {
        Self {
            backend: Backend::Fallback(FallbackClassifier),
            extractor,
        }
    }

    #[must_use]
    pub fn trained(model: Box<dyn ProbabilityModel>, extractor: FeatureExtractor) -> Self {
        Self {
            backend: Backend::Trained(model),
            extractor,
        }
    }

    /// Load the model artifact at `path`, degrading to the rule-based
    /// classifier if it is missing or corrupt.
    #[must_use]
    pub fn load(path: &Path, extractor: FeatureExtractor) -> Self {
        match TreeEnsemble::load(path) {
            Ok(model) => {
                tracing::info!(
                    path = %path.display(),
                    model = model.name(),
                    trees = model.tree_count(),
                    sha256 = model.sha256(),
                    "review model loaded"
                );
                Self::trained(Box::new(model), extractor)
            }
            Err(ModelError::Io { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                tracing::warn!(
                    path = %path.display(),
                    "model artifact not found; using rule-based fallback"
                );
                Self::fallback(extractor)
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to load model artifact; using rule-based fallback"
                );
                Self::fallback(extractor)
            }
        }
    }

    #[must_use]
    pub fn method(&self) -> ClassifierMethod {
        match self.backend {
            Backend::Trained(_) => ClassifierMethod::Trained,
            Backend::Fallback(_) => ClassifierMethod::Fallback,
        }
    }

    #[must_use]
    pub fn extractor(&self) -> &FeatureExtractor {
        &self.extractor
    }

    #[must_use]
    pub fn status(&self) -> ModelStatus {
        let (model_name, artifact_sha256) = match &self.backend {
            Backend::Trained(model) => (
                Some(model.name().to_string()),
                model.artifact_sha256().map(ToOwned::to_owned),
            ),
            Backend::Fallback(_) => (None, None),
        };
        ModelStatus {
            method: self.method(),
            model_name,
            artifact_sha256,
            feature_version: FEATURE_VERSION,
            sentiment_enabled: self.extractor.has_sentiment(),
        }
    }

    /// Score `text` and attach explanation indicators.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NoInput`] for blank text and
    /// [`EngineError::PredictionFailed`] when the trained model errors or
    /// yields a non-finite probability.
    pub fn classify(&self, text: &str) -> Result<ClassificationResult, EngineError> {
        self.classify_with_features(text).map(|(result, _)| result)
    }

    /// Like [`Classifier::classify`], also returning the named features the
    /// indicators were derived from.
    ///
    /// # Errors
    ///
    /// Same as [`Classifier::classify`].
    pub fn classify_with_features(
        &self,
        text: &str,
    ) -> Result<(ClassificationResult, NamedFeatures), EngineError> {
        if text.trim().is_empty() {
            return Err(EngineError::NoInput("review text is empty".to_string()));
        }

        let (vector, named) = self.extractor.extract(text);
        let phrase_hits = FallbackClassifier::phrase_hits(text);

        let fake_probability = match &self.backend {
            Backend::Trained(model) => {
                let [_, fake] = model
                    .predict_proba(&vector)
                    .map_err(EngineError::PredictionFailed)?;
                if !fake.is_finite() {
                    return Err(EngineError::PredictionFailed(ModelError::Output(format!(
                        "{} returned a non-finite probability",
                        model.name()
                    ))));
                }
                fake
            }
            Backend::Fallback(fallback) => fallback.predict_proba(text)[1],
        };

        let result = ClassificationResult::from_probability(
            fake_probability,
            self.method(),
            indicators::review_indicators(&named, phrase_hits),
        );
        Ok((result, named))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::sentiment::LexiconSentiment;

    struct ConstModel(f64);

    impl ProbabilityModel for ConstModel {
        fn predict_proba(&self, _features: &FeatureVector) -> Result<[f64; 2], ModelError> {
            Ok([1.0 - self.0, self.0])
        }

        fn name(&self) -> &str {
            "const"
        }
    }

    struct BrokenModel;

    impl ProbabilityModel for BrokenModel {
        fn predict_proba(&self, _features: &FeatureVector) -> Result<[f64; 2], ModelError> {
            Err(ModelError::Output("booster exploded".to_string()))
        }

        fn name(&self) -> &str {
            "broken"
        }
    }

    #[test]
    fn fallback_flags_above_half() {
        let classifier = Classifier::fallback(FeatureExtractor::new());
        let result = classifier
            .classify("Amazing! Perfect! Fast shipping, highly recommend")
            .unwrap();
        assert_eq!(result.method, ClassifierMethod::Fallback);
        assert!((result.fake_probability - 0.8).abs() < 1e-12);
        assert!(result.is_fake);
        assert!(result
            .indicators
            .contains(&"Contains multiple fake review phrases".to_string()));
    }

    #[test]
    fn fallback_at_point_six_is_fake_but_trained_is_not() {
        let text = "amazing perfect incredible";
        let fallback = Classifier::fallback(FeatureExtractor::new());
        assert!(fallback.classify(text).unwrap().is_fake);

        let trained = Classifier::trained(Box::new(ConstModel(0.6)), FeatureExtractor::new());
        let result = trained.classify(text).unwrap();
        assert_eq!(result.method, ClassifierMethod::Trained);
        assert!(!result.is_fake);
        assert!((result.confidence - 0.6).abs() < 1e-12);
    }

    #[test]
    fn trained_flags_above_point_seven() {
        let trained = Classifier::trained(Box::new(ConstModel(0.71)), FeatureExtractor::new());
        assert!(trained.classify("fine").unwrap().is_fake);
    }

    #[test]
    fn blank_text_is_rejected() {
        let classifier = Classifier::fallback(FeatureExtractor::new());
        let err = classifier.classify("  \n").unwrap_err();
        assert!(matches!(err, EngineError::NoInput(_)), "got {err:?}");
    }

    #[test]
    fn model_error_surfaces_as_prediction_failed() {
        let classifier = Classifier::trained(Box::new(BrokenModel), FeatureExtractor::new());
        let err = classifier.classify("some review").unwrap_err();
        assert!(matches!(err, EngineError::PredictionFailed(_)), "got {err:?}");
        assert!(err.to_string().contains("prediction failed"));
    }

    #[test]
    fn nan_probability_surfaces_as_prediction_failed() {
        let classifier = Classifier::trained(Box::new(ConstModel(f64::NAN)), FeatureExtractor::new());
        assert!(matches!(
            classifier.classify("x").unwrap_err(),
            EngineError::PredictionFailed(_)
        ));
    }

    #[test]
    fn load_missing_artifact_degrades_to_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let classifier = Classifier::load(&dir.path().join("missing.json"), FeatureExtractor::new());
        assert_eq!(classifier.method(), ClassifierMethod::Fallback);
        assert!(classifier.status().model_name.is_none());
    }

    #[test]
    fn load_corrupt_artifact_degrades_to_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(&path, "{ not json").unwrap();
        let classifier = Classifier::load(&path, FeatureExtractor::new());
        assert_eq!(classifier.method(), ClassifierMethod::Fallback);
    }

    #[test]
    fn load_valid_artifact_uses_trained_model() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(&path, ensemble::tests::stump_artifact()).unwrap();
        let classifier = Classifier::load(
            &path,
            FeatureExtractor::with_sentiment(Arc::new(LexiconSentiment)),
        );
        assert_eq!(classifier.method(), ClassifierMethod::Trained);

        let status = classifier.status();
        assert_eq!(status.model_name.as_deref(), Some("stump"));
        assert!(status.artifact_sha256.is_some());
        assert!(status.sentiment_enabled);

        let loud = classifier.classify("BUY NOW!!!! You will not regret!").unwrap();
        assert!(loud.is_fake);
        assert!(loud
            .indicators
            .contains(&"Excessive exclamation marks".to_string()));
    }

    #[test]
    fn classifier_is_shareable_across_threads() {
        let classifier = Arc::new(Classifier::fallback(FeatureExtractor::new()));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let c = Arc::clone(&classifier);
                std::thread::spawn(move || c.classify("amazing perfect").unwrap().fake_probability)
            })
            .collect();
        for h in handles {
            assert!((h.join().unwrap() - 0.4).abs() < 1e-12);
        }
    }
}
