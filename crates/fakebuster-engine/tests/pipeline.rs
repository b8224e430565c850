//! End-to-end checks against the sample artifact shipped in `models/`.

use std::path::PathBuf;
use std::sync::Arc;

use fakebuster_engine::{
    analyze_reviews, Classifier, ClassifierMethod, FeatureExtractor, LexiconSentiment,
    ReviewInput,
};

fn sample_model() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../models/review_model.json")
}

fn trained() -> Classifier {
    Classifier::load(
        &sample_model(),
        FeatureExtractor::with_sentiment(Arc::new(LexiconSentiment)),
    )
}

#[test]
fn sample_artifact_loads_as_trained_model() {
    let classifier = trained();
    assert_eq!(classifier.method(), ClassifierMethod::Trained);

    let status = classifier.status();
    assert_eq!(status.model_name.as_deref(), Some("review-model-sample"));
    assert_eq!(status.feature_version, 1);
    assert_eq!(status.artifact_sha256.map(|s| s.len()), Some(64));
}

#[test]
fn calm_review_is_genuine_and_shouting_spam_is_fake() {
    let classifier = trained();

    let calm = classifier
        .classify("Great kettle, works well and looks nice on the counter.")
        .unwrap();
    assert!(!calm.is_fake);
    assert!(calm.fake_probability < 0.2);

    let spam = classifier.classify("BUY NOW!!! CLICK http://x.io").unwrap();
    assert!(spam.is_fake);
    assert!(spam.fake_probability > 0.9);
    assert_eq!(
        spam.indicators,
        vec!["Contains URL or link", "Excessive capitalization"]
    );
}

#[test]
fn batch_over_trained_model_counts_fakes() {
    let reviews = vec![
        ReviewInput::from_text("Great kettle, works well and looks nice on the counter."),
        ReviewInput::from_text("BUY NOW!!! CLICK http://x.io"),
    ];
    let analysis = analyze_reviews(&trained(), &reviews, 500).unwrap();
    assert_eq!(analysis.total_reviews, 2);
    assert_eq!(analysis.fake_reviews, 1);
    assert!(analysis.confidence > 0.8);
}

#[test]
fn missing_artifact_falls_back_to_rules() {
    let classifier = Classifier::load(
        &sample_model().with_file_name("does_not_exist.json"),
        FeatureExtractor::new(),
    );
    assert_eq!(classifier.method(), ClassifierMethod::Fallback);
}
