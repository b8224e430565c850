//! Scoring and classification engine for FakeBuster.
//!
//! Extracts deterministic text features, classifies reviews with a trained
//! tree ensemble (or a rule-based fallback when no model is available),
//! scores website legitimacy from structural signals, and scans free text
//! for scam phrasing. Everything except model loading is a pure, synchronous
//! computation over in-memory data.

pub mod classifier;
pub mod error;
pub mod features;
pub mod page;
pub mod review;
pub mod scanner;
pub mod sentiment;
pub mod summary;
pub mod trust;
pub mod types;

pub use classifier::{Classifier, ClassifierMethod, ModelStatus, ProbabilityModel};
pub use error::{EngineError, ModelError};
pub use features::{
    extract_features, FeatureExtractor, FeatureVector, NamedFeatures, FEATURE_COUNT,
    FEATURE_LAYOUT, FEATURE_VERSION,
};
pub use page::{
    analyze_page, check_form_security, FormField, FormSecurityReport, PageAnalysis, PageInput,
};
pub use review::{
    analyze_reviews, analyze_single_review, ReviewAuditRecord, ReviewBatchAnalysis, ReviewDetail,
    SingleReviewAnalysis,
};
pub use scanner::{scan_text, ScamPattern, ScanReport};
pub use sentiment::{LexiconSentiment, Sentiment, SentimentAnalyzer};
pub use summary::{summarize, BatchSummary};
pub use trust::{score_trust, TrustStatus, TrustVerdict, WebsiteSignals};
pub use types::{ClassificationResult, ReviewInput, RiskLevel, Severity};
