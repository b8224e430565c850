//! Subcommand handlers. Each returns the JSON document to print.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use fakebuster_engine::{Classifier, FeatureExtractor, LexiconSentiment, ReviewInput, WebsiteSignals};
use serde::Deserialize;
use serde_json::json;

/// Effective settings after merging config and command line flags.
#[derive(Debug, Clone)]
pub(crate) struct Settings {
    pub model_path: PathBuf,
    pub sentiment_enabled: bool,
    pub max_batch_size: usize,
}

impl Settings {
    fn extractor(&self) -> FeatureExtractor {
        if self.sentiment_enabled {
            FeatureExtractor::with_sentiment(Arc::new(LexiconSentiment))
        } else {
            FeatureExtractor::new()
        }
    }

    fn classifier(&self) -> Classifier {
        Classifier::load(&self.model_path, self.extractor())
    }
}

/// Batch files may hold a bare array or the HTTP request shape.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ReviewFile {
    Bare(Vec<ReviewInput>),
    Wrapped {
        reviews: Vec<ReviewInput>,
        #[serde(default)]
        url: Option<String>,
    },
}

impl ReviewFile {
    /// Reviews plus the page they came from, falling back to the file path
    /// when the file does not name one.
    pub(crate) fn into_parts(self, path: &Path) -> (Vec<ReviewInput>, String) {
        match self {
            ReviewFile::Wrapped {
                reviews,
                url: Some(url),
            } => (reviews, url),
            ReviewFile::Bare(reviews) | ReviewFile::Wrapped { reviews, .. } => {
                (reviews, path.display().to_string())
            }
        }
    }
}

/// `-` reads the whole of stdin, anything else is taken literally.
pub(crate) fn read_text(arg: &str) -> anyhow::Result<String> {
    if arg != "-" {
        return Ok(arg.to_string());
    }
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("failed to read text from stdin")?;
    Ok(buf)
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> anyhow::Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid JSON in {}", path.display()))
}

pub(crate) fn features(settings: &Settings, text: &str) -> anyhow::Result<String> {
    let (vector, named) = settings.extractor().extract(text);
    let doc = json!({
        "feature_version": fakebuster_engine::FEATURE_VERSION,
        "layout": fakebuster_engine::FEATURE_LAYOUT,
        "vector": vector,
        "named": named,
    });
    Ok(serde_json::to_string_pretty(&doc)?)
}

pub(crate) fn classify(settings: &Settings, text: &str) -> anyhow::Result<String> {
    let result = settings.classifier().classify(text)?;
    Ok(serde_json::to_string_pretty(&result)?)
}

pub(crate) fn scan(text: &str) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(&fakebuster_engine::scan_text(text))?)
}

pub(crate) fn trust(path: &Path) -> anyhow::Result<String> {
    let signals: WebsiteSignals = read_json(path)?;
    Ok(serde_json::to_string_pretty(&fakebuster_engine::score_trust(&signals))?)
}

pub(crate) fn batch(
    settings: &Settings,
    path: &Path,
    max_batch_size: Option<usize>,
) -> anyhow::Result<String> {
    let (reviews, source) = read_json::<ReviewFile>(path)?.into_parts(path);
    let limit = max_batch_size.unwrap_or(settings.max_batch_size);
    let classifier = settings.classifier();
    let analysis = fakebuster_engine::analyze_reviews(&classifier, &reviews, limit)?;

    let record = analysis.audit_record(&source);
    tracing::info!(
        target: "fakebuster::audit",
        url = %record.url,
        total_reviews = record.total_reviews,
        fake_reviews = record.fake_reviews,
        analyzed_at = %record.analyzed_at,
        method = %classifier.method(),
        "review analysis recorded"
    );
    Ok(serde_json::to_string_pretty(&analysis)?)
}

pub(crate) fn model_info(settings: &Settings) -> anyhow::Result<String> {
    let status = settings.classifier().status();
    Ok(serde_json::to_string_pretty(&json!({
        "model_path": settings.model_path.display().to_string(),
        "status": status,
    }))?)
}
