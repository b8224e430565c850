//! Gradient-boosted tree ensemble loaded from a JSON artifact.
//!
//! The artifact mirrors an XGBoost JSON dump flattened to one node list per
//! tree. A split sends the sample left when `x[feature] < threshold`. The
//! summed leaf values plus `base_score` form a log-odds margin that is mapped
//! to P(fake) with the logistic function.
//!
//! ```json
//! {
//!   "format_version": 1,
//!   "name": "xgb-reviews-2024-03",
//!   "feature_names": ["text_length", "word_count", "..."],
//!   "base_score": 0.0,
//!   "trees": [
//!     { "nodes": [
//!       { "kind": "split", "feature": 6, "threshold": 3.5, "left": 1, "right": 2 },
//!       { "kind": "leaf", "value": -2.0 },
//!       { "kind": "leaf", "value": 2.0 }
//!     ] }
//!   ]
//! }
//! ```

use std::path::Path;

use serde::Deserialize;
use sha2::{Digest, Sha256};

use super::ProbabilityModel;
use crate::error::ModelError;
use crate::features::{FeatureVector, FEATURE_COUNT, FEATURE_LAYOUT};

pub const SUPPORTED_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Deserialize)]
struct Artifact {
    format_version: u32,
    #[serde(default)]
    name: Option<String>,
    feature_names: Vec<String>,
    #[serde(default)]
    base_score: f64,
    trees: Vec<Tree>,
}

#[derive(Debug, Clone, Deserialize)]
struct Tree {
    nodes: Vec<Node>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

impl Tree {
    fn validate(&self, tree_idx: usize) -> Result<(), ModelError> {
        if self.nodes.is_empty() {
            return Err(ModelError::Invalid(format!("tree {tree_idx} has no nodes")));
        }

        let len = self.nodes.len();
        for (idx, node) in self.nodes.iter().enumerate() {
            match *node {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if feature >= FEATURE_COUNT {
                        return Err(ModelError::Invalid(format!(
                            "tree {tree_idx} node {idx} splits on unknown feature {feature}"
                        )));
                    }
                    if !threshold.is_finite() {
                        return Err(ModelError::Invalid(format!(
                            "tree {tree_idx} node {idx} has a non-finite threshold"
                        )));
                    }
                    // Children must point forward so traversal always terminates.
                    for child in [left, right] {
                        if child <= idx || child >= len {
                            return Err(ModelError::Invalid(format!(
                                "tree {tree_idx} node {idx} has invalid child index {child}"
                            )));
                        }
                    }
                }
                Node::Leaf { value } => {
                    if !value.is_finite() {
                        return Err(ModelError::Invalid(format!(
                            "tree {tree_idx} leaf {idx} has a non-finite value"
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    fn leaf_value(&self, x: &[f64; FEATURE_COUNT]) -> f64 {
        let mut idx = 0;
        loop {
            match self.nodes[idx] {
                Node::Leaf { value } => return value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if x[feature] < threshold { left } else { right };
                }
            }
        }
    }
}

/// A validated tree ensemble ready for prediction.
#[derive(Debug, Clone)]
pub struct TreeEnsemble {
    name: String,
    base_score: f64,
    trees: Vec<Tree>,
    sha256: String,
}

impl TreeEnsemble {
    /// Read and validate an artifact from disk.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Io`] when the file cannot be read, and
    /// [`ModelError::Parse`] or [`ModelError::Invalid`] for a corrupt artifact.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let bytes = std::fs::read(path).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let default_name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("review-model");
        Self::from_slice(&bytes, default_name)
    }

    /// Parse and validate an artifact held in memory.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Parse`] or [`ModelError::Invalid`] for a corrupt artifact.
    pub fn from_slice(bytes: &[u8], default_name: &str) -> Result<Self, ModelError> {
        let artifact: Artifact = serde_json::from_slice(bytes)?;

        if artifact.format_version != SUPPORTED_FORMAT_VERSION {
            return Err(ModelError::Invalid(format!(
                "unsupported format_version {} (expected {SUPPORTED_FORMAT_VERSION})",
                artifact.format_version
            )));
        }
        if artifact.feature_names.len() != FEATURE_COUNT
            || artifact
                .feature_names
                .iter()
                .zip(FEATURE_LAYOUT)
                .any(|(got, want)| got != want)
        {
            return Err(ModelError::Invalid(format!(
                "feature layout mismatch: artifact has [{}]",
                artifact.feature_names.join(", ")
            )));
        }
        if !artifact.base_score.is_finite() {
            return Err(ModelError::Invalid("base_score is not finite".to_string()));
        }
        if artifact.trees.is_empty() {
            return Err(ModelError::Invalid("ensemble has no trees".to_string()));
        }
        for (idx, tree) in artifact.trees.iter().enumerate() {
            tree.validate(idx)?;
        }

        Ok(Self {
            name: artifact.name.unwrap_or_else(|| default_name.to_string()),
            base_score: artifact.base_score,
            trees: artifact.trees,
            sha256: format!("{:x}", Sha256::digest(bytes)),
        })
    }

    /// Hex SHA-256 of the artifact bytes.
    #[must_use]
    pub fn sha256(&self) -> &str {
        &self.sha256
    }

    #[must_use]
    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    fn margin(&self, features: &FeatureVector) -> f64 {
        let x = features.values();
        self.base_score + self.trees.iter().map(|t| t.leaf_value(x)).sum::<f64>()
    }
}

impl ProbabilityModel for TreeEnsemble {
    fn predict_proba(&self, features: &FeatureVector) -> Result<[f64; 2], ModelError> {
        let margin = self.margin(features);
        let fake = 1.0 / (1.0 + (-margin).exp());
        if !fake.is_finite() {
            return Err(ModelError::Output(format!("margin {margin} is not finite")));
        }
        Ok([1.0 - fake, fake])
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn artifact_sha256(&self) -> Option<&str> {
        Some(&self.sha256)
    }
}
