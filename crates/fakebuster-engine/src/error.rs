use std::path::PathBuf;

use thiserror::Error;

/// Failures scoped to a single scoring request.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no input provided: {0}")]
    NoInput(String),

    #[error("batch of {size} items exceeds the limit of {limit}")]
    BatchTooLarge { size: usize, limit: usize },

    #[error("prediction failed: {0}")]
    PredictionFailed(#[source] ModelError),
}

/// Failures loading or evaluating a trained model.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to read model artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("model artifact is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid model artifact: {0}")]
    Invalid(String),

    #[error("model produced an unusable output: {0}")]
    Output(String),
}
