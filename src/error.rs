use std::path::PathBuf;
use thiserror::Error;

/// Library error type
#[derive(Error, Debug)]
pub enum MinerError {
    /// A mask or regex class pattern failed to compile
    #[error("Invalid regex {pattern}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Strict validation refused an unanchored greedy wildcard
    #[error("Strict mode forbids greedy pattern: {pattern}")]
    StrictModeRejected { pattern: String },

    /// Engine parameters out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Metric inputs of different lengths
    #[error("Mismatched lengths for {metric} computation: {expected} vs {actual}")]
    MismatchedLengths {
        metric: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Cannot synthesise masks from an empty log sequence")]
    EmptySample,

    #[error("Offline synthesiser failed to produce required masks: {0:?}")]
    MissingCoreMasks(Vec<String>),

    #[error("Unsupported synthesis mode: {0}")]
    UnsupportedMode(String),

    /// Model-backed synthesis failed or returned unusable output
    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Dataset {name} missing at {path}")]
    DatasetNotFound { name: String, path: PathBuf },

    #[error("IO error: {context}: {source}")]
    Io {
        source: std::io::Error,
        context: String,
    },

    #[error("JSON error: {context}: {source}")]
    Json {
        source: serde_json::Error,
        context: String,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, MinerError>;

impl MinerError {
    pub fn io(source: std::io::Error, context: impl Into<String>) -> Self {
        MinerError::Io {
            source,
            context: context.into(),
        }
    }

    pub fn json(source: serde_json::Error, context: impl Into<String>) -> Self {
        MinerError::Json {
            source,
            context: context.into(),
        }
    }
}
