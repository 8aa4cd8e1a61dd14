use crate::error::{MinerError, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_DEPTH: usize = 4;
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrainConfig {
    /// Number of leading tokens forming the bucket prefix
    pub depth: usize,
    /// Minimum similarity for a line to join an existing cluster
    pub similarity_threshold: f64,
}

impl Default for DrainConfig {
    fn default() -> Self {
        Self {
            depth: DEFAULT_DEPTH,
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }
}

impl DrainConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_similarity_threshold(mut self, threshold: f64) -> Self {
        self.similarity_threshold = threshold;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.depth == 0 {
            return Err(MinerError::InvalidConfig(
                "depth must be a positive integer".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(MinerError::InvalidConfig(format!(
                "similarity_threshold must be within [0, 1], got {}",
                self.similarity_threshold
            )));
        }
        Ok(())
    }
}
