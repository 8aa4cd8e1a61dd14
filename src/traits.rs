/// Pluggable collaborators around the clustering core
///
/// - Mask synthesis (rule-based or model-backed)
/// - Dataset loading
///
/// The engine only ever sees the `Vec<Mask>` a synthesizer returns, so any
/// strategy can be swapped in without touching the core.
use crate::error::Result;
use crate::masks::Mask;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

// ============================================================================
// Mask Synthesis Trait
// ============================================================================

/// Generation controls passed to a synthesizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthOptions {
    /// Sampling temperature for model-backed synthesis
    pub temperature: f64,
    /// Upper bound on generated tokens
    pub max_tokens: u32,
    /// Reject patterns containing `.*`
    pub strict: bool,
}

impl Default for SynthOptions {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            max_tokens: 512,
            strict: false,
        }
    }
}

/// Produces an ordered mask list from sample log lines
///
/// Implementations can use:
/// - Deterministic rules
/// - LLM APIs (Ollama, OpenAI, Anthropic)
#[async_trait]
pub trait MaskSynthesizer: Send + Sync {
    /// Synthesize masks for the given sample
    async fn synthesize(&self, sample: &[String], options: &SynthOptions) -> Result<Vec<Mask>>;

    /// Name of this synthesizer (for reporting)
    fn name(&self) -> &str;
}

// ============================================================================
// Dataset Loader Trait
// ============================================================================

/// Source of raw log lines for parsing and evaluation
pub trait DatasetLoader: Send + Sync {
    /// Load raw log lines, stripped and without empty lines
    fn load_raw_logs(&self) -> Result<Vec<String>>;

    /// Get the dataset name (for reporting)
    fn name(&self) -> &str;
}
