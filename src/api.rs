/// High-level parsing and synthesis entry points
use crate::drain_config::DrainConfig;
use crate::drain_engine::DrainEngine;
use crate::error::Result;
use crate::llm_config::LlmConfig;
use crate::masks::{load_masks, Mask};
use crate::sampling::deterministic_sample;
use crate::synthesis::{build_synthesizer, synthesize_masks, SynthMode};
use crate::traits::SynthOptions;
use std::path::Path;

/// Template miner with optional masks
///
/// ```no_run
/// use log_miner::api::Drain;
///
/// let mut drain = Drain::new(4, 0.6)?;
/// drain.load_masks("artifacts/masks/HDFS.json".as_ref())?;
/// let templates = drain.parse_all(["Received block 1", "Received block 2"]);
/// # Ok::<(), log_miner::MinerError>(())
/// ```
pub struct Drain {
    engine: DrainEngine,
}

impl Drain {
    pub fn new(depth: usize, similarity_threshold: f64) -> Result<Self> {
        let config = DrainConfig::new()
            .with_depth(depth)
            .with_similarity_threshold(similarity_threshold);
        Ok(Self {
            engine: DrainEngine::new(config, &[])?,
        })
    }

    /// Rebuild the engine with the masks in `path`; learned clusters are dropped
    pub fn load_masks(&mut self, path: &Path) -> Result<()> {
        let masks = load_masks(path)?;
        self.set_masks(&masks)
    }

    pub fn set_masks(&mut self, masks: &[Mask]) -> Result<()> {
        self.engine = DrainEngine::new(*self.engine.config(), masks)?;
        Ok(())
    }

    pub fn add_log(&mut self, line: &str) -> String {
        self.engine.add_log(line).template_str()
    }

    pub fn parse_all<I, S>(&mut self, lines: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.engine.parse(lines)
    }

    pub fn engine(&self) -> &DrainEngine {
        &self.engine
    }
}

/// Sample `logs`, then synthesize masks with the chosen strategy
pub async fn synth_masks(
    logs: &[String],
    sample_size: usize,
    mode: SynthMode,
    options: &SynthOptions,
    llm: &LlmConfig,
) -> Result<Vec<Mask>> {
    let synth = build_synthesizer(mode, llm)?;
    let sample = deterministic_sample(logs, sample_size);
    synthesize_masks(synth.as_ref(), &sample, options).await
}
