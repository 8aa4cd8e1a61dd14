/// Mask synthesis front door: strategy selection, sampling and validation
use crate::dataset_loader::{Dataset, DEMO_DATASET};
use crate::error::{MinerError, Result};
use crate::llm_config::LlmConfig;
use crate::llm_synthesizer::LlmSynthesizer;
use crate::masks::{Mask, MaskBundle};
use crate::offline_synthesizer::OfflineSynthesizer;
use crate::regex_library::validate_patterns;
use crate::sampling::deterministic_sample;
use crate::traits::{MaskSynthesizer, SynthOptions};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SynthMode {
    #[default]
    Offline,
    Llm,
}

impl FromStr for SynthMode {
    type Err = MinerError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "offline" => Ok(SynthMode::Offline),
            "llm" => Ok(SynthMode::Llm),
            other => Err(MinerError::UnsupportedMode(other.to_string())),
        }
    }
}

impl fmt::Display for SynthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SynthMode::Offline => write!(f, "offline"),
            SynthMode::Llm => write!(f, "llm"),
        }
    }
}

/// `--dataset` value selecting every configured dataset
pub const ALL_DATASETS: &str = "ALL";

/// Datasets a `synth` run covers
///
/// A named dataset is used alone. `ALL` expands to the configured list. With
/// no name the configured list is used, or `DemoTiny` when it is empty.
pub fn resolve_synth_datasets(requested: Option<&str>, configured: &[String]) -> Result<Vec<String>> {
    match requested {
        Some(ALL_DATASETS) if configured.is_empty() => Err(MinerError::InvalidConfig(format!(
            "--dataset {} needs a non-empty `datasets` list in the config",
            ALL_DATASETS
        ))),
        Some(ALL_DATASETS) => Ok(configured.to_vec()),
        Some(name) => Ok(vec![name.to_string()]),
        None if configured.is_empty() => Ok(vec![DEMO_DATASET.to_string()]),
        None => Ok(configured.to_vec()),
    }
}

pub fn build_synthesizer(mode: SynthMode, llm: &LlmConfig) -> Result<Box<dyn MaskSynthesizer>> {
    match mode {
        SynthMode::Offline => Ok(Box::new(OfflineSynthesizer::new())),
        SynthMode::Llm => Ok(Box::new(LlmSynthesizer::new(llm.clone())?)),
    }
}

/// Run a synthesizer and validate what it produced
pub async fn synthesize_masks(
    synth: &dyn MaskSynthesizer,
    sample: &[String],
    options: &SynthOptions,
) -> Result<Vec<Mask>> {
    if sample.is_empty() {
        return Err(MinerError::EmptySample);
    }
    let masks = synth.synthesize(sample, options).await?;
    validate_patterns(masks.iter().map(|m| m.pattern.as_str()), options.strict)?;
    Ok(masks)
}

/// Sample a dataset, synthesize its masks and write them to `out_path`
pub async fn synthesize_dataset_masks(
    synth: &dyn MaskSynthesizer,
    dataset: &Dataset,
    k: usize,
    out_path: &Path,
    options: &SynthOptions,
) -> Result<MaskBundle> {
    tracing::info!("Synthesising masks for {} with {}", dataset.name, synth.name());
    let sample = deterministic_sample(&dataset.logs, k);
    let masks = synthesize_masks(synth, &sample, options).await?;
    let bundle = MaskBundle {
        dataset: dataset.name.clone(),
        masks,
    };
    bundle.write_json(out_path)?;
    Ok(bundle)
}
