/// Evaluation and timing runners
///
/// Each dataset is parsed by its own fresh engine, so datasets can be
/// evaluated in parallel while every per-dataset result stays deterministic.
use crate::config::AppConfig;
use crate::dataset_loader::{load_dataset, Dataset};
use crate::drain_config::DrainConfig;
use crate::drain_engine::DrainEngine;
use crate::masks::{load_masks, Mask};
use crate::metrics::{grouping_accuracy, parsing_accuracy};
use crate::regex_library::{validate_patterns, RegexRegistry};
use crate::synthesis::{build_synthesizer, synthesize_dataset_masks};
use crate::tokenizer::normalize;
use crate::traits::MaskSynthesizer;
use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

pub const METHOD_NAME: &str = "LogMiner";
pub const DEFAULT_TIMING_LINES: usize = 100;

fn default_timing_lines() -> usize {
    DEFAULT_TIMING_LINES
}

#[derive(Debug, Clone, Deserialize)]
pub struct EvaluationConfig {
    #[serde(default)]
    pub base_config: Option<PathBuf>,
    pub datasets: Vec<String>,
    pub output_csv: PathBuf,
    #[serde(default)]
    pub timing_csv: Option<PathBuf>,
    #[serde(default = "default_timing_lines")]
    pub timing_lines: usize,
}

impl EvaluationConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read evaluation config: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse evaluation config: {}", path.display()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricRow {
    pub dataset: String,
    pub method: String,
    #[serde(rename = "GA")]
    pub ga: f64,
    #[serde(rename = "PA")]
    pub pa: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimingResult {
    pub dataset: String,
    pub seconds: f64,
    pub n_logs: usize,
}

/// Token-class rendering of each line, used as the reference template
pub fn reference_templates(logs: &[String]) -> Vec<String> {
    let registry = RegexRegistry::canonical();
    logs.iter().map(|line| normalize(line, registry).join(" ")).collect()
}

/// Read a mask file and check every pattern compiles
pub fn load_validated_masks(path: &Path) -> Result<Vec<Mask>> {
    let masks = load_masks(path)?;
    validate_patterns(masks.iter().map(|m| m.pattern.as_str()), false)?;
    Ok(masks)
}

/// Like `load_validated_masks`, but a missing file is its own error
pub fn load_required_masks(path: &Path) -> Result<Vec<Mask>> {
    anyhow::ensure!(path.exists(), "Mask file missing at {}", path.display());
    load_validated_masks(path)
}

/// Parse one dataset with a fresh engine and score it
pub fn evaluate_dataset(dataset: &Dataset, masks: &[Mask], drain: DrainConfig) -> Result<MetricRow> {
    let mut engine = DrainEngine::new(drain, masks)?;
    let predicted = engine.parse(&dataset.logs);
    let truth = reference_templates(&dataset.logs);

    let ga = grouping_accuracy(&truth, &predicted)?;
    let pa = parsing_accuracy(&truth, &predicted)?;
    tracing::info!(
        "Dataset {}: GA={:.3} PA={:.3} ({} clusters)",
        dataset.name,
        ga,
        pa,
        engine.cluster_count()
    );

    Ok(MetricRow {
        dataset: dataset.name.clone(),
        method: METHOD_NAME.to_string(),
        ga,
        pa,
    })
}

fn macro_average(rows: &[MetricRow]) -> Option<MetricRow> {
    if rows.is_empty() {
        return None;
    }
    let n = rows.len() as f64;
    Some(MetricRow {
        dataset: "MacroAvg".to_string(),
        method: METHOD_NAME.to_string(),
        ga: rows.iter().map(|r| r.ga).sum::<f64>() / n,
        pa: rows.iter().map(|r| r.pa).sum::<f64>() / n,
    })
}

fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write `log,template` rows for a parsed dataset
pub fn write_parsed_csv(path: &Path, logs: &[String], templates: &[String]) -> Result<()> {
    anyhow::ensure!(
        logs.len() == templates.len(),
        "Mismatched lengths: {} logs vs {} templates",
        logs.len(),
        templates.len()
    );

    #[derive(Serialize)]
    struct ParsedRow<'a> {
        log: &'a str,
        template: &'a str,
    }

    let rows: Vec<ParsedRow> = logs
        .iter()
        .zip(templates)
        .map(|(log, template)| ParsedRow { log, template })
        .collect();
    write_csv(path, &rows)
}

pub struct EvaluationRunner {
    pub config: EvaluationConfig,
    pub app: AppConfig,
}

impl EvaluationRunner {
    pub fn new(config: EvaluationConfig, app: AppConfig) -> Self {
        Self { config, app }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let config = EvaluationConfig::from_file(path)?;
        let app = AppConfig::load(config.base_config.as_deref())?;
        Ok(Self::new(config, app))
    }

    /// Load the dataset's masks, synthesizing them first when missing
    async fn ensure_masks(
        &self,
        dataset: &Dataset,
        synth: &mut Option<Box<dyn MaskSynthesizer>>,
    ) -> Result<Vec<Mask>> {
        let mask_path = self.app.mask_path(&dataset.name);
        if !mask_path.exists() {
            tracing::info!("Masks missing for {}; synthesising", dataset.name);
            if synth.is_none() {
                *synth = Some(build_synthesizer(self.app.mode, &self.app.llm_config())?);
            }
            if let Some(synth) = synth.as_deref() {
                synthesize_dataset_masks(
                    synth,
                    dataset,
                    self.app.k,
                    &mask_path,
                    &self.app.synth_options(),
                )
                .await?;
            }
        }
        load_validated_masks(&mask_path)
    }

    pub async fn run(&self) -> Result<Vec<MetricRow>> {
        self.app.ensure_dirs()?;

        let mut synth = None;
        let mut prepared = Vec::with_capacity(self.config.datasets.len());
        for name in &self.config.datasets {
            let dataset = load_dataset(name, &self.app.dataset_dir)?;
            let masks = self.ensure_masks(&dataset, &mut synth).await?;
            prepared.push((dataset, masks));
        }

        let drain = self.app.drain;
        let mut rows = prepared
            .par_iter()
            .map(|(dataset, masks)| evaluate_dataset(dataset, masks, drain))
            .collect::<Result<Vec<_>>>()?;

        if let Some(avg) = macro_average(&rows) {
            rows.push(avg);
        }

        write_csv(&self.config.output_csv, &rows)?;
        tracing::info!("Wrote metrics CSV to {}", self.config.output_csv.display());

        if let Some(timing_csv) = &self.config.timing_csv {
            // Timed one dataset at a time
            let timings = prepared
                .iter()
                .map(|(dataset, masks)| time_dataset(dataset, masks, drain, self.config.timing_lines))
                .collect::<Result<Vec<_>>>()?;
            write_csv(timing_csv, &timings)?;
            tracing::info!("Wrote timing CSV to {}", timing_csv.display());
        }

        Ok(rows)
    }
}

/// Wall time to parse the first `n` lines with a fresh engine
pub fn time_dataset(dataset: &Dataset, masks: &[Mask], drain: DrainConfig, n: usize) -> Result<TimingResult> {
    let mut engine = DrainEngine::new(drain, masks)?;
    let sample = &dataset.logs[..n.min(dataset.logs.len())];

    let start = Instant::now();
    engine.parse(sample);
    let elapsed = start.elapsed();

    tracing::info!("Timing for {}: {:.4}s over {} lines", dataset.name, elapsed.as_secs_f64(), sample.len());
    Ok(TimingResult {
        dataset: dataset.name.clone(),
        seconds: elapsed.as_secs_f64(),
        n_logs: sample.len(),
    })
}

pub fn run_timing_benchmark(
    dataset: &Dataset,
    masks: &[Mask],
    drain: DrainConfig,
    n: usize,
    output_csv: &Path,
) -> Result<TimingResult> {
    let result = time_dataset(dataset, masks, drain, n)?;
    write_csv(output_csv, std::slice::from_ref(&result))?;
    Ok(result)
}
