use crate::drain_config::DrainConfig;
use crate::error::{MinerError, Result};
use crate::llm_config::LlmConfig;
use crate::synthesis::SynthMode;
use crate::traits::SynthOptions;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "LOG_MINER_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub dataset_dir: PathBuf,
    pub mask_dir: PathBuf,
    pub output_dir: PathBuf,
    pub log_dir: PathBuf,

    /// Datasets for `synth` when none is named, or with `--dataset ALL`
    pub datasets: Vec<String>,

    // Mask synthesis
    pub k: usize,
    pub mode: SynthMode,
    pub strict: bool,
    pub temperature: f64,
    pub max_tokens: u32,

    pub drain: DrainConfig,
    pub llm: Option<LlmConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            dataset_dir: PathBuf::from("artifacts/datasets"),
            mask_dir: PathBuf::from("artifacts/masks"),
            output_dir: PathBuf::from("artifacts/outputs"),
            log_dir: PathBuf::from("artifacts/outputs/logs"),
            datasets: Vec::new(),
            k: 50,
            mode: SynthMode::Offline,
            strict: false,
            temperature: 0.0,
            max_tokens: 512,
            drain: DrainConfig::default(),
            llm: None,
        }
    }
}

impl AppConfig {
    /// Explicit path, else `LOG_MINER_CONFIG`, else defaults; env overrides last
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let from_env = env::var(CONFIG_ENV).ok().map(PathBuf::from);
        let mut config = match path.map(Path::to_path_buf).or(from_env) {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        config.apply_env_overrides()?;
        config.drain.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| MinerError::io(e, format!("reading config {}", path.display())))?;
        serde_json::from_str(&content)
            .map_err(|e| MinerError::json(e, format!("parsing config {}", path.display())))
    }

    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(dir) = env::var("LOG_MINER_DATASET_DIR") {
            self.dataset_dir = PathBuf::from(dir);
        }
        if let Ok(dir) = env::var("LOG_MINER_MASK_DIR") {
            self.mask_dir = PathBuf::from(dir);
        }
        if let Ok(dir) = env::var("LOG_MINER_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(dir);
        }
        if let Ok(k) = env::var("LOG_MINER_K") {
            self.k = k
                .parse()
                .map_err(|_| MinerError::InvalidConfig(format!("LOG_MINER_K is not an integer: {}", k)))?;
        }
        if let Ok(mode) = env::var("LOG_MINER_MODE") {
            self.mode = mode.parse()?;
        }
        Ok(())
    }

    pub fn ensure_dirs(&self) -> Result<()> {
        for dir in [&self.dataset_dir, &self.mask_dir, &self.output_dir, &self.log_dir] {
            fs::create_dir_all(dir).map_err(|e| MinerError::io(e, format!("creating {}", dir.display())))?;
        }
        Ok(())
    }

    pub fn mask_path(&self, dataset: &str) -> PathBuf {
        self.mask_dir.join(format!("{}.json", dataset))
    }

    /// LLM providers from the file, else from the environment
    pub fn llm_config(&self) -> LlmConfig {
        self.llm.clone().unwrap_or_else(LlmConfig::from_env)
    }

    pub fn synth_options(&self) -> SynthOptions {
        SynthOptions {
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            strict: self.strict,
        }
    }

    pub fn log_config(&self) {
        tracing::info!("📋 Configuration:");
        tracing::info!("   Dataset dir: {}", self.dataset_dir.display());
        tracing::info!("   Mask dir: {}", self.mask_dir.display());
        tracing::info!("   Output dir: {}", self.output_dir.display());
        tracing::info!("   Sample size (k): {}", self.k);
        tracing::info!("   Synthesis mode: {} (strict: {})", self.mode, self.strict);
        tracing::info!(
            "   Drain: depth={} threshold={}",
            self.drain.depth,
            self.drain.similarity_threshold
        );
    }
}
