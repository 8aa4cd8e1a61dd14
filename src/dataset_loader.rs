/// Raw log dataset loader
///
/// A dataset is a directory `<dataset_dir>/<name>/` holding `raw.log`, one
/// message per line. Lines are trimmed and empty lines dropped.
use crate::error::{MinerError, Result};
use crate::traits::DatasetLoader;
use crate::tokenizer::is_separator;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

pub const RAW_LOG_FILE: &str = "raw.log";
pub const DEMO_DATASET: &str = "DemoTiny";

const DEMO_LOGS: [&str; 4] = [
    "2024-01-01 00:00:00 INFO Worker-1 Completed task 42 in 0.5s",
    "2024-01-01 00:00:01 INFO Worker-2 Completed task 43 in 0.7s",
    "2024-01-01 00:00:02 WARN Worker-1 Retrying task 44",
    "2024-01-01 00:00:03 ERROR Worker-3 Failed task 45 with code 500",
];

#[derive(Debug, Clone)]
pub struct Dataset {
    pub name: String,
    pub path: PathBuf,
    pub logs: Vec<String>,
}

impl Dataset {
    /// Hex SHA-256 of the lines joined by `\n`
    pub fn checksum(&self) -> String {
        logs_checksum(&self.logs)
    }
}

fn logs_checksum<S: AsRef<str>>(logs: &[S]) -> String {
    let mut hasher = Sha256::new();
    for (idx, line) in logs.iter().enumerate() {
        if idx > 0 {
            hasher.update(b"\n");
        }
        hasher.update(line.as_ref().as_bytes());
    }
    format!("{:x}", hasher.finalize())
}

#[derive(Debug, Serialize)]
struct Manifest<'a> {
    name: &'a str,
    logs: usize,
    checksum: String,
}

pub struct RawLogDataset {
    name: String,
    root: PathBuf,
    create_demo: bool,
}

impl RawLogDataset {
    pub fn new(name: &str, dataset_dir: &Path) -> Self {
        Self {
            name: name.to_string(),
            root: dataset_dir.join(name),
            create_demo: true,
        }
    }

    /// Do not materialize the bundled demo dataset on load
    pub fn without_demo(mut self) -> Self {
        self.create_demo = false;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn load(&self) -> Result<Dataset> {
        let logs = self.load_raw_logs()?;
        tracing::info!("Loaded dataset {} with {} logs", self.name, logs.len());
        Ok(Dataset {
            name: self.name.clone(),
            path: self.root.clone(),
            logs,
        })
    }

    fn create_demo_dataset(&self) -> Result<()> {
        let raw = self.root.join(RAW_LOG_FILE);
        if raw.exists() {
            return Ok(());
        }
        tracing::info!("Creating bundled demo dataset at {}", self.root.display());
        fs::create_dir_all(&self.root)
            .map_err(|e| MinerError::io(e, format!("creating {}", self.root.display())))?;
        fs::write(&raw, DEMO_LOGS.join("\n"))
            .map_err(|e| MinerError::io(e, format!("writing {}", raw.display())))?;

        let manifest = Manifest {
            name: DEMO_DATASET,
            logs: DEMO_LOGS.len(),
            checksum: logs_checksum(&DEMO_LOGS[..]),
        };
        let json = serde_json::to_string_pretty(&manifest)
            .map_err(|e| MinerError::json(e, "serializing manifest"))?;
        let manifest_path = self.root.join("manifest.json");
        fs::write(&manifest_path, json)
            .map_err(|e| MinerError::io(e, format!("writing {}", manifest_path.display())))?;
        Ok(())
    }
}

impl DatasetLoader for RawLogDataset {
    fn load_raw_logs(&self) -> Result<Vec<String>> {
        if self.create_demo && self.name == DEMO_DATASET {
            self.create_demo_dataset()?;
        }
        if !self.root.exists() {
            return Err(MinerError::DatasetNotFound {
                name: self.name.clone(),
                path: self.root.clone(),
            });
        }

        let raw = self.root.join(RAW_LOG_FILE);
        if !raw.exists() {
            return Err(MinerError::DatasetNotFound {
                name: self.name.clone(),
                path: raw,
            });
        }

        let content = fs::read_to_string(&raw)
            .map_err(|e| MinerError::io(e, format!("reading {}", raw.display())))?;
        Ok(content
            .lines()
            .map(|line| line.trim_matches(is_separator))
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

pub fn load_dataset(name: &str, dataset_dir: &Path) -> Result<Dataset> {
    RawLogDataset::new(name, dataset_dir).load()
}
