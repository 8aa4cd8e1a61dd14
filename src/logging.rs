use crate::error::{MinerError, Result};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const DEFAULT_FILTER: &str = "log_miner=info";
pub const VERBOSE_FILTER: &str = "log_miner=debug";

pub fn log_file_path(log_dir: &Path, log_name: &str) -> PathBuf {
    log_dir.join(format!("{}.log", log_name))
}

/// Install stderr and file logging; `RUST_LOG` overrides the default filter
pub fn init_logging(log_dir: &Path, log_name: &str, verbose: bool) -> Result<PathBuf> {
    fs::create_dir_all(log_dir)
        .map_err(|e| MinerError::io(e, format!("creating log dir {}", log_dir.display())))?;

    let log_file = log_file_path(log_dir, log_name);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file)
        .map_err(|e| MinerError::io(e, format!("opening log file {}", log_file.display())))?;

    let default = if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let file_layer = fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true);

    let console_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .map_err(|e| MinerError::InvalidConfig(format!("logging already initialised: {}", e)))?;

    tracing::debug!("Logging to {}", log_file.display());
    Ok(log_file)
}
