//! CLI command definitions and parsing
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::synthesis::SynthMode;

#[derive(Parser, Debug)]
#[command(
    name = "log-miner",
    version,
    about = "Incremental log template mining with synthesized pre-masks",
    long_about = "log-miner clusters raw log lines into templates with a fixed-depth Drain-style \
                  engine. Regex masks, synthesized offline or by an LLM from a deterministic \
                  sample, normalize variable fields before clustering."
)]
pub struct Cli {
    /// Application config file (JSON); falls back to LOG_MINER_CONFIG
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory for the log file (defaults to the configured log_dir)
    #[arg(long, global = true, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Log file name without extension
    #[arg(long, global = true, default_value = "log-miner")]
    pub log_name: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Synthesize a mask file for a dataset
    Synth {
        /// Dataset name under the dataset directory, or `ALL` for every
        /// configured dataset (defaults to the configured list, else DemoTiny)
        #[arg(short, long)]
        dataset: Option<String>,

        /// Sample size (defaults to the configured k)
        #[arg(short, long)]
        k: Option<usize>,

        /// Output mask file (defaults to <mask_dir>/<dataset>.json)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Synthesis strategy
        #[arg(short, long, value_parser = parse_mode)]
        mode: Option<SynthMode>,

        /// Reject greedy `.*` patterns
        #[arg(long)]
        strict: bool,
    },

    /// Parse a dataset and write per-line templates
    Parse {
        #[arg(short, long)]
        dataset: String,

        /// Mask file (defaults to <mask_dir>/<dataset>.json)
        #[arg(short, long)]
        masks: Option<PathBuf>,

        /// Output CSV (defaults to <output_dir>/<dataset>_parsed.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run the evaluation described by the evaluation config given with --config
    Eval,

    /// Time parsing of the first n lines of a dataset
    Time {
        #[arg(short, long)]
        dataset: String,

        #[arg(short, long, default_value = "100")]
        n: usize,

        /// Output CSV (defaults to <output_dir>/timing.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn parse_mode(s: &str) -> Result<SynthMode, String> {
    s.parse().map_err(|e: crate::error::MinerError| e.to_string())
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_synth() {
        let cli = Cli::try_parse_from([
            "log-miner", "--verbose", "synth", "--dataset", "HDFS", "--k", "20", "--mode", "llm", "--strict",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Synth { dataset, k, mode, strict, out } => {
                assert_eq!(dataset.as_deref(), Some("HDFS"));
                assert_eq!(k, Some(20));
                assert_eq!(mode, Some(SynthMode::Llm));
                assert!(strict);
                assert!(out.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_synth_dataset_is_optional() {
        let cli = Cli::try_parse_from(["log-miner", "synth"]).unwrap();
        assert!(matches!(cli.command, Commands::Synth { dataset: None, k: None, .. }));
    }

    #[test]
    fn test_unknown_mode_rejected() {
        assert!(Cli::try_parse_from(["log-miner", "synth", "--dataset", "x", "--mode", "hf"]).is_err());
    }

    #[test]
    fn test_eval_takes_global_config() {
        let cli = Cli::try_parse_from(["log-miner", "eval", "--config", "eval.json"]).unwrap();
        assert!(matches!(cli.command, Commands::Eval));
        assert_eq!(cli.config, Some(PathBuf::from("eval.json")));
    }

    #[test]
    fn test_time_default_n() {
        let cli = Cli::try_parse_from(["log-miner", "time", "--dataset", "DemoTiny"]).unwrap();
        assert!(matches!(cli.command, Commands::Time { n: 100, .. }));
        assert_eq!(cli.log_name, "log-miner");
    }
}
