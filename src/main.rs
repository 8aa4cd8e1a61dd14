use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::info;

use log_miner::cli::{Cli, Commands};
use log_miner::config::AppConfig;
use log_miner::dataset_loader::load_dataset;
use log_miner::drain_engine::DrainEngine;
use log_miner::evaluation::{load_required_masks, run_timing_benchmark, write_parsed_csv, EvaluationRunner};
use log_miner::logging::init_logging;
use log_miner::synthesis::{build_synthesizer, resolve_synth_datasets, synthesize_dataset_masks};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();

    match cli.command {
        Commands::Eval => {
            let path = cli
                .config
                .as_deref()
                .context("eval requires --config <evaluation config>")?;
            let runner = EvaluationRunner::from_file(path)?;
            start_logging(&cli.log_dir, &cli.log_name, cli.verbose, &runner.app)?;

            info!("📊 Evaluating {} datasets", runner.config.datasets.len());
            let rows = runner.run().await?;
            for row in &rows {
                info!("   {} {}: GA={:.3} PA={:.3}", row.dataset, row.method, row.ga, row.pa);
            }
        }
        Commands::Synth {
            dataset,
            k,
            out,
            mode,
            strict,
        } => {
            let mut app = AppConfig::load(cli.config.as_deref())?;
            if let Some(mode) = mode {
                app.mode = mode;
            }
            if let Some(k) = k {
                app.k = k;
            }
            app.strict |= strict;
            start_logging(&cli.log_dir, &cli.log_name, cli.verbose, &app)?;
            app.ensure_dirs()?;

            let names = resolve_synth_datasets(dataset.as_deref(), &app.datasets)?;
            anyhow::ensure!(
                out.is_none() || names.len() == 1,
                "--out needs a single dataset, got {}",
                names.len()
            );
            let synth = build_synthesizer(app.mode, &app.llm_config())?;
            for name in &names {
                let dataset = load_dataset(name, &app.dataset_dir)?;
                let out = out.clone().unwrap_or_else(|| app.mask_path(&dataset.name));
                let bundle =
                    synthesize_dataset_masks(synth.as_ref(), &dataset, app.k, &out, &app.synth_options()).await?;
                info!("✅ Wrote {} masks to {}", bundle.masks.len(), out.display());
            }
        }
        Commands::Parse {
            dataset,
            masks,
            output,
        } => {
            let app = AppConfig::load(cli.config.as_deref())?;
            start_logging(&cli.log_dir, &cli.log_name, cli.verbose, &app)?;
            app.ensure_dirs()?;

            let dataset = load_dataset(&dataset, &app.dataset_dir)?;
            let mask_path = masks.unwrap_or_else(|| app.mask_path(&dataset.name));
            let masks = load_required_masks(&mask_path)?;

            let mut engine = DrainEngine::new(app.drain, &masks)?;
            let templates = engine.parse(&dataset.logs);
            let output = output.unwrap_or_else(|| app.output_dir.join(format!("{}_parsed.csv", dataset.name)));
            write_parsed_csv(&output, &dataset.logs, &templates)?;

            info!(
                "✅ Parsed {} lines into {} clusters; wrote {}",
                dataset.logs.len(),
                engine.cluster_count(),
                output.display()
            );
        }
        Commands::Time { dataset, n, output } => {
            let app = AppConfig::load(cli.config.as_deref())?;
            start_logging(&cli.log_dir, &cli.log_name, cli.verbose, &app)?;
            app.ensure_dirs()?;

            let dataset = load_dataset(&dataset, &app.dataset_dir)?;
            let mask_path = app.mask_path(&dataset.name);
            let masks = load_required_masks(&mask_path)?;

            let output = output.unwrap_or_else(|| app.output_dir.join("timing.csv"));
            let result = run_timing_benchmark(&dataset, &masks, app.drain, n, &output)?;
            info!("⏱️  {} lines in {:.4}s; wrote {}", result.n_logs, result.seconds, output.display());
        }
    }

    Ok(())
}

fn start_logging(log_dir: &Option<PathBuf>, log_name: &str, verbose: bool, app: &AppConfig) -> Result<()> {
    let dir = log_dir.clone().unwrap_or_else(|| app.log_dir.clone());
    init_logging(&dir, log_name, verbose)?;
    app.log_config();
    Ok(())
}
