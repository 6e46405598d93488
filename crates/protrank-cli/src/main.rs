//! protrank: target prioritization from the command line.

mod cli;

use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use protrank_common::PipelineConfig;
use protrank_ranker::{save_results, PipelineOrchestrator, RankedTargets, RankingRequest, StaticDataset};

use cli::{Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("protrank=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    info!("protrank {}", env!("CARGO_PKG_VERSION"));

    let mut config = match &cli.config {
        Some(path) => PipelineConfig::from_path(&path.to_string_lossy())
            .with_context(|| format!("loading config {}", path.display()))?,
        None => PipelineConfig::load().context("loading config")?,
    };
    if cli.csv {
        config.output.write_csv = true;
    }
    if let Some(dir) = &cli.output_dir {
        config.output.directory = dir.to_string_lossy().into_owned();
    }

    let dataset_path = cli
        .dataset
        .as_ref()
        .context("no dataset given (use --dataset or PROTRANK_DATASET)")?;
    let dataset = Arc::new(
        StaticDataset::from_path(dataset_path)
            .with_context(|| format!("loading dataset {}", dataset_path.display()))?,
    );
    info!(
        proteins = dataset.proteins.len(),
        interactions = dataset.interactions.len(),
        "Dataset loaded"
    );

    let mut orchestrator = PipelineOrchestrator::new(config, dataset.clone(), dataset.clone(), dataset)?;
    let overrides = cli.weights.overrides();
    if !overrides.is_empty() {
        let weights = orchestrator.recompute_weights(&overrides)?;
        info!(?weights, "Scoring weights adjusted");
    }

    match cli.command {
        Command::Identify { disease } => {
            let ranked = orchestrator.identify_and_rank(&disease).await?;
            emit(&orchestrator, &ranked, &disease)?;
        }
        Command::Rank { proteins, disease } => {
            let request = RankingRequest { disease: disease.clone(), ..Default::default() };
            let ranked = orchestrator.rank_targets_with(&proteins, request).await?;
            emit(&orchestrator, &ranked, disease.as_deref().unwrap_or("targets"))?;
        }
        Command::Report { disease } => {
            let report = orchestrator.detailed_report(&disease).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Compare { diseases, max_targets } => {
            let comparisons = orchestrator.compare_diseases(&diseases, max_targets).await;
            println!("{}", serde_json::to_string_pretty(&comparisons)?);
        }
    }

    Ok(())
}

/// Print the report as JSON and write the CSV when configured.
fn emit(orchestrator: &PipelineOrchestrator, ranked: &RankedTargets, label: &str) -> anyhow::Result<()> {
    if ranked.is_empty() {
        warn!(label, "No targets ranked");
    }
    println!("{}", serde_json::to_string_pretty(&ranked.report)?);

    let output = &orchestrator.config().output;
    if output.write_csv && !ranked.is_empty() {
        let path = save_results(&ranked.targets, label, &output.directory)?;
        info!(path = %path.display(), "CSV written");
    }
    Ok(())
}
