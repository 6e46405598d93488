//! Command-line arguments.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use protrank_ranker::{WeightOverrides, DEFAULT_COMPARISON_TARGETS};

#[derive(Debug, Parser)]
#[command(name = "protrank")]
#[command(about = "Rank candidate drug targets from interaction, druggability and pathway evidence", long_about = None)]
pub struct Cli {
    /// Config file (TOML, YAML or JSON). Defaults to PROTRANK_CONFIG or ./protrank.toml
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// JSON dataset providing proteins, interactions, pathways and diseases
    #[arg(short, long, global = true, env = "PROTRANK_DATASET")]
    pub dataset: Option<PathBuf>,

    /// Write ranked targets to CSV in the output directory
    #[arg(long, global = true)]
    pub csv: bool,

    /// Output directory for CSV results
    #[arg(long, global = true, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    #[command(flatten)]
    pub weights: WeightArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Partial scoring weight overrides. Renormalised after merging.
#[derive(Debug, Default, clap::Args)]
pub struct WeightArgs {
    #[arg(long, global = true, value_name = "W")]
    pub druggability_weight: Option<f64>,

    #[arg(long, global = true, value_name = "W")]
    pub centrality_weight: Option<f64>,

    #[arg(long, global = true, value_name = "W")]
    pub pathway_weight: Option<f64>,

    #[arg(long, global = true, value_name = "W")]
    pub disease_weight: Option<f64>,
}

impl WeightArgs {
    pub fn overrides(&self) -> WeightOverrides {
        WeightOverrides {
            druggability: self.druggability_weight,
            centrality: self.centrality_weight,
            pathway: self.pathway_weight,
            disease: self.disease_weight,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Discover candidates through a disease's pathways and rank them
    Identify {
        disease: String,
    },
    /// Rank an explicit list of proteins
    Rank {
        /// Comma-separated protein identifiers
        #[arg(long, value_delimiter = ',', required = true)]
        proteins: Vec<String>,

        /// Only count disease associations mentioning this disease
        #[arg(long)]
        disease: Option<String>,
    },
    /// Rank a disease and print pathway details and score distributions
    Report {
        disease: String,
    },
    /// Rank several diseases and summarise each
    Compare {
        #[arg(required = true)]
        diseases: Vec<String>,

        /// Targets ranked per disease
        #[arg(long, default_value_t = DEFAULT_COMPARISON_TARGETS)]
        max_targets: usize,
    },
}
