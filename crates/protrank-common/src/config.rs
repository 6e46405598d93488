//! Pipeline configuration.
//!
//! Loaded from `protrank.toml` (or the path in `PROTRANK_CONFIG`), or from
//! YAML/JSON files. Every field has a default, so a partial file is valid.
//! Analyzers receive these values through their constructors only.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ProtrankError, Result};

/// Complete configuration for one protrank deployment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Scoring weights and report options
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Interaction network analysis
    #[serde(default)]
    pub network: NetworkConfig,

    /// Orchestration and collaborator pacing
    #[serde(default)]
    pub pipeline: RunConfig,

    /// Result export
    #[serde(default)]
    pub output: OutputConfig,
}

// ── Scoring ───────────────────────────────────────────────────────────────────

/// Raw weights as written in the config file. They are renormalised to sum
/// to 1.0 when the scorer is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default = "default_druggability_weight")]
    pub druggability: f64,

    #[serde(default = "default_centrality_weight")]
    pub centrality: f64,

    #[serde(default = "default_pathway_weight")]
    pub pathway: f64,

    #[serde(default = "default_disease_weight")]
    pub disease: f64,

    /// Number of targets in the report excerpt
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

fn default_druggability_weight() -> f64 { 0.4 }
fn default_centrality_weight() -> f64 { 0.3 }
fn default_pathway_weight() -> f64 { 0.2 }
fn default_disease_weight() -> f64 { 0.1 }
fn default_top_n() -> usize { 10 }

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            druggability: default_druggability_weight(),
            centrality: default_centrality_weight(),
            pathway: default_pathway_weight(),
            disease: default_disease_weight(),
            top_n: default_top_n(),
        }
    }
}

// ── Network ───────────────────────────────────────────────────────────────────

/// How an edge's confidence weight becomes a path length for betweenness
/// and closeness.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMode {
    /// `1 / weight`: confident interactions are short hops.
    #[default]
    Inverse,
    /// The weight itself is the length.
    Raw,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Minimum raw interaction score (0-1000) a source should return
    #[serde(default = "default_score_threshold")]
    pub score_threshold: i64,

    #[serde(default)]
    pub distance: DistanceMode,

    /// PageRank damping factor
    #[serde(default = "default_damping")]
    pub damping: f64,

    /// Iteration cap for PageRank and eigenvector power iteration
    #[serde(default = "default_max_iter")]
    pub max_iter: usize,

    /// Per-node convergence tolerance for power iteration
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,

    /// Number of hubs reported by the network analysis
    #[serde(default = "default_hub_count")]
    pub hub_count: usize,
}

fn default_score_threshold() -> i64 { 400 }
fn default_damping() -> f64 { 0.85 }
fn default_max_iter() -> usize { 100 }
fn default_tolerance() -> f64 { 1e-6 }
fn default_hub_count() -> usize { 10 }

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            score_threshold: default_score_threshold(),
            distance: DistanceMode::default(),
            damping: default_damping(),
            max_iter: default_max_iter(),
            tolerance: default_tolerance(),
            hub_count: default_hub_count(),
        }
    }
}

// ── Pipeline run ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Maximum number of ranked targets returned
    #[serde(default = "default_max_targets")]
    pub max_targets: usize,

    /// Proteins taken from each discovered pathway
    #[serde(default = "default_max_proteins_per_pathway")]
    pub max_proteins_per_pathway: usize,

    /// Pause between collaborator calls
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,

    /// Upper bound for a single collaborator call
    #[serde(default = "default_timeout_secs")]
    pub collaborator_timeout_secs: u64,

    #[serde(default = "default_true")]
    pub include_network_analysis: bool,

    /// Keep a protein's disease list only if it mentions the queried disease
    #[serde(default = "default_true")]
    pub filter_disease_associations: bool,
}

fn default_max_targets() -> usize { 50 }
fn default_max_proteins_per_pathway() -> usize { 50 }
fn default_request_delay_ms() -> u64 { 100 }
fn default_timeout_secs() -> u64 { 30 }
fn default_true() -> bool { true }

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_targets: default_max_targets(),
            max_proteins_per_pathway: default_max_proteins_per_pathway(),
            request_delay_ms: default_request_delay_ms(),
            collaborator_timeout_secs: default_timeout_secs(),
            include_network_analysis: true,
            filter_disease_associations: true,
        }
    }
}

// ── Output ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub directory: String,

    #[serde(default)]
    pub write_csv: bool,
}

fn default_output_dir() -> String { "results".to_string() }

impl Default for OutputConfig {
    fn default() -> Self {
        Self { directory: default_output_dir(), write_csv: false }
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

impl PipelineConfig {
    /// Load configuration from `PROTRANK_CONFIG` or `./protrank.toml`.
    /// A missing file yields the defaults.
    pub fn load() -> Result<Self> {
        let path = std::env::var("PROTRANK_CONFIG")
            .unwrap_or_else(|_| "protrank.toml".to_string());

        if !Path::new(&path).exists() {
            tracing::info!(path = %path, "No config file found, using defaults");
            return Ok(Self::default());
        }
        Self::from_path(&path)
    }

    /// Load from a file, choosing the format by extension.
    pub fn from_path(path: &str) -> Result<Self> {
        let config = match Path::new(path).extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml(path)?,
            Some("json") => Self::from_json(path)?,
            _ => Self::from_toml(path)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    pub fn from_yaml(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }

    pub fn from_json(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn to_yaml(&self, path: &str) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject values no analyzer can work with.
    pub fn validate(&self) -> Result<()> {
        let s = &self.scoring;
        let weights = [s.druggability, s.centrality, s.pathway, s.disease];
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(ProtrankError::Config(format!(
                "scoring weights must be finite and non-negative, got {weights:?}"
            )));
        }
        if weights.iter().sum::<f64>() <= 0.0 {
            return Err(ProtrankError::Config("scoring weights sum to zero".into()));
        }
        let n = &self.network;
        if !(0..=1000).contains(&n.score_threshold) {
            return Err(ProtrankError::Config(format!(
                "network.score_threshold must be within 0..=1000, got {}",
                n.score_threshold
            )));
        }
        if !(0.0..1.0).contains(&n.damping) {
            return Err(ProtrankError::Config(format!(
                "network.damping must be within [0, 1), got {}",
                n.damping
            )));
        }
        if n.max_iter == 0 || n.tolerance.is_nan() || n.tolerance <= 0.0 {
            return Err(ProtrankError::Config(
                "network.max_iter and network.tolerance must be positive".into(),
            ));
        }
        if n.hub_count == 0 {
            return Err(ProtrankError::Config("network.hub_count must be at least 1".into()));
        }
        if self.pipeline.max_targets == 0 {
            return Err(ProtrankError::Config("pipeline.max_targets must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.scoring.druggability, 0.4);
        assert_eq!(config.scoring.top_n, 10);
        assert_eq!(config.network.score_threshold, 400);
        assert_eq!(config.network.distance, DistanceMode::Inverse);
        assert_eq!(config.pipeline.max_targets, 50);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: PipelineConfig = toml::from_str(
            r#"
            [scoring]
            druggability = 1.0

            [network]
            distance = "raw"
            "#,
        )
        .unwrap();
        assert_eq!(config.scoring.druggability, 1.0);
        assert_eq!(config.scoring.centrality, 0.3);
        assert_eq!(config.network.distance, DistanceMode::Raw);
        assert_eq!(config.pipeline, RunConfig::default());
    }

    #[test]
    fn test_validate_rejects_negative_weight() {
        let mut config = PipelineConfig::default();
        config.scoring.pathway = -0.1;
        assert!(matches!(config.validate(), Err(ProtrankError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_threshold_out_of_range() {
        let mut config = PipelineConfig::default();
        config.network.score_threshold = 1200;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_max_targets() {
        let mut config = PipelineConfig::default();
        config.pipeline.max_targets = 0;
        assert!(matches!(config.validate(), Err(ProtrankError::Config(msg)) if msg.contains("max_targets")));

        let config: PipelineConfig = toml::from_str("[network]\nhub_count = 0\n").unwrap();
        assert!(matches!(config.validate(), Err(ProtrankError::Config(msg)) if msg.contains("hub_count")));
    }

    #[test]
    fn test_yaml_roundtrip_via_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("protrank.yaml");
        let path = path.to_str().unwrap();

        let mut config = PipelineConfig::default();
        config.pipeline.max_targets = 7;
        config.to_yaml(path).unwrap();

        let parsed = PipelineConfig::from_path(path).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_example_config_matches_defaults() {
        let parsed: PipelineConfig = toml::from_str(include_str!("../../../protrank.example.toml")).unwrap();
        assert_eq!(parsed, PipelineConfig::default());
    }
}
