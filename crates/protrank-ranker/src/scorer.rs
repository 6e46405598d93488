//! Target score computation and ranking.
//!
//! final = Σ(w_i × s_i) over druggability, centrality, pathway and disease,
//! capped at 1.0. Records are sorted by final score descending; ties keep
//! input order.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};

use protrank_common::confidence::{compute_confidence, EvidenceSignals};
use protrank_common::{PathwayInvolvement, ProteinId, ProteinProfile, ProtrankError, Result, ScoringConfig};
use protrank_network::CentralityRecord;

use crate::normalise::{disease_subscore, druggability_subscore, pathway_subscore};
use crate::report::ScoringReport;
use crate::weights::{ScoringWeights, WeightOverrides};

/// Default size of the report's top-target excerpt.
pub const DEFAULT_REPORT_SIZE: usize = 10;

/// `weight × sub-score` for each dimension.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WeightedComponents {
    pub druggability_weighted: f64,
    pub centrality_weighted: f64,
    pub pathway_weighted: f64,
    pub disease_weighted: f64,
}

impl WeightedComponents {
    pub fn total(&self) -> f64 {
        self.druggability_weighted + self.centrality_weighted + self.pathway_weighted + self.disease_weighted
    }
}

/// Final scored target result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetScoreRecord {
    pub protein_id: ProteinId,
    pub protein_name: String,
    pub final_score: f64,
    pub druggability_score: f64,
    pub centrality_score: f64,
    pub pathway_score: f64,
    pub disease_relevance_score: f64,
    pub confidence_score: f64,
    pub components: WeightedComponents,
    /// 1-based position after sorting.
    pub rank: usize,
}

pub struct TargetScorer {
    weights: ScoringWeights,
    report_size: usize,
}

impl TargetScorer {
    pub fn new(weights: ScoringWeights) -> Self {
        info!(?weights, "Initialized TargetScorer");
        Self { weights, report_size: DEFAULT_REPORT_SIZE }
    }

    pub fn from_config(config: &ScoringConfig) -> Result<Self> {
        Ok(Self::new(ScoringWeights::from_config(config)?).with_report_size(config.top_n))
    }

    pub fn with_report_size(mut self, top_n: usize) -> Self {
        self.report_size = top_n;
        self
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Apply a partial weight update and renormalise.
    pub fn adjust_scoring_weights(&mut self, overrides: &WeightOverrides) -> Result<()> {
        self.weights.adjust(overrides)?;
        info!(weights = ?self.weights, "Updated scoring weights");
        Ok(())
    }

    /// Score and rank `profiles`. Errored profiles are dropped; missing
    /// centrality, pathway or disease data counts as zero evidence.
    pub fn score_target_list(
        &self,
        profiles: &[ProteinProfile],
        centrality: &HashMap<ProteinId, CentralityRecord>,
        pathways: &HashMap<ProteinId, PathwayInvolvement>,
        diseases: &HashMap<ProteinId, Vec<String>>,
    ) -> Result<Vec<TargetScoreRecord>> {
        let mut records = Vec::with_capacity(profiles.len());

        for profile in profiles {
            if let Some(err) = &profile.error {
                debug!(protein = %profile.protein_id, error = %err, "Skipping errored profile");
                continue;
            }
            let network = centrality.get(&profile.protein_id).copied().unwrap_or_default();
            let involvement = pathways.get(&profile.protein_id).cloned().unwrap_or_default();
            let associations = diseases.get(&profile.protein_id).map(Vec::as_slice).unwrap_or(&[]);

            records.push(self.score_one(profile, &network, &involvement, associations)?);
        }

        // Vec::sort_by is stable, so equal scores keep input order.
        records.sort_by(|a, b| b.final_score.total_cmp(&a.final_score));
        for (i, record) in records.iter_mut().enumerate() {
            record.rank = i + 1;
        }

        info!(scored = records.len(), skipped = profiles.len() - records.len(), "Scored target list");
        Ok(records)
    }

    fn score_one(
        &self,
        profile: &ProteinProfile,
        network: &CentralityRecord,
        involvement: &PathwayInvolvement,
        associations: &[String],
    ) -> Result<TargetScoreRecord> {
        let druggability = druggability_subscore(profile.druggability_score)?;
        if !network.composite.is_finite() {
            return Err(ProtrankError::malformed(format!(
                "centrality composite for {} is not finite",
                profile.protein_id
            )));
        }
        let centrality = network.composite.clamp(0.0, 1.0);
        let pathway = pathway_subscore(involvement.count);
        let disease = disease_subscore(associations);

        let w = &self.weights;
        let components = WeightedComponents {
            druggability_weighted: w.druggability() * druggability,
            centrality_weighted: w.centrality() * centrality,
            pathway_weighted: w.pathway() * pathway,
            disease_weighted: w.disease() * disease,
        };

        let confidence = compute_confidence(&EvidenceSignals {
            has_external_id: profile.has_external_id(),
            has_function: profile.has_function(),
            binding_site_count: profile.binding_sites.len(),
            degree_centrality: network.degree,
            betweenness_centrality: network.betweenness,
            pathway_count: involvement.count,
            has_pathway_names: !involvement.names.is_empty(),
        });

        Ok(TargetScoreRecord {
            protein_id: profile.protein_id.clone(),
            protein_name: profile.protein_name.clone(),
            final_score: components.total().min(1.0),
            druggability_score: druggability,
            centrality_score: centrality,
            pathway_score: pathway,
            disease_relevance_score: disease,
            confidence_score: confidence,
            components,
            rank: 0,
        })
    }

    /// Summary statistics and a rounded top-N excerpt of a ranked list.
    pub fn create_scoring_report(&self, records: &[TargetScoreRecord]) -> ScoringReport {
        ScoringReport::build(records, &self.weights, self.report_size)
    }
}

impl Default for TargetScorer {
    fn default() -> Self {
        Self::new(ScoringWeights::default())
    }
}
