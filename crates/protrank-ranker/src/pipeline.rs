//! End-to-end ranking for one disease query.
//!
//! Steps:
//!   1. (identify_and_rank only) disease → pathways → candidate proteins
//!   2. annotation per protein (profile, druggability, diseases, pathways)
//!   3. interaction network over the annotated proteins → centrality
//!   4. scoring, ranking, truncation, report
//!
//! Every collaborator call is paced by `request_delay_ms` and bounded by
//! `collaborator_timeout_secs`. Failed interaction fetches count as no
//! data; a failed profile fetch excludes that protein from scoring.

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use protrank_common::{
    PathwayInvolvement, PipelineConfig, ProteinId, ProteinProfile, ProtrankError, RawInteraction, Result,
};
use protrank_network::{InteractionGraphBuilder, NetworkAnalysis, NetworkAnalyzer};

use crate::providers::{AnnotationSource, InteractionSource, PathwaySource};
use crate::report::{DetailedReport, ScoringReport};
use crate::scorer::{TargetScoreRecord, TargetScorer};
use crate::weights::{ScoringWeights, WeightOverrides};

/// Extra inputs for [`PipelineOrchestrator::rank_targets_with`].
#[derive(Debug, Clone, Default)]
pub struct RankingRequest {
    /// Weights for this run only; the orchestrator's weights otherwise.
    pub weights: Option<ScoringWeights>,
    /// Disease query used to filter disease associations.
    pub disease: Option<String>,
    /// Precomputed pathway involvement. Replaces
    /// `fetch_pathway_membership` when present.
    pub pathways: Option<HashMap<ProteinId, PathwayInvolvement>>,
    /// Ranked records kept; the configured `max_targets` otherwise.
    pub max_targets: Option<usize>,
}

/// Output of one ranking run.
#[derive(Debug, Clone, Serialize)]
pub struct RankedTargets {
    pub disease: Option<String>,
    pub targets: Vec<TargetScoreRecord>,
    pub report: ScoringReport,
    /// Present when network analysis ran.
    pub network: Option<NetworkAnalysis>,
    /// Pathways the disease mapped to. Empty for explicit protein lists.
    pub pathways: Vec<String>,
}

impl RankedTargets {
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiseaseSummary {
    pub total_targets: usize,
    pub top_target: String,
    pub top_score: f64,
    pub avg_druggability: f64,
    pub avg_centrality: f64,
    pub targets: Vec<TargetScoreRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ComparisonOutcome {
    Ranked(DiseaseSummary),
    NoTargets,
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiseaseComparison {
    pub disease: String,
    pub outcome: ComparisonOutcome,
}

/// Records kept in a disease comparison summary.
const COMPARISON_EXCERPT: usize = 10;

/// Targets ranked per disease by [`PipelineOrchestrator::compare_diseases`]
/// unless the caller says otherwise.
pub const DEFAULT_COMPARISON_TARGETS: usize = 20;

/// Pathways described in a detailed report.
const REPORT_PATHWAYS: usize = 10;

pub struct PipelineOrchestrator {
    config: PipelineConfig,
    interactions: Arc<dyn InteractionSource>,
    annotations: Arc<dyn AnnotationSource>,
    pathways: Arc<dyn PathwaySource>,
    scorer: TargetScorer,
    analyzer: NetworkAnalyzer,
}

impl PipelineOrchestrator {
    pub fn new(
        config: PipelineConfig,
        interactions: Arc<dyn InteractionSource>,
        annotations: Arc<dyn AnnotationSource>,
        pathways: Arc<dyn PathwaySource>,
    ) -> Result<Self> {
        config.validate()?;
        let scorer = TargetScorer::from_config(&config.scoring)?;
        let analyzer = NetworkAnalyzer::new(&config.network);
        info!(
            max_targets = config.pipeline.max_targets,
            score_threshold = config.network.score_threshold,
            "Initialized PipelineOrchestrator"
        );
        Ok(Self { config, interactions, annotations, pathways, scorer, analyzer })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn weights(&self) -> &ScoringWeights {
        self.scorer.weights()
    }

    /// Apply a partial weight update to subsequent runs.
    pub fn recompute_weights(&mut self, overrides: &WeightOverrides) -> Result<ScoringWeights> {
        self.scorer.adjust_scoring_weights(overrides)?;
        Ok(*self.scorer.weights())
    }

    /// Rank `protein_ids` with `weights`, returning the ordered records.
    pub async fn rank_targets(&self, protein_ids: &[String], weights: &ScoringWeights) -> Result<Vec<TargetScoreRecord>> {
        let request = RankingRequest { weights: Some(*weights), ..Default::default() };
        Ok(self.rank_targets_with(protein_ids, request).await?.targets)
    }

    pub async fn rank_targets_with(&self, protein_ids: &[String], request: RankingRequest) -> Result<RankedTargets> {
        let ids = dedup_ids(protein_ids)?;
        let run_scorer = request
            .weights
            .map(|w| TargetScorer::new(w).with_report_size(self.config.scoring.top_n));
        let scorer = run_scorer.as_ref().unwrap_or(&self.scorer);

        info!(proteins = ids.len(), disease = ?request.disease, "Annotating proteins");
        let mut profiles = Vec::with_capacity(ids.len());
        for id in &ids {
            profiles.push(self.annotate(id).await);
        }
        let valid: Vec<&ProteinProfile> = profiles.iter().filter(|p| !p.is_errored()).collect();
        info!(valid = valid.len(), errored = profiles.len() - valid.len(), "Annotation complete");

        // disease associations, optionally filtered to the query
        let mut diseases = HashMap::new();
        for profile in &valid {
            let mut associations = match self
                .guarded("fetch_disease_associations", self.annotations.fetch_disease_associations(&profile.protein_id))
                .await
            {
                Ok(Some(list)) => list,
                Ok(None) => profile.diseases.clone(),
                Err(e) => {
                    warn!(protein = %profile.protein_id, error = %e, "Disease associations unavailable");
                    profile.diseases.clone()
                }
            };
            if self.config.pipeline.filter_disease_associations {
                if let Some(query) = &request.disease {
                    associations = filter_disease_associations(associations, query);
                }
            }
            diseases.insert(profile.protein_id.clone(), associations);
        }

        let pathways = match request.pathways {
            Some(pathways) => pathways,
            None => self.pathway_membership(&valid).await,
        };

        let network = if self.config.pipeline.include_network_analysis && !valid.is_empty() {
            Some(self.network_analysis(&valid).await?)
        } else {
            None
        };
        let centrality = network.as_ref().map(|n| n.centrality.to_map()).unwrap_or_default();

        let mut targets = scorer.score_target_list(&profiles, &centrality, &pathways, &diseases)?;
        targets.truncate(request.max_targets.unwrap_or(self.config.pipeline.max_targets));
        let report = scorer.create_scoring_report(&targets);

        info!(targets = targets.len(), "Ranking complete");
        Ok(RankedTargets { disease: request.disease, targets, report, network, pathways: vec![] })
    }

    /// Discover candidates for `disease` through its pathways and rank them.
    pub async fn identify_and_rank(&self, disease: &str) -> Result<RankedTargets> {
        self.identify_and_rank_limited(disease, self.config.pipeline.max_targets).await
    }

    /// [`identify_and_rank`](Self::identify_and_rank) keeping at most
    /// `max_targets` records, with up to twice as many candidates scored.
    pub async fn identify_and_rank_limited(&self, disease: &str, max_targets: usize) -> Result<RankedTargets> {
        info!(disease, max_targets, "Starting target identification");
        let empty = |pathways: Vec<String>| RankedTargets {
            disease: Some(disease.to_string()),
            targets: vec![],
            report: self.scorer.create_scoring_report(&[]),
            network: None,
            pathways,
        };

        let pathway_ids = self
            .guarded("pathways_for_disease", self.pathways.pathways_for_disease(disease))
            .await?
            .unwrap_or_default();
        if pathway_ids.is_empty() {
            warn!(disease, "No pathways found");
            return Ok(empty(vec![]));
        }
        info!(disease, pathways = pathway_ids.len(), "Mapped disease to pathways");

        let limit = self.config.pipeline.max_proteins_per_pathway;
        let mut order: Vec<ProteinId> = Vec::new();
        let mut involvement: HashMap<ProteinId, PathwayInvolvement> = HashMap::new();
        for pathway in &pathway_ids {
            let members = match self.guarded("proteins_in_pathway", self.pathways.proteins_in_pathway(pathway)).await {
                Ok(members) => members.unwrap_or_default(),
                Err(e) => {
                    warn!(pathway = %pathway, error = %e, "Skipping pathway");
                    continue;
                }
            };
            debug!(pathway = %pathway, proteins = members.len(), "Extracted pathway proteins");

            let mut seen_here = HashSet::new();
            for raw in members.iter().take(limit) {
                let id = ProteinId::parse(raw)?;
                if !seen_here.insert(id.clone()) {
                    continue;
                }
                let entry = involvement.entry(id.clone()).or_insert_with(|| {
                    order.push(id.clone());
                    PathwayInvolvement::default()
                });
                entry.record(pathway);
            }
        }
        info!(disease, unique_proteins = order.len(), "Collected candidate proteins");

        order.truncate(max_targets.saturating_mul(2));
        if order.is_empty() {
            warn!(disease, "No candidate proteins found");
            return Ok(empty(pathway_ids));
        }

        let candidates: Vec<String> = order.iter().map(|id| id.to_string()).collect();
        let request = RankingRequest {
            weights: None,
            disease: Some(disease.to_string()),
            pathways: Some(involvement),
            max_targets: Some(max_targets),
        };
        let mut ranked = self.rank_targets_with(&candidates, request).await?;
        ranked.pathways = pathway_ids;
        Ok(ranked)
    }

    /// Rank `disease` and describe the run: pathway details, an analysis
    /// summary, the top records and score distributions.
    pub async fn detailed_report(&self, disease: &str) -> Result<DetailedReport> {
        info!(disease, "Generating detailed report");
        let ranked = self.identify_and_rank(disease).await?;
        if ranked.is_empty() {
            return Ok(DetailedReport::no_targets(disease, ranked.pathways.len()));
        }

        let mut pathway_details = Vec::new();
        for pathway in ranked.pathways.iter().take(REPORT_PATHWAYS) {
            match self.guarded("pathway_info", self.pathways.pathway_info(pathway)).await {
                Ok(Some(info)) => pathway_details.push(info),
                Ok(None) => debug!(pathway = %pathway, "No pathway details"),
                Err(e) => warn!(pathway = %pathway, error = %e, "Pathway details unavailable"),
            }
        }

        Ok(DetailedReport::build(disease, ranked.pathways.len(), pathway_details, &ranked.targets))
    }

    /// Rank each disease with at most `max_targets` targets
    /// ([`DEFAULT_COMPARISON_TARGETS`] is the usual choice). A failing query
    /// is reported in its entry and never stops the others.
    pub async fn compare_diseases(&self, diseases: &[String], max_targets: usize) -> Vec<DiseaseComparison> {
        info!(?diseases, max_targets, "Comparing diseases");
        let mut comparisons = Vec::with_capacity(diseases.len());
        for disease in diseases {
            let outcome = match self.identify_and_rank_limited(disease, max_targets).await {
                Ok(ranked) if ranked.is_empty() => ComparisonOutcome::NoTargets,
                Ok(ranked) => ComparisonOutcome::Ranked(summarise(ranked.targets)),
                Err(e) => {
                    warn!(disease = %disease, error = %e, "Disease query failed");
                    ComparisonOutcome::Failed { error: e.to_string() }
                }
            };
            comparisons.push(DiseaseComparison { disease: disease.clone(), outcome });
        }
        comparisons
    }

    // ── Collaborator plumbing ────────────────────────────────────────────

    /// Pace and bound one collaborator call.
    async fn guarded<T, F>(&self, operation: &str, call: F) -> Result<Option<T>>
    where
        F: Future<Output = Result<Option<T>>>,
    {
        let delay = self.config.pipeline.request_delay_ms;
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        let secs = self.config.pipeline.collaborator_timeout_secs;
        match tokio::time::timeout(Duration::from_secs(secs), call).await {
            Ok(result) => result,
            Err(_) => Err(ProtrankError::Timeout { operation: operation.to_string(), secs }),
        }
    }

    /// Profile plus druggability. Any failure yields an errored profile.
    async fn annotate(&self, id: &ProteinId) -> ProteinProfile {
        let mut profile = match self.guarded("fetch_profile", self.annotations.fetch_profile(id)).await {
            Ok(Some(mut profile)) => {
                profile.protein_id = id.clone();
                profile
            }
            Ok(None) => ProteinProfile::new(id.clone(), id.to_string()),
            Err(e) => {
                warn!(protein = %id, error = %e, "Profile fetch failed");
                return ProteinProfile::errored(id.clone(), e.to_string());
            }
        };
        if profile.protein_name.is_empty() {
            profile.protein_name = id.to_string();
        }

        match self.guarded("fetch_druggability", self.annotations.fetch_druggability(id)).await {
            Ok(Some(score)) => profile.druggability_score = score,
            Ok(None) => debug!(protein = %id, "No druggability data"),
            Err(e) => {
                warn!(protein = %id, error = %e, "Druggability fetch failed");
                profile.error = Some(e.to_string());
            }
        }
        profile
    }

    async fn pathway_membership(&self, profiles: &[&ProteinProfile]) -> HashMap<ProteinId, PathwayInvolvement> {
        let mut pathways = HashMap::new();
        for profile in profiles {
            let id = &profile.protein_id;
            match self.guarded("fetch_pathway_membership", self.annotations.fetch_pathway_membership(id)).await {
                Ok(Some(count)) => {
                    pathways.insert(id.clone(), PathwayInvolvement::from(count));
                }
                Ok(None) => {}
                Err(e) => warn!(protein = %id, error = %e, "Pathway membership unavailable"),
            }
        }
        pathways
    }

    async fn network_analysis(&self, profiles: &[&ProteinProfile]) -> Result<NetworkAnalysis> {
        let threshold = self.config.network.score_threshold;
        let mut builder = InteractionGraphBuilder::new();

        for profile in profiles {
            let id = &profile.protein_id;
            let fetched = match self.guarded("fetch_interactions", self.interactions.fetch_interactions(id)).await {
                Ok(Some(list)) => list,
                Ok(None) => {
                    debug!(protein = %id, "No interactions found");
                    continue;
                }
                Err(e) => {
                    warn!(protein = %id, error = %e, "Interaction fetch failed, treating as no data");
                    continue;
                }
            };
            let kept = above_threshold(fetched, threshold)?;
            builder.add_target_interactions(id.as_str(), &kept)?;
        }

        let graph = builder.build();
        Ok(self.analyzer.analyze(&graph))
    }
}

/// Canonicalise and deduplicate, keeping first-seen order.
fn dedup_ids(raw: &[String]) -> Result<Vec<ProteinId>> {
    let mut seen = HashSet::new();
    let mut ids = Vec::with_capacity(raw.len());
    for r in raw {
        let id = ProteinId::parse(r)?;
        if seen.insert(id.clone()) {
            ids.push(id);
        }
    }
    Ok(ids)
}

/// Drop interactions below `threshold`. Out-of-range scores are rejected
/// rather than filtered.
fn above_threshold(interactions: Vec<RawInteraction>, threshold: i64) -> Result<Vec<RawInteraction>> {
    let mut kept = Vec::with_capacity(interactions.len());
    for interaction in interactions {
        interaction.normalized_weight()?;
        if interaction.score >= threshold {
            kept.push(interaction);
        }
    }
    Ok(kept)
}

/// Keep `associations` only if any of them mentions `disease`
/// (case-insensitive); otherwise none are relevant.
pub fn filter_disease_associations(associations: Vec<String>, disease: &str) -> Vec<String> {
    let joined = associations.join(" ").to_lowercase();
    if joined.contains(&disease.to_lowercase()) {
        associations
    } else {
        vec![]
    }
}

fn summarise(targets: Vec<TargetScoreRecord>) -> DiseaseSummary {
    let n = targets.len() as f64;
    let avg = |f: fn(&TargetScoreRecord) -> f64| targets.iter().map(f).sum::<f64>() / n;
    DiseaseSummary {
        total_targets: targets.len(),
        top_target: targets.first().map(|t| t.protein_name.clone()).unwrap_or_default(),
        top_score: targets.first().map(|t| t.final_score).unwrap_or_default(),
        avg_druggability: avg(|t| t.druggability_score),
        avg_centrality: avg(|t| t.centrality_score),
        targets: targets.iter().take(COMPARISON_EXCERPT).cloned().collect(),
    }
}
