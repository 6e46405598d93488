//! Collaborator traits for the data the ranker consumes.
//!
//! The ranker never talks to a biomedical database itself. Interaction,
//! annotation and pathway data come through these traits so the pipeline
//! can run against a remote service, a local snapshot, or test data.
//!
//! Every call returns `Ok(Some(_))` on success, `Ok(None)` when the source
//! has no data for the query, and `Err` when the source itself failed.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use protrank_common::{canonical_protein_id, ProteinId, ProteinProfile, ProtrankError, RawInteraction, Result};

/// Protein-protein interaction source (STRING-like).
#[async_trait]
pub trait InteractionSource: Send + Sync {
    /// Interaction partners of `protein` with their raw 0–1000 scores.
    async fn fetch_interactions(&self, protein: &ProteinId) -> Result<Option<Vec<RawInteraction>>>;
}

/// Per-protein annotation source (UniProt, druggability predictors).
#[async_trait]
pub trait AnnotationSource: Send + Sync {
    async fn fetch_profile(&self, protein: &ProteinId) -> Result<Option<ProteinProfile>>;

    /// Druggability in [0, 1].
    async fn fetch_druggability(&self, protein: &ProteinId) -> Result<Option<f64>>;

    /// Number of disease-relevant pathways the protein belongs to.
    async fn fetch_pathway_membership(&self, protein: &ProteinId) -> Result<Option<u32>>;

    async fn fetch_disease_associations(&self, protein: &ProteinId) -> Result<Option<Vec<String>>>;
}

/// Disease-to-pathway and pathway-to-protein mapping (KEGG/Reactome-like).
#[async_trait]
pub trait PathwaySource: Send + Sync {
    async fn pathways_for_disease(&self, disease: &str) -> Result<Option<Vec<String>>>;

    /// Raw protein identifiers in pathway order.
    async fn proteins_in_pathway(&self, pathway: &str) -> Result<Option<Vec<String>>>;

    /// Descriptive details for a pathway. Sources without them answer
    /// `None`.
    async fn pathway_info(&self, _pathway: &str) -> Result<Option<PathwayInfo>> {
        Ok(None)
    }
}

/// Pathway details as reported by a [`PathwaySource`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathwayInfo {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Database the pathway comes from (KEGG, Reactome).
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub protein_count: usize,
}

// ── Static dataset ─────────────────────────────────────────────────────────

/// One undirected interaction in a dataset file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetInteraction {
    pub protein_a: String,
    pub protein_b: String,
    pub score: i64,
}

/// In-memory snapshot implementing all three collaborator traits.
/// Loaded from JSON:
///
/// ```json
/// {
///   "proteins": [{ "protein_id": "EGFR", "druggability_score": 0.9 }],
///   "interactions": [{ "protein_a": "EGFR", "protein_b": "GRB2", "score": 999 }],
///   "pathways": { "hsa04012": ["EGFR", "GRB2"] },
///   "diseases": { "lung cancer": ["hsa04012"] },
///   "pathway_info": { "hsa04012": { "name": "ErbB signaling pathway", "source": "kegg" } }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StaticDataset {
    #[serde(default)]
    pub proteins: Vec<ProteinProfile>,
    #[serde(default)]
    pub interactions: Vec<DatasetInteraction>,
    /// Pathway id → member protein ids.
    #[serde(default)]
    pub pathways: BTreeMap<String, Vec<String>>,
    /// Disease name → pathway ids, in relevance order.
    #[serde(default)]
    pub diseases: BTreeMap<String, Vec<String>>,
    /// Optional pathway descriptions, keyed by pathway id.
    #[serde(default)]
    pub pathway_info: BTreeMap<String, PathwayInfo>,
}

impl StaticDataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn with_profile(mut self, profile: ProteinProfile) -> Self {
        self.proteins.push(profile);
        self
    }

    pub fn with_interaction(mut self, a: &str, b: &str, score: i64) -> Self {
        self.interactions.push(DatasetInteraction {
            protein_a: a.to_string(),
            protein_b: b.to_string(),
            score,
        });
        self
    }

    pub fn with_pathway(mut self, pathway: &str, proteins: &[&str]) -> Self {
        self.pathways
            .insert(pathway.to_string(), proteins.iter().map(|p| p.to_string()).collect());
        self
    }

    pub fn with_disease(mut self, disease: &str, pathways: &[&str]) -> Self {
        self.diseases
            .insert(disease.to_string(), pathways.iter().map(|p| p.to_string()).collect());
        self
    }

    pub fn with_pathway_info(mut self, pathway: &str, name: &str, source: &str) -> Self {
        let info = PathwayInfo {
            name: Some(name.to_string()),
            source: Some(source.to_string()),
            ..Default::default()
        };
        self.pathway_info.insert(pathway.to_string(), info);
        self
    }

    fn profile(&self, protein: &ProteinId) -> Option<&ProteinProfile> {
        self.proteins.iter().find(|p| &p.protein_id == protein)
    }
}

#[async_trait]
impl InteractionSource for StaticDataset {
    async fn fetch_interactions(&self, protein: &ProteinId) -> Result<Option<Vec<RawInteraction>>> {
        let partners: Vec<RawInteraction> = self
            .interactions
            .iter()
            .filter_map(|i| {
                if canonical_protein_id(&i.protein_a) == protein.as_str() {
                    Some(RawInteraction::new(&i.protein_b, i.score))
                } else if canonical_protein_id(&i.protein_b) == protein.as_str() {
                    Some(RawInteraction::new(&i.protein_a, i.score))
                } else {
                    None
                }
            })
            .collect();
        Ok((!partners.is_empty()).then_some(partners))
    }
}

#[async_trait]
impl AnnotationSource for StaticDataset {
    async fn fetch_profile(&self, protein: &ProteinId) -> Result<Option<ProteinProfile>> {
        Ok(self.profile(protein).cloned())
    }

    async fn fetch_druggability(&self, protein: &ProteinId) -> Result<Option<f64>> {
        Ok(self.profile(protein).map(|p| p.druggability_score))
    }

    async fn fetch_pathway_membership(&self, protein: &ProteinId) -> Result<Option<u32>> {
        let count = self
            .pathways
            .values()
            .filter(|members| members.iter().any(|m| canonical_protein_id(m) == protein.as_str()))
            .count() as u32;
        Ok((count > 0).then_some(count))
    }

    async fn fetch_disease_associations(&self, protein: &ProteinId) -> Result<Option<Vec<String>>> {
        Ok(self
            .profile(protein)
            .filter(|p| !p.diseases.is_empty())
            .map(|p| p.diseases.clone()))
    }
}

#[async_trait]
impl PathwaySource for StaticDataset {
    async fn pathways_for_disease(&self, disease: &str) -> Result<Option<Vec<String>>> {
        let query = disease.trim().to_lowercase();
        Ok(self
            .diseases
            .iter()
            .find(|(name, _)| name.to_lowercase() == query)
            .map(|(_, pathways)| pathways.clone()))
    }

    async fn proteins_in_pathway(&self, pathway: &str) -> Result<Option<Vec<String>>> {
        Ok(self.pathways.get(pathway).cloned())
    }

    async fn pathway_info(&self, pathway: &str) -> Result<Option<PathwayInfo>> {
        let members = self.pathways.get(pathway);
        let described = self.pathway_info.get(pathway);
        if members.is_none() && described.is_none() {
            return Ok(None);
        }
        let mut info = described.cloned().unwrap_or_default();
        info.id = pathway.to_string();
        info.protein_count = members.map_or(0, Vec::len);
        Ok(Some(info))
    }
}

// ── Failing source for tests ───────────────────────────────────────────────

/// Source whose every call fails. Use with `with_*` to fail only some
/// proteins while delegating the rest to a dataset.
pub struct FailingSource {
    fallback: StaticDataset,
    failing: Vec<String>,
    fail_all: bool,
}

impl FailingSource {
    pub fn new() -> Self {
        Self { fallback: StaticDataset::new(), failing: vec![], fail_all: true }
    }

    /// Fail only for `proteins`, answer the rest from `dataset`.
    pub fn for_proteins(dataset: StaticDataset, proteins: &[&str]) -> Self {
        Self {
            fallback: dataset,
            failing: proteins.iter().map(|p| canonical_protein_id(p)).collect(),
            fail_all: false,
        }
    }

    fn fails(&self, key: &str) -> bool {
        self.fail_all || self.failing.iter().any(|f| f == key)
    }

    fn error(key: &str) -> ProtrankError {
        ProtrankError::upstream("failing-source", format!("simulated failure for {key}"))
    }
}

impl Default for FailingSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InteractionSource for FailingSource {
    async fn fetch_interactions(&self, protein: &ProteinId) -> Result<Option<Vec<RawInteraction>>> {
        if self.fails(protein.as_str()) {
            return Err(Self::error(protein.as_str()));
        }
        self.fallback.fetch_interactions(protein).await
    }
}

#[async_trait]
impl AnnotationSource for FailingSource {
    async fn fetch_profile(&self, protein: &ProteinId) -> Result<Option<ProteinProfile>> {
        if self.fails(protein.as_str()) {
            return Err(Self::error(protein.as_str()));
        }
        self.fallback.fetch_profile(protein).await
    }

    async fn fetch_druggability(&self, protein: &ProteinId) -> Result<Option<f64>> {
        if self.fails(protein.as_str()) {
            return Err(Self::error(protein.as_str()));
        }
        self.fallback.fetch_druggability(protein).await
    }

    async fn fetch_pathway_membership(&self, protein: &ProteinId) -> Result<Option<u32>> {
        if self.fails(protein.as_str()) {
            return Err(Self::error(protein.as_str()));
        }
        self.fallback.fetch_pathway_membership(protein).await
    }

    async fn fetch_disease_associations(&self, protein: &ProteinId) -> Result<Option<Vec<String>>> {
        if self.fails(protein.as_str()) {
            return Err(Self::error(protein.as_str()));
        }
        self.fallback.fetch_disease_associations(protein).await
    }
}

#[async_trait]
impl PathwaySource for FailingSource {
    async fn pathways_for_disease(&self, disease: &str) -> Result<Option<Vec<String>>> {
        if self.fail_all {
            return Err(Self::error(disease));
        }
        self.fallback.pathways_for_disease(disease).await
    }

    async fn proteins_in_pathway(&self, pathway: &str) -> Result<Option<Vec<String>>> {
        if self.fails(pathway) {
            return Err(Self::error(pathway));
        }
        self.fallback.proteins_in_pathway(pathway).await
    }

    async fn pathway_info(&self, pathway: &str) -> Result<Option<PathwayInfo>> {
        if self.fails(pathway) {
            return Err(Self::error(pathway));
        }
        self.fallback.pathway_info(pathway).await
    }
}
