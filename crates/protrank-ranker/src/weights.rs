//! Weight vector for target prioritization scoring.

use serde::{Deserialize, Serialize};

use protrank_common::{ProtrankError, Result, ScoringConfig};

/// The 4-component weight vector.
/// Always renormalised so the weights sum to 1.0; deserialised values go
/// through [`ScoringWeights::new`] as well.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawWeights")]
pub struct ScoringWeights {
    /// Druggability (binding pockets, tractability)
    druggability: f64,
    /// Network centrality composite
    centrality: f64,
    /// Disease-relevant pathway involvement
    pathway: f64,
    /// Disease association count
    disease: f64,
}

/// Weights as written by a caller, before renormalisation.
#[derive(Deserialize)]
struct RawWeights {
    druggability: f64,
    centrality: f64,
    pathway: f64,
    disease: f64,
}

impl TryFrom<RawWeights> for ScoringWeights {
    type Error = ProtrankError;

    fn try_from(raw: RawWeights) -> Result<Self> {
        Self::new(raw.druggability, raw.centrality, raw.pathway, raw.disease)
    }
}

/// Partial update for [`ScoringWeights::adjust`]. `None` keeps the
/// current value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WeightOverrides {
    pub druggability: Option<f64>,
    pub centrality: Option<f64>,
    pub pathway: Option<f64>,
    pub disease: Option<f64>,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            druggability: 0.4,
            centrality:   0.3,
            pathway:      0.2,
            disease:      0.1,
        }
    }
}

impl ScoringWeights {
    /// Build from raw non-negative weights, renormalising to sum 1.0.
    pub fn new(druggability: f64, centrality: f64, pathway: f64, disease: f64) -> Result<Self> {
        let raw = [druggability, centrality, pathway, disease];
        let sum = check_raw(&raw)?;
        Ok(Self {
            druggability: druggability / sum,
            centrality: centrality / sum,
            pathway: pathway / sum,
            disease: disease / sum,
        })
    }

    pub fn from_config(config: &ScoringConfig) -> Result<Self> {
        Self::new(config.druggability, config.centrality, config.pathway, config.disease)
    }

    /// Apply the provided overrides, then renormalise all four. On error
    /// the weights are left unchanged.
    pub fn adjust(&mut self, overrides: &WeightOverrides) -> Result<()> {
        *self = Self::new(
            overrides.druggability.unwrap_or(self.druggability),
            overrides.centrality.unwrap_or(self.centrality),
            overrides.pathway.unwrap_or(self.pathway),
            overrides.disease.unwrap_or(self.disease),
        )?;
        Ok(())
    }

    pub fn druggability(&self) -> f64 {
        self.druggability
    }

    pub fn centrality(&self) -> f64 {
        self.centrality
    }

    pub fn pathway(&self) -> f64 {
        self.pathway
    }

    pub fn disease(&self) -> f64 {
        self.disease
    }

    /// Validate that all weights sum to ~1.0
    pub fn validate(&self) -> bool {
        (self.as_array().iter().sum::<f64>() - 1.0).abs() < 1e-9
    }

    /// Convert to array for iteration.
    pub fn as_array(&self) -> [f64; 4] {
        [self.druggability, self.centrality, self.pathway, self.disease]
    }
}

fn check_raw(raw: &[f64; 4]) -> Result<f64> {
    if raw.iter().any(|w| !w.is_finite() || *w < 0.0) {
        return Err(ProtrankError::malformed(format!(
            "scoring weights must be finite and non-negative, got {raw:?}"
        )));
    }
    let sum: f64 = raw.iter().sum();
    if sum <= 0.0 {
        return Err(ProtrankError::malformed("scoring weights sum to zero"));
    }
    Ok(sum)
}

impl WeightOverrides {
    pub fn is_empty(&self) -> bool {
        self.druggability.is_none()
            && self.centrality.is_none()
            && self.pathway.is_none()
            && self.disease.is_none()
    }
}
