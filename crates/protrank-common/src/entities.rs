/// Core value types passed between pipeline stages.
/// Every stage consumes and produces these explicit records; nothing is keyed by untyped strings.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

use crate::error::{ProtrankError, Result};

/// Upper bound of the raw STRING-style interaction confidence.
pub const MAX_RAW_INTERACTION_SCORE: i64 = 1000;

// ---------------------------------------------------------------------------
// Protein identifiers
// ---------------------------------------------------------------------------

/// Clean a raw protein identifier.
///
/// Drops any colon-delimited namespace prefix (`UniProtKB:P04637` → `P04637`),
/// strips the `_HUMAN` species suffix in any case, trims whitespace and
/// upper-cases the result. Applying it twice gives the same result as once.
pub fn canonical_protein_id(raw: &str) -> String {
    let trimmed = raw.trim();
    let unprefixed = trimmed.rsplit(':').next().unwrap_or(trimmed);
    let mut id = unprefixed.trim().to_ascii_uppercase();
    while let Some(stripped) = id.strip_suffix("_HUMAN") {
        id = stripped.trim_end().to_string();
    }
    id.trim().to_string()
}

/// Canonical protein identifier. Two raw ids that clean to the same string
/// name the same protein node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProteinId(String);

impl ProteinId {
    /// Canonicalise `raw`; an identifier that cleans to nothing is rejected.
    pub fn parse(raw: &str) -> Result<Self> {
        let id = canonical_protein_id(raw);
        if id.is_empty() {
            return Err(ProtrankError::malformed(format!(
                "protein identifier {raw:?} is empty after cleaning"
            )));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProteinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ProteinId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ProteinId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ProteinId {
    type Error = ProtrankError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<ProteinId> for String {
    fn from(id: ProteinId) -> Self {
        id.0
    }
}

// ---------------------------------------------------------------------------
// Interactions
// ---------------------------------------------------------------------------

/// One interaction as reported by a PPI source for a query protein.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawInteraction {
    /// Partner identifier as the source spells it (cleaned later).
    pub partner: String,
    /// Source confidence, 0–1000.
    pub score: i64,
}

impl RawInteraction {
    pub fn new(partner: impl Into<String>, score: i64) -> Self {
        Self { partner: partner.into(), score }
    }

    /// Convert the raw score to an edge weight in [0, 1].
    /// Scores outside 0–1000 are a source contract violation.
    pub fn normalized_weight(&self) -> Result<f64> {
        if !(0..=MAX_RAW_INTERACTION_SCORE).contains(&self.score) {
            return Err(ProtrankError::malformed(format!(
                "interaction score {} for partner {:?} is outside 0..={MAX_RAW_INTERACTION_SCORE}",
                self.score, self.partner
            )));
        }
        Ok(self.score as f64 / MAX_RAW_INTERACTION_SCORE as f64)
    }
}

// ---------------------------------------------------------------------------
// Protein annotation
// ---------------------------------------------------------------------------

/// Per-protein annotation assembled from the annotation collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProteinProfile {
    pub protein_id: ProteinId,
    #[serde(default)]
    pub protein_name: String,
    /// Externally computed druggability, expected in [0, 1].
    #[serde(default)]
    pub druggability_score: f64,
    /// External database accession (UniProt).
    #[serde(default)]
    pub uniprot_id: Option<String>,
    #[serde(default)]
    pub function: Option<String>,
    #[serde(default)]
    pub binding_sites: Vec<String>,
    #[serde(default)]
    pub diseases: Vec<String>,
    /// Set when the upstream collaborator failed for this protein.
    /// Flagged profiles are never scored.
    #[serde(default)]
    pub error: Option<String>,
}

impl ProteinProfile {
    pub fn new(protein_id: ProteinId, protein_name: impl Into<String>) -> Self {
        Self {
            protein_id,
            protein_name: protein_name.into(),
            druggability_score: 0.0,
            uniprot_id: None,
            function: None,
            binding_sites: vec![],
            diseases: vec![],
            error: None,
        }
    }

    /// Profile carrying an upstream error marker.
    pub fn errored(protein_id: ProteinId, message: impl Into<String>) -> Self {
        let name = protein_id.to_string();
        Self { error: Some(message.into()), ..Self::new(protein_id, name) }
    }

    pub fn is_errored(&self) -> bool {
        self.error.is_some()
    }

    pub fn has_function(&self) -> bool {
        self.function.as_deref().is_some_and(|f| !f.trim().is_empty())
    }

    pub fn has_external_id(&self) -> bool {
        self.uniprot_id.as_deref().is_some_and(|id| !id.trim().is_empty())
    }
}

// ---------------------------------------------------------------------------
// Pathway involvement
// ---------------------------------------------------------------------------

/// Disease-relevant pathways a protein participates in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathwayInvolvement {
    pub count: u32,
    #[serde(default)]
    pub names: Vec<String>,
}

impl PathwayInvolvement {
    pub fn named(names: Vec<String>) -> Self {
        Self { count: names.len() as u32, names }
    }

    pub fn record(&mut self, pathway: &str) {
        self.count += 1;
        self.names.push(pathway.to_string());
    }
}

impl From<u32> for PathwayInvolvement {
    fn from(count: u32) -> Self {
        Self { count, names: vec![] }
    }
}
