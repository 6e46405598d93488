//! Fixture builders shared by the protrank crates' tests.

use protrank_common::{ProteinId, ProteinProfile, RawInteraction};

/// Interaction list for one query protein from `(partner, score)` pairs.
pub fn interactions(pairs: &[(&str, i64)]) -> Vec<RawInteraction> {
    pairs.iter().map(|&(partner, score)| RawInteraction::new(partner, score)).collect()
}

/// Start building a profile for `id`. The name defaults to the id.
///
/// Panics if `id` cleans to an empty identifier.
pub fn profile(id: &str) -> ProfileBuilder {
    let protein_id = ProteinId::parse(id).expect("fixture protein id must be valid");
    let name = protein_id.to_string();
    ProfileBuilder { profile: ProteinProfile::new(protein_id, name) }
}

pub struct ProfileBuilder {
    profile: ProteinProfile,
}

impl ProfileBuilder {
    pub fn name(mut self, name: &str) -> Self {
        self.profile.protein_name = name.to_string();
        self
    }

    pub fn druggability(mut self, score: f64) -> Self {
        self.profile.druggability_score = score;
        self
    }

    pub fn uniprot(mut self, accession: &str) -> Self {
        self.profile.uniprot_id = Some(accession.to_string());
        self
    }

    pub fn function(mut self, description: &str) -> Self {
        self.profile.function = Some(description.to_string());
        self
    }

    pub fn binding_sites(mut self, sites: &[&str]) -> Self {
        self.profile.binding_sites = sites.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn diseases(mut self, diseases: &[&str]) -> Self {
        self.profile.diseases = diseases.iter().map(|d| d.to_string()).collect();
        self
    }

    pub fn errored(mut self, message: &str) -> Self {
        self.profile.error = Some(message.to_string());
        self
    }

    pub fn build(self) -> ProteinProfile {
        self.profile
    }
}

/// Small p53/EGFR signalling network as `(a, b, score)` triples: two dense
/// modules joined by one weak MDM2–EGFR link.
pub const SIGNALLING_EDGES: &[(&str, &str, i64)] = &[
    ("TP53", "MDM2", 999),
    ("TP53", "ATM", 950),
    ("ATM", "CHEK2", 900),
    ("TP53", "CHEK2", 880),
    ("EGFR", "ERBB2", 900),
    ("EGFR", "GRB2", 850),
    ("GRB2", "SOS1", 800),
    ("ERBB2", "GRB2", 760),
    ("MDM2", "EGFR", 450),
];
