/// Evidence-presence confidence for a scored target.
/// Each present signal adds a fixed bonus once; the total is capped at 1.0.

pub const BONUS_EXTERNAL_ID: f64 = 0.20;
pub const BONUS_FUNCTION: f64 = 0.20;
pub const BONUS_BINDING_SITES: f64 = 0.10;
pub const BONUS_NETWORK_DEGREE: f64 = 0.15;
pub const BONUS_BETWEENNESS: f64 = 0.10;
pub const BONUS_PATHWAY_COUNT: f64 = 0.15;
pub const BONUS_PATHWAY_NAMES: f64 = 0.10;

/// Betweenness above this counts as a significant bridging position.
pub const BETWEENNESS_SIGNIFICANCE: f64 = 0.1;

/// Which pieces of supporting evidence exist for a target.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EvidenceSignals {
    pub has_external_id: bool,
    pub has_function: bool,
    pub binding_site_count: usize,
    pub degree_centrality: f64,
    pub betweenness_centrality: f64,
    pub pathway_count: u32,
    pub has_pathway_names: bool,
}

/// Sum the bonuses for the signals present. Returns a value in [0.0, 1.0].
pub fn compute_confidence(signals: &EvidenceSignals) -> f64 {
    let mut confidence = 0.0;

    // Protein annotation quality
    if signals.has_external_id {
        confidence += BONUS_EXTERNAL_ID;
    }
    if signals.has_function {
        confidence += BONUS_FUNCTION;
    }
    if signals.binding_site_count > 0 {
        confidence += BONUS_BINDING_SITES;
    }

    // Network evidence
    if signals.degree_centrality > 0.0 {
        confidence += BONUS_NETWORK_DEGREE;
    }
    if signals.betweenness_centrality > BETWEENNESS_SIGNIFICANCE {
        confidence += BONUS_BETWEENNESS;
    }

    // Pathway evidence
    if signals.pathway_count > 0 {
        confidence += BONUS_PATHWAY_COUNT;
    }
    if signals.has_pathway_names {
        confidence += BONUS_PATHWAY_NAMES;
    }

    confidence.min(1.0)
}
