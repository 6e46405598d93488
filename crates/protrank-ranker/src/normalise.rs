//! Sub-score normalisation functions.
//! Each maps one evidence signal onto [0, 1].

use protrank_common::{ProtrankError, Result};

/// Associations needed for a full disease sub-score.
pub const DISEASE_SATURATION: f64 = 5.0;

/// Druggability arrives already scaled by its source. Finite values are
/// clamped into [0, 1]; NaN or infinity is a contract violation.
pub fn druggability_subscore(raw: f64) -> Result<f64> {
    if !raw.is_finite() {
        return Err(ProtrankError::malformed(format!("druggability score is not finite: {raw}")));
    }
    Ok(raw.clamp(0.0, 1.0))
}

/// `min(log10(count + 1), 1.0)`, exactly 0.0 for no pathways.
/// Nine pathways already saturate the score.
pub fn pathway_subscore(pathway_count: u32) -> f64 {
    if pathway_count == 0 {
        return 0.0;
    }
    (f64::from(pathway_count) + 1.0).log10().min(1.0)
}

/// Linear in the number of associations up to five, capped thereafter.
pub fn disease_subscore(associations: &[String]) -> f64 {
    (associations.len() as f64 / DISEASE_SATURATION).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diseases(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("disease-{i}")).collect()
    }

    #[test]
    fn test_pathway_subscore() {
        assert_eq!(pathway_subscore(0), 0.0);
        assert!((pathway_subscore(1) - 2f64.log10()).abs() < 1e-12);
        assert!((pathway_subscore(9) - 1.0).abs() < 1e-12);
        assert_eq!(pathway_subscore(500), 1.0);
    }

    #[test]
    fn test_pathway_subscore_is_monotonic() {
        let scores: Vec<f64> = (0..20).map(pathway_subscore).collect();
        assert!(scores.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_disease_subscore() {
        assert_eq!(disease_subscore(&[]), 0.0);
        assert!((disease_subscore(&diseases(2)) - 0.4).abs() < 1e-12);
        assert_eq!(disease_subscore(&diseases(5)), 1.0);
        assert_eq!(disease_subscore(&diseases(10)), 1.0);
    }

    #[test]
    fn test_druggability_clamped() {
        assert_eq!(druggability_subscore(0.73).unwrap(), 0.73);
        assert_eq!(druggability_subscore(1.4).unwrap(), 1.0);
        assert_eq!(druggability_subscore(-0.2).unwrap(), 0.0);
    }

    #[test]
    fn test_druggability_non_finite_rejected() {
        assert!(druggability_subscore(f64::NAN).unwrap_err().is_malformed_input());
        assert!(druggability_subscore(f64::INFINITY).is_err());
    }
}
