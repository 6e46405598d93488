//! Scoring report: distribution statistics and a rounded top-N excerpt.

use chrono::{DateTime, Local};
use serde::Serialize;

use protrank_common::ProteinId;

use crate::providers::PathwayInfo;
use crate::scorer::TargetScoreRecord;
use crate::weights::ScoringWeights;

/// Records listed in a detailed report.
const DETAILED_TOP_TARGETS: usize = 10;

/// Distribution of one score column. `std` is the population deviation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreStatistics {
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

impl ScoreStatistics {
    /// `None` for an empty slice.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        let mid = sorted.len() / 2;
        let median = if sorted.len() % 2 == 0 {
            (sorted[mid - 1] + sorted[mid]) / 2.0
        } else {
            sorted[mid]
        };

        Some(Self {
            mean,
            median,
            std: variance.sqrt(),
            min: sorted[0],
            max: sorted[sorted.len() - 1],
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReportStatistics {
    pub final_score: ScoreStatistics,
    pub druggability: ScoreStatistics,
    pub centrality: ScoreStatistics,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSummary {
    pub total_targets: usize,
    pub top_score: Option<f64>,
    pub top_target: Option<String>,
    pub avg_score: Option<f64>,
    pub scoring_weights: ScoringWeights,
}

/// One row of the excerpt, sub-scores rounded to 3 decimals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportTarget {
    pub rank: usize,
    pub protein_id: ProteinId,
    pub protein_name: String,
    pub final_score: f64,
    pub druggability_score: f64,
    pub centrality_score: f64,
    pub pathway_score: f64,
    pub disease_score: f64,
    pub confidence_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoringReport {
    pub summary: ReportSummary,
    pub top_targets: Vec<ReportTarget>,
    /// Absent when there was nothing to score.
    pub statistics: Option<ReportStatistics>,
}

pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

impl ScoringReport {
    pub fn build(records: &[TargetScoreRecord], weights: &ScoringWeights, top_n: usize) -> Self {
        let column = |f: fn(&TargetScoreRecord) -> f64| records.iter().map(f).collect::<Vec<_>>();

        let statistics = match (
            ScoreStatistics::from_values(&column(|r| r.final_score)),
            ScoreStatistics::from_values(&column(|r| r.druggability_score)),
            ScoreStatistics::from_values(&column(|r| r.centrality_score)),
        ) {
            (Some(final_score), Some(druggability), Some(centrality)) => {
                Some(ReportStatistics { final_score, druggability, centrality })
            }
            _ => None,
        };

        let top = records.first();
        let summary = ReportSummary {
            total_targets: records.len(),
            top_score: top.map(|r| r.final_score),
            top_target: top.map(|r| r.protein_name.clone()),
            avg_score: statistics.map(|s| s.final_score.mean),
            scoring_weights: *weights,
        };

        let top_targets = records
            .iter()
            .take(top_n)
            .map(|r| ReportTarget {
                rank: r.rank,
                protein_id: r.protein_id.clone(),
                protein_name: r.protein_name.clone(),
                final_score: round3(r.final_score),
                druggability_score: round3(r.druggability_score),
                centrality_score: round3(r.centrality_score),
                pathway_score: round3(r.pathway_score),
                disease_score: round3(r.disease_relevance_score),
                confidence_score: round3(r.confidence_score),
            })
            .collect();

        Self { summary, top_targets, statistics }
    }
}

// ── Detailed report ─────────────────────────────────────────────────────────

/// Distribution of one score column. `std` is the sample deviation and is
/// absent for fewer than two values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreDistribution {
    pub mean: f64,
    pub std: Option<f64>,
    pub min: f64,
    pub max: f64,
}

impl ScoreDistribution {
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let std = (values.len() > 1)
            .then(|| (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt());
        Some(Self {
            mean,
            std,
            min: values.iter().copied().fold(f64::INFINITY, f64::min),
            max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisSummary {
    pub total_pathways_found: usize,
    pub total_targets_analyzed: usize,
    pub top_target: Option<String>,
    pub top_score: Option<f64>,
    pub avg_druggability_score: Option<f64>,
    pub avg_centrality_score: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DetailedStatistics {
    pub final_score_distribution: ScoreDistribution,
    pub druggability_distribution: ScoreDistribution,
}

/// Full account of one disease query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailedReport {
    pub disease: String,
    pub timestamp: DateTime<Local>,
    /// Set when the query ranked nothing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub analysis_summary: AnalysisSummary,
    pub pathway_details: Vec<PathwayInfo>,
    pub top_targets: Vec<TargetScoreRecord>,
    pub scoring_statistics: Option<DetailedStatistics>,
}

impl DetailedReport {
    pub fn no_targets(disease: &str, pathways_found: usize) -> Self {
        Self {
            disease: disease.to_string(),
            timestamp: Local::now(),
            error: Some("No targets found".to_string()),
            analysis_summary: AnalysisSummary {
                total_pathways_found: pathways_found,
                total_targets_analyzed: 0,
                top_target: None,
                top_score: None,
                avg_druggability_score: None,
                avg_centrality_score: None,
            },
            pathway_details: vec![],
            top_targets: vec![],
            scoring_statistics: None,
        }
    }

    /// `records` must already be ranked.
    pub fn build(
        disease: &str,
        pathways_found: usize,
        pathway_details: Vec<PathwayInfo>,
        records: &[TargetScoreRecord],
    ) -> Self {
        if records.is_empty() {
            return Self { pathway_details, ..Self::no_targets(disease, pathways_found) };
        }
        let column = |f: fn(&TargetScoreRecord) -> f64| records.iter().map(f).collect::<Vec<_>>();
        let final_scores = ScoreDistribution::from_values(&column(|r| r.final_score));
        let druggability = ScoreDistribution::from_values(&column(|r| r.druggability_score));
        let centrality = ScoreDistribution::from_values(&column(|r| r.centrality_score));

        let top = records.first();
        Self {
            disease: disease.to_string(),
            timestamp: Local::now(),
            error: None,
            analysis_summary: AnalysisSummary {
                total_pathways_found: pathways_found,
                total_targets_analyzed: records.len(),
                top_target: top.map(|r| r.protein_name.clone()),
                top_score: top.map(|r| r.final_score),
                avg_druggability_score: druggability.map(|d| d.mean),
                avg_centrality_score: centrality.map(|c| c.mean),
            },
            pathway_details,
            top_targets: records.iter().take(DETAILED_TOP_TARGETS).cloned().collect(),
            scoring_statistics: match (final_scores, druggability) {
                (Some(final_score_distribution), Some(druggability_distribution)) => Some(DetailedStatistics {
                    final_score_distribution,
                    druggability_distribution,
                }),
                _ => None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scorer::WeightedComponents;
    use pretty_assertions::assert_eq;

    fn record(rank: usize, name: &str, final_score: f64, druggability: f64, centrality: f64) -> TargetScoreRecord {
        TargetScoreRecord {
            protein_id: ProteinId::parse(name).unwrap(),
            protein_name: format!("{name} protein"),
            final_score,
            druggability_score: druggability,
            centrality_score: centrality,
            pathway_score: 0.12345,
            disease_relevance_score: 0.4,
            confidence_score: 0.65,
            components: WeightedComponents::default(),
            rank,
        }
    }

    #[test]
    fn test_statistics_odd_and_even() {
        let odd = ScoreStatistics::from_values(&[0.3, 0.1, 0.2]).unwrap();
        assert!((odd.median - 0.2).abs() < 1e-12);
        assert!((odd.mean - 0.2).abs() < 1e-12);
        assert_eq!(odd.min, 0.1);
        assert_eq!(odd.max, 0.3);

        let even = ScoreStatistics::from_values(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert!((even.median - 2.5).abs() < 1e-12);
        // population std of 1..4
        assert!((even.std - 1.25f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_empty_report() {
        let report = ScoringReport::build(&[], &ScoringWeights::default(), 10);
        assert_eq!(report.summary.total_targets, 0);
        assert_eq!(report.summary.top_target, None);
        assert!(report.statistics.is_none());
        assert!(report.top_targets.is_empty());
    }

    #[test]
    fn test_report_excerpt_rounded_and_truncated() {
        let records: Vec<_> = (0..12)
            .map(|i| record(i + 1, &format!("P{i}"), 0.9 - i as f64 * 0.05, 0.81234, 0.5))
            .collect();
        let report = ScoringReport::build(&records, &ScoringWeights::default(), 10);

        assert_eq!(report.summary.total_targets, 12);
        assert_eq!(report.summary.top_target.as_deref(), Some("P0 protein"));
        assert_eq!(report.top_targets.len(), 10);
        assert_eq!(report.top_targets[0].druggability_score, 0.812);
        assert_eq!(report.top_targets[0].pathway_score, 0.123);
        assert_eq!(report.top_targets[9].rank, 10);

        let stats = report.statistics.unwrap();
        assert!(stats.druggability.std < 1e-12);
        assert!((stats.final_score.max - 0.9).abs() < 1e-12);
        assert_eq!(report.summary.avg_score, Some(stats.final_score.mean));
    }

    #[test]
    fn test_report_serialises_weights() {
        let report = ScoringReport::build(&[record(1, "EGFR", 0.7, 0.9, 0.6)], &ScoringWeights::default(), 10);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["summary"]["scoring_weights"]["druggability"], 0.4);
        assert_eq!(json["top_targets"][0]["protein_id"], "EGFR");
    }

    #[test]
    fn test_distribution_uses_sample_std() {
        let d = ScoreDistribution::from_values(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert!((d.mean - 2.5).abs() < 1e-12);
        // sum of squares 5.0 over n - 1
        assert!((d.std.unwrap() - (5.0f64 / 3.0).sqrt()).abs() < 1e-12);
        assert_eq!((d.min, d.max), (1.0, 4.0));

        assert_eq!(ScoreDistribution::from_values(&[0.7]).unwrap().std, None);
        assert!(ScoreDistribution::from_values(&[]).is_none());
    }

    #[test]
    fn test_detailed_report_excerpt() {
        let records: Vec<_> = (0..12)
            .map(|i| record(i + 1, &format!("P{i}"), 0.9 - i as f64 * 0.05, 0.5, 0.2))
            .collect();
        let pathways = vec![PathwayInfo { id: "hsa04012".into(), ..Default::default() }];
        let report = DetailedReport::build("lung cancer", 3, pathways, &records);

        assert_eq!(report.error, None);
        assert_eq!(report.analysis_summary.total_pathways_found, 3);
        assert_eq!(report.analysis_summary.total_targets_analyzed, 12);
        assert_eq!(report.analysis_summary.top_target.as_deref(), Some("P0 protein"));
        assert_eq!(report.top_targets.len(), 10);
        assert_eq!(report.pathway_details.len(), 1);

        let stats = report.scoring_statistics.unwrap();
        assert!((stats.final_score_distribution.max - 0.9).abs() < 1e-12);
        assert!(stats.druggability_distribution.std.unwrap() < 1e-12);
        assert!((report.analysis_summary.avg_centrality_score.unwrap() - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_detailed_report_without_targets() {
        let report = DetailedReport::no_targets("scurvy", 0);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["error"], "No targets found");
        assert_eq!(json["analysis_summary"]["total_targets_analyzed"], 0);
        assert!(json["timestamp"].is_string());
        assert!(json["scoring_statistics"].is_null());
    }
}
