//! Ranking scenarios exercised through the public API.

use std::collections::HashMap;
use std::sync::Arc;

use protrank_common::{PathwayInvolvement, PipelineConfig, ProteinId};
use protrank_network::CentralityRecord;
use protrank_ranker::{save_results, PipelineOrchestrator, ScoringWeights, StaticDataset, TargetScorer};
use protrank_test_utils::profile;

fn id(raw: &str) -> ProteinId {
    ProteinId::parse(raw).unwrap()
}

fn composite(value: f64) -> CentralityRecord {
    CentralityRecord { composite: value, ..CentralityRecord::ZERO }
}

#[test]
fn test_two_target_ranking_with_default_weights() {
    let profiles = vec![
        profile("B").druggability(0.9).build(),
        profile("A").druggability(0.8).build(),
    ];
    let centrality = HashMap::from([(id("A"), composite(0.7)), (id("B"), composite(0.6))]);
    let pathways = HashMap::from([
        (id("A"), PathwayInvolvement::from(5)),
        (id("B"), PathwayInvolvement::from(3)),
    ]);
    let diseases = HashMap::from([
        (id("A"), vec!["cancer".to_string(), "x".to_string()]),
        (id("B"), vec!["cancer".to_string()]),
    ]);

    let scorer = TargetScorer::new(ScoringWeights::default());
    let records = scorer.score_target_list(&profiles, &centrality, &pathways, &diseases).unwrap();

    assert_eq!(records[0].protein_id.as_str(), "A");
    assert_eq!(records[0].rank, 1);
    assert!((records[0].final_score - 0.7256).abs() < 1e-3, "A scored {}", records[0].final_score);
    assert_eq!(records[1].protein_id.as_str(), "B");
    assert_eq!(records[1].rank, 2);
    assert!((records[1].final_score - 0.6804).abs() < 1e-3, "B scored {}", records[1].final_score);

    for r in &records {
        assert!((r.components.total() - r.final_score).abs() < 1e-9);
    }
}

const DATASET: &str = r#"{
  "proteins": [
    { "protein_id": "EGFR", "protein_name": "Epidermal growth factor receptor",
      "druggability_score": 0.9, "uniprot_id": "P00533",
      "diseases": ["Lung cancer", "Glioblastoma"] },
    { "protein_id": "KRAS", "protein_name": "GTPase KRas",
      "druggability_score": 0.3, "diseases": ["Non-small cell lung cancer"] },
    { "protein_id": "GRB2", "druggability_score": 0.2 },
    { "protein_id": "SOS1", "druggability_score": 0.5 }
  ],
  "interactions": [
    { "protein_a": "EGFR", "protein_b": "GRB2", "score": 999 },
    { "protein_a": "GRB2", "protein_b": "SOS1", "score": 990 },
    { "protein_a": "SOS1", "protein_b": "KRAS", "score": 950 },
    { "protein_a": "EGFR", "protein_b": "KRAS", "score": 200 }
  ],
  "pathways": {
    "hsa04012": ["EGFR", "GRB2", "SOS1", "KRAS"],
    "hsa05223": ["EGFR", "KRAS"]
  },
  "diseases": { "Lung Cancer": ["hsa05223", "hsa04012"] }
}"#;

fn orchestrator() -> PipelineOrchestrator {
    let mut config = PipelineConfig::default();
    config.pipeline.request_delay_ms = 0;
    let dataset = Arc::new(StaticDataset::from_json_str(DATASET).unwrap());
    PipelineOrchestrator::new(config, dataset.clone(), dataset.clone(), dataset).unwrap()
}

#[tokio::test]
async fn test_identify_and_rank_from_dataset_file() {
    let ranked = orchestrator().identify_and_rank("lung cancer").await.unwrap();

    assert_eq!(ranked.targets.len(), 4);
    assert_eq!(ranked.targets[0].protein_id.as_str(), "EGFR");
    assert_eq!(ranked.report.summary.total_targets, 4);
    assert_eq!(
        ranked.report.summary.top_target.as_deref(),
        Some("Epidermal growth factor receptor")
    );

    let egfr = &ranked.targets[0];
    // two pathways; the association list mentions the query so both entries count
    assert!((egfr.pathway_score - 3f64.log10()).abs() < 1e-9);
    assert!((egfr.disease_relevance_score - 0.4).abs() < 1e-9);

    let network = ranked.network.expect("network analysis runs for a non-empty graph");
    // the 200 score link is under the default threshold
    assert_eq!(network.summary.num_interactions, 3);
}

#[tokio::test]
async fn test_unknown_disease_yields_empty_report() {
    let ranked = orchestrator().identify_and_rank("melanoma").await.unwrap();
    assert!(ranked.is_empty());
    assert_eq!(ranked.report.summary.total_targets, 0);
    assert!(ranked.network.is_none());
}

#[tokio::test]
async fn test_ranked_results_export_to_csv() {
    let ranked = orchestrator().identify_and_rank("lung cancer").await.unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = save_results(&ranked.targets, "lung cancer", dir.path()).unwrap();

    let mut reader = csv::Reader::from_path(&path).unwrap();
    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), ranked.targets.len());
    assert_eq!(&rows[0][0], "1");
    assert_eq!(&rows[0][1], "EGFR");
}

#[tokio::test]
async fn test_demo_dataset_ranks_every_candidate() {
    let dataset = Arc::new(StaticDataset::from_json_str(include_str!("../../../demos/lung_cancer.json")).unwrap());
    let mut config = PipelineConfig::default();
    config.pipeline.request_delay_ms = 0;
    let pipeline = PipelineOrchestrator::new(config, dataset.clone(), dataset.clone(), dataset).unwrap();

    let ranked = pipeline.identify_and_rank("Lung cancer").await.unwrap();
    assert_eq!(ranked.targets.len(), 7);
    assert_eq!(ranked.targets[0].protein_id.as_str(), "EGFR");

    let json = serde_json::to_value(&ranked).unwrap();
    assert_eq!(json["report"]["top_targets"].as_array().unwrap().len(), 7);
}
