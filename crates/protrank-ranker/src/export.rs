//! CSV export of ranked targets.

use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

use protrank_common::Result;

use crate::scorer::TargetScoreRecord;

#[derive(Serialize)]
struct CsvRow<'a> {
    #[serde(rename = "Rank")]
    rank: usize,
    #[serde(rename = "Protein ID")]
    protein_id: &'a str,
    #[serde(rename = "Protein Name")]
    protein_name: &'a str,
    #[serde(rename = "Final Score")]
    final_score: f64,
    #[serde(rename = "Druggability Score")]
    druggability_score: f64,
    #[serde(rename = "Centrality Score")]
    centrality_score: f64,
    #[serde(rename = "Pathway Score")]
    pathway_score: f64,
    #[serde(rename = "Disease Relevance Score")]
    disease_relevance_score: f64,
    #[serde(rename = "Confidence Score")]
    confidence_score: f64,
    #[serde(rename = "Druggability (Weighted)")]
    druggability_weighted: f64,
    #[serde(rename = "Centrality (Weighted)")]
    centrality_weighted: f64,
    #[serde(rename = "Pathway (Weighted)")]
    pathway_weighted: f64,
    #[serde(rename = "Disease (Weighted)")]
    disease_weighted: f64,
}

impl<'a> From<&'a TargetScoreRecord> for CsvRow<'a> {
    fn from(r: &'a TargetScoreRecord) -> Self {
        Self {
            rank: r.rank,
            protein_id: r.protein_id.as_str(),
            protein_name: &r.protein_name,
            final_score: r.final_score,
            druggability_score: r.druggability_score,
            centrality_score: r.centrality_score,
            pathway_score: r.pathway_score,
            disease_relevance_score: r.disease_relevance_score,
            confidence_score: r.confidence_score,
            druggability_weighted: r.components.druggability_weighted,
            centrality_weighted: r.components.centrality_weighted,
            pathway_weighted: r.components.pathway_weighted,
            disease_weighted: r.components.disease_weighted,
        }
    }
}

/// Write one row per record, with a header row.
pub fn write_csv<W: Write>(records: &[TargetScoreRecord], writer: W) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    for record in records {
        csv.serialize(CsvRow::from(record))?;
    }
    csv.flush()?;
    Ok(())
}

/// File name for a disease query run at the current local time.
pub fn results_file_name(disease: &str) -> String {
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    format!("{}_{timestamp}.csv", disease.replace(' ', "_"))
}

/// Write `records` to `<output_dir>/<disease>_<timestamp>.csv`, creating
/// the directory if needed. Returns the written path.
pub fn save_results(records: &[TargetScoreRecord], disease: &str, output_dir: impl AsRef<Path>) -> Result<PathBuf> {
    let dir = output_dir.as_ref();
    std::fs::create_dir_all(dir)?;
    let path = dir.join(results_file_name(disease));
    let file = std::fs::File::create(&path)?;
    write_csv(records, file)?;
    info!(path = %path.display(), rows = records.len(), "Results saved");
    Ok(path)
}
