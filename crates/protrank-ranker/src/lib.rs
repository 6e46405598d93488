//! protrank-ranker: Target prioritization scoring engine.
//! Normalises evidence into sub-scores, blends them with configurable
//! weights, ranks targets and drives the end-to-end pipeline.

pub mod normalise;
pub mod weights;
pub mod scorer;
pub mod report;
pub mod export;
pub mod providers;
pub mod pipeline;

pub use weights::{ScoringWeights, WeightOverrides};
pub use scorer::{TargetScoreRecord, TargetScorer, WeightedComponents};
pub use report::{
    AnalysisSummary, DetailedReport, DetailedStatistics, ReportStatistics, ReportSummary, ReportTarget, ScoreDistribution,
    ScoreStatistics, ScoringReport,
};
pub use export::{save_results, write_csv};
pub use providers::{AnnotationSource, FailingSource, InteractionSource, PathwayInfo, PathwaySource, StaticDataset};
pub use pipeline::{
    ComparisonOutcome, DiseaseComparison, DiseaseSummary, PipelineOrchestrator, RankedTargets, RankingRequest,
    DEFAULT_COMPARISON_TARGETS,
};
