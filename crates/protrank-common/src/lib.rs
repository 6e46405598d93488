//! protrank-common: Shared types, errors, and configuration used across all protrank crates.

pub mod error;
pub mod entities;
pub mod confidence;
pub mod config;

// Re-export commonly used types
pub use error::{ProtrankError, Result};
pub use entities::{canonical_protein_id, PathwayInvolvement, ProteinId, ProteinProfile, RawInteraction};
pub use config::{PipelineConfig, ScoringConfig, NetworkConfig, DistanceMode, RunConfig, OutputConfig};
