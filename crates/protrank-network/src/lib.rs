//! protrank-network: Protein interaction graph construction and analysis.
//! Builds the weighted PPI graph, then derives centrality, functional
//! clusters, and whole-network properties from it.

pub mod graph;
pub mod centrality;
pub mod community;
pub mod properties;
pub mod analysis;

pub use graph::{InteractionEdge, InteractionGraph, InteractionGraphBuilder, ProteinNode};
pub use centrality::{CentralityComputer, CentralityConfig, CentralityRecord, CentralityTable};
pub use community::{ClusterMethod, CommunityDetector, CommunityPartition, modularity};
pub use properties::{identify_hubs, NetworkHub, NetworkProperties};
pub use analysis::{NetworkAnalysis, NetworkAnalyzer, NetworkSummary};
