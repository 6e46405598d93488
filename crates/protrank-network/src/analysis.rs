//! One-shot network analysis: centrality, topology, hubs and clusters.

use serde::Serialize;
use tracing::info;

use protrank_common::{NetworkConfig, ProteinId};

use crate::centrality::{CentralityComputer, CentralityConfig, CentralityTable};
use crate::community::{modularity, CommunityDetector, CommunityPartition};
use crate::graph::InteractionGraph;
use crate::properties::{identify_hubs, NetworkHub, NetworkProperties};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkSummary {
    pub num_proteins: usize,
    pub num_interactions: usize,
    pub density: f64,
    pub top_hub: Option<ProteinId>,
    pub num_clusters: usize,
    pub modularity: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct NetworkAnalysis {
    pub centrality: CentralityTable,
    pub properties: NetworkProperties,
    pub hubs: Vec<NetworkHub>,
    pub partition: CommunityPartition,
    pub summary: NetworkSummary,
}

pub struct NetworkAnalyzer {
    centrality: CentralityComputer,
    communities: CommunityDetector,
    hub_count: usize,
}

impl NetworkAnalyzer {
    pub fn new(config: &NetworkConfig) -> Self {
        Self {
            centrality: CentralityComputer::new(CentralityConfig::from(config)),
            communities: CommunityDetector::new(),
            hub_count: config.hub_count,
        }
    }

    pub fn analyze(&self, graph: &InteractionGraph) -> NetworkAnalysis {
        let centrality = self.centrality.compute(graph);
        let properties = NetworkProperties::compute(graph);
        let hubs = identify_hubs(&centrality, self.hub_count);
        let partition = self.communities.detect(graph);

        let summary = NetworkSummary {
            num_proteins: graph.node_count(),
            num_interactions: graph.edge_count(),
            density: properties.density,
            top_hub: hubs.first().map(|h| h.protein_id.clone()),
            num_clusters: partition.len(),
            modularity: modularity(graph, &partition.clusters),
        };
        info!(
            proteins = summary.num_proteins,
            interactions = summary.num_interactions,
            clusters = summary.num_clusters,
            top_hub = ?summary.top_hub.as_ref().map(|id| id.as_str()),
            "Network analysis complete"
        );

        NetworkAnalysis { centrality, properties, hubs, partition, summary }
    }
}

impl Default for NetworkAnalyzer {
    fn default() -> Self {
        Self::new(&NetworkConfig::default())
    }
}
