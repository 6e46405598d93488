//! Functional cluster detection.
//!
//! Tries Louvain modularity optimisation first, then greedy (CNM)
//! modularity agglomeration, then plain connected components. A strategy
//! runs only if the previous one failed; results are never mixed.

use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, warn};

use protrank_common::ProteinId;

use crate::graph::InteractionGraph;

const GAIN_EPSILON: f64 = 1e-12;

/// Strategy that produced a partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusterMethod {
    Louvain,
    GreedyModularity,
    ConnectedComponents,
}

/// Disjoint clusters covering every node. Clusters are ordered by their
/// lowest node index, members by node index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommunityPartition {
    pub method: ClusterMethod,
    pub clusters: Vec<Vec<ProteinId>>,
}

impl CommunityPartition {
    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    /// Index of the cluster containing `id`.
    pub fn cluster_of(&self, id: &str) -> Option<usize> {
        self.clusters
            .iter()
            .position(|members| members.iter().any(|m| m.as_str() == id))
    }
}

#[derive(Debug, Error, PartialEq)]
enum CommunityFailure {
    #[error("graph has zero total edge weight, modularity is undefined")]
    ZeroTotalWeight,

    #[error("louvain did not settle within {0} levels")]
    LevelLimit(usize),
}

pub struct CommunityDetector {
    max_levels: usize,
}

impl CommunityDetector {
    pub fn new() -> Self {
        Self { max_levels: 32 }
    }

    pub fn detect(&self, graph: &InteractionGraph) -> CommunityPartition {
        let adj = graph.adjacency();

        match louvain(&adj, self.max_levels) {
            Ok(groups) => return to_partition(graph, ClusterMethod::Louvain, groups),
            Err(e) => warn!(error = %e, "Louvain clustering failed, trying greedy modularity"),
        }

        match greedy_modularity(&adj) {
            Ok(groups) => return to_partition(graph, ClusterMethod::GreedyModularity, groups),
            Err(e) => warn!(error = %e, "Greedy modularity failed, falling back to connected components"),
        }

        to_partition(graph, ClusterMethod::ConnectedComponents, graph.components())
    }
}

impl Default for CommunityDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// Newman modularity of `clusters` on the weighted graph. 0.0 for a graph
/// without edge weight.
pub fn modularity(graph: &InteractionGraph, clusters: &[Vec<ProteinId>]) -> f64 {
    let mut label = vec![usize::MAX; graph.node_count()];
    for (c, members) in clusters.iter().enumerate() {
        for id in members {
            if let Some(idx) = graph.node_index(id.as_str()) {
                label[idx.index()] = c;
            }
        }
    }

    let adj = graph.adjacency();
    let strength: Vec<f64> = adj.iter().map(|nbrs| nbrs.iter().map(|&(_, w)| w).sum()).collect();
    let m2: f64 = strength.iter().sum();
    if m2 <= 0.0 {
        return 0.0;
    }

    let mut internal = vec![0.0; clusters.len()];
    let mut total = vec![0.0; clusters.len()];
    for (v, nbrs) in adj.iter().enumerate() {
        let Some(c) = label.get(v).copied().filter(|&c| c != usize::MAX) else {
            continue;
        };
        total[c] += strength[v];
        for &(u, w) in nbrs {
            if label[u] == c {
                internal[c] += w;
            }
        }
    }

    internal
        .iter()
        .zip(&total)
        .map(|(inside, tot)| inside / m2 - (tot / m2).powi(2))
        .sum()
}

fn to_partition(graph: &InteractionGraph, method: ClusterMethod, groups: Vec<Vec<usize>>) -> CommunityPartition {
    let mut groups: Vec<Vec<usize>> = groups.into_iter().filter(|g| !g.is_empty()).collect();
    for g in &mut groups {
        g.sort_unstable();
    }
    groups.sort_by_key(|g| g[0]);

    let clusters: Vec<Vec<ProteinId>> = groups
        .into_iter()
        .map(|g| g.into_iter().map(|i| graph.node_id(i).clone()).collect())
        .collect();
    debug!(?method, clusters = clusters.len(), "Functional clusters identified");
    CommunityPartition { method, clusters }
}

// ── Louvain ─────────────────────────────────────────────────────────────────

/// Working graph for one Louvain level. `links[i]` excludes `i` itself;
/// `internal[i]` is the weight folded into node `i` by aggregation.
struct LevelGraph {
    links: Vec<BTreeMap<usize, f64>>,
    internal: Vec<f64>,
}

impl LevelGraph {
    fn from_adjacency(adj: &[Vec<(usize, f64)>]) -> Self {
        let links = adj.iter().map(|nbrs| nbrs.iter().copied().collect()).collect();
        Self { links, internal: vec![0.0; adj.len()] }
    }

    fn len(&self) -> usize {
        self.links.len()
    }

    fn strength(&self, i: usize) -> f64 {
        self.links[i].values().sum::<f64>() + 2.0 * self.internal[i]
    }

    /// Collapse each community into a single node.
    fn aggregate(&self, community: &[usize], count: usize) -> Self {
        let mut links = vec![BTreeMap::new(); count];
        let mut internal = vec![0.0; count];
        for (i, nbrs) in self.links.iter().enumerate() {
            let ci = community[i];
            internal[ci] += self.internal[i];
            for (&j, &w) in nbrs {
                let cj = community[j];
                if ci == cj {
                    // each internal edge is seen from both endpoints
                    internal[ci] += w / 2.0;
                } else {
                    *links[ci].entry(cj).or_insert(0.0) += w;
                }
            }
        }
        Self { links, internal }
    }
}

/// One round of local moving. Returns the community of each node, the
/// number of communities (ids are dense), and whether any node moved.
fn local_moving(g: &LevelGraph, m2: f64) -> (Vec<usize>, usize, bool) {
    let n = g.len();
    let strength: Vec<f64> = (0..n).map(|i| g.strength(i)).collect();
    let mut community: Vec<usize> = (0..n).collect();
    let mut total: Vec<f64> = strength.clone();
    let mut moved_any = false;

    loop {
        let mut moved = false;
        for i in 0..n {
            let current = community[i];
            let mut towards: BTreeMap<usize, f64> = BTreeMap::new();
            for (&j, &w) in &g.links[i] {
                *towards.entry(community[j]).or_insert(0.0) += w;
            }

            total[current] -= strength[i];
            let gain = |c: usize, k_in: f64| k_in - total[c] * strength[i] / m2;

            let mut best = current;
            let mut best_gain = gain(current, towards.get(&current).copied().unwrap_or(0.0));
            for (&c, &k_in) in &towards {
                let candidate = gain(c, k_in);
                if candidate > best_gain + GAIN_EPSILON {
                    best = c;
                    best_gain = candidate;
                }
            }

            total[best] += strength[i];
            if best != current {
                community[i] = best;
                moved = true;
                moved_any = true;
            }
        }
        if !moved {
            break;
        }
    }

    // Renumber to dense ids in order of first appearance.
    let mut renumber = BTreeMap::new();
    let mut dense = vec![0; n];
    for i in 0..n {
        let next = renumber.len();
        dense[i] = *renumber.entry(community[i]).or_insert(next);
    }
    (dense, renumber.len(), moved_any)
}

fn louvain(adj: &[Vec<(usize, f64)>], max_levels: usize) -> Result<Vec<Vec<usize>>, CommunityFailure> {
    let m2: f64 = adj.iter().flatten().map(|&(_, w)| w).sum();
    if m2 <= 0.0 {
        return Err(CommunityFailure::ZeroTotalWeight);
    }

    let mut level = LevelGraph::from_adjacency(adj);
    // membership[v] = node of the current level graph that holds original v
    let mut membership: Vec<usize> = (0..adj.len()).collect();

    for _ in 0..max_levels {
        let (community, count, moved) = local_moving(&level, m2);
        if !moved {
            let mut groups = vec![Vec::new(); level.len()];
            for (v, &node) in membership.iter().enumerate() {
                groups[node].push(v);
            }
            return Ok(groups);
        }
        for node in membership.iter_mut() {
            *node = community[*node];
        }
        level = level.aggregate(&community, count);
    }
    Err(CommunityFailure::LevelLimit(max_levels))
}

// ── Greedy modularity (Clauset–Newman–Moore) ────────────────────────────────

fn greedy_modularity(adj: &[Vec<(usize, f64)>]) -> Result<Vec<Vec<usize>>, CommunityFailure> {
    let n = adj.len();
    let m2: f64 = adj.iter().flatten().map(|&(_, w)| w).sum();
    if m2 <= 0.0 {
        return Err(CommunityFailure::ZeroTotalWeight);
    }

    let mut members: Vec<Option<Vec<usize>>> = (0..n).map(|i| Some(vec![i])).collect();
    let mut a: Vec<f64> = adj.iter().map(|nbrs| nbrs.iter().map(|&(_, w)| w).sum::<f64>() / m2).collect();
    let mut links: Vec<BTreeMap<usize, f64>> = adj.iter().map(|nbrs| nbrs.iter().copied().collect()).collect();

    loop {
        let mut best: Option<(usize, usize, f64)> = None;
        for i in 0..n {
            if members[i].is_none() {
                continue;
            }
            for (&j, &w) in &links[i] {
                if j <= i {
                    continue;
                }
                let dq = 2.0 * (w / m2 - a[i] * a[j]);
                if best.map_or(true, |(_, _, b)| dq > b + GAIN_EPSILON) {
                    best = Some((i, j, dq));
                }
            }
        }

        let Some((i, j, dq)) = best else { break };
        if dq <= 0.0 {
            break;
        }

        // Merge j into i.
        if let Some(moved) = members[j].take() {
            if let Some(target) = members[i].as_mut() {
                target.extend(moved);
            }
        }
        a[i] += a[j];
        a[j] = 0.0;
        let j_links = std::mem::take(&mut links[j]);
        for (k, w) in j_links {
            links[k].remove(&j);
            if k == i {
                continue;
            }
            *links[i].entry(k).or_insert(0.0) += w;
            *links[k].entry(i).or_insert(0.0) += w;
        }
        links[i].remove(&j);
    }

    Ok(members.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::InteractionGraphBuilder;

    fn graph(edges: &[(&str, &str, i64)]) -> InteractionGraph {
        let mut builder = InteractionGraphBuilder::new();
        for &(a, b, s) in edges {
            builder.add_interaction(a, b, s).unwrap();
        }
        builder.build()
    }

    /// Two triangles joined by one weak bridge.
    fn two_triangles() -> InteractionGraph {
        graph(&[
            ("A", "B", 900),
            ("B", "C", 900),
            ("A", "C", 900),
            ("D", "E", 900),
            ("E", "F", 900),
            ("D", "F", 900),
            ("C", "D", 100),
        ])
    }

    fn names(partition: &CommunityPartition) -> Vec<Vec<&str>> {
        partition
            .clusters
            .iter()
            .map(|c| c.iter().map(|id| id.as_str()).collect())
            .collect()
    }

    fn assert_covers_all_nodes(graph: &InteractionGraph, partition: &CommunityPartition) {
        let mut seen: Vec<&str> = partition.clusters.iter().flatten().map(|id| id.as_str()).collect();
        seen.sort_unstable();
        let mut all: Vec<&str> = graph.node_ids().map(|id| id.as_str()).collect();
        all.sort_unstable();
        assert_eq!(seen, all);
    }

    #[test]
    fn test_louvain_splits_two_triangles() {
        let g = two_triangles();
        let partition = CommunityDetector::new().detect(&g);
        assert_eq!(partition.method, ClusterMethod::Louvain);
        assert_eq!(names(&partition), vec![vec!["A", "B", "C"], vec!["D", "E", "F"]]);
        assert_eq!(partition.cluster_of("E"), Some(1));
        assert!(modularity(&g, &partition.clusters) > 0.3);
    }

    #[test]
    fn test_greedy_modularity_splits_two_triangles() {
        let g = two_triangles();
        let groups = greedy_modularity(&g.adjacency()).unwrap();
        let partition = to_partition(&g, ClusterMethod::GreedyModularity, groups);
        assert_eq!(names(&partition), vec![vec!["A", "B", "C"], vec!["D", "E", "F"]]);
    }

    #[test]
    fn test_disconnected_nodes_fall_back_to_singletons() {
        // Two nodes with a zero-confidence interaction: no modularity.
        let g = graph(&[("A", "B", 0), ("C", "D", 0), ("E", "F", 0)]);
        let partition = CommunityDetector::new().detect(&g);

        assert_eq!(partition.method, ClusterMethod::ConnectedComponents);
        assert_eq!(names(&partition), vec![vec!["A", "B"], vec!["C", "D"], vec!["E", "F"]]);
    }

    #[test]
    fn test_empty_graph_has_no_clusters() {
        let partition = CommunityDetector::new().detect(&InteractionGraph::default());
        assert!(partition.is_empty());
        assert_eq!(partition.method, ClusterMethod::ConnectedComponents);
    }

    #[test]
    fn test_zero_weight_is_rejected_by_modularity_methods() {
        let g = graph(&[("A", "B", 0)]);
        assert_eq!(louvain(&g.adjacency(), 8), Err(CommunityFailure::ZeroTotalWeight));
        assert_eq!(greedy_modularity(&g.adjacency()), Err(CommunityFailure::ZeroTotalWeight));
    }

    #[test]
    fn test_connected_components_groups() {
        let g = graph(&[("A", "B", 500), ("B", "C", 500), ("D", "E", 500)]);
        let groups = g.components();
        let partition = to_partition(&g, ClusterMethod::ConnectedComponents, groups);
        assert_eq!(names(&partition), vec![vec!["A", "B", "C"], vec!["D", "E"]]);
    }

    #[test]
    fn test_partition_covers_every_node_once() {
        let g = graph(&[
            ("TP53", "MDM2", 999),
            ("TP53", "ATM", 950),
            ("ATM", "CHEK2", 900),
            ("EGFR", "ERBB2", 900),
            ("EGFR", "GRB2", 850),
            ("GRB2", "SOS1", 800),
            ("MDM2", "EGFR", 150),
        ]);
        let partition = CommunityDetector::new().detect(&g);
        assert_covers_all_nodes(&g, &partition);
    }

    #[test]
    fn test_singleton_partition_modularity_is_negative() {
        let g = two_triangles();
        let singletons: Vec<Vec<ProteinId>> = g.node_ids().map(|id| vec![id.clone()]).collect();
        assert!(modularity(&g, &singletons) < 0.0);
    }
}
