//! Node centrality over the interaction graph.
//!
//! Five metrics per protein (degree, betweenness, closeness, PageRank,
//! eigenvector) plus a fixed linear blend of them. The computer never fails:
//! a non-converging eigenvector iteration zeroes that metric only, and any
//! other failure zeroes every record.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use thiserror::Error;
use tracing::{debug, error, warn};

use protrank_common::{DistanceMode, NetworkConfig, ProteinId};

use crate::graph::InteractionGraph;

pub const COMPOSITE_DEGREE: f64 = 0.30;
pub const COMPOSITE_BETWEENNESS: f64 = 0.25;
pub const COMPOSITE_CLOSENESS: f64 = 0.20;
pub const COMPOSITE_PAGERANK: f64 = 0.15;
pub const COMPOSITE_EIGENVECTOR: f64 = 0.10;

const PATH_EPSILON: f64 = 1e-12;

/// Centrality metrics for one protein.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CentralityRecord {
    pub degree: f64,
    pub betweenness: f64,
    pub closeness: f64,
    pub pagerank: f64,
    pub eigenvector: f64,
    pub composite: f64,
}

impl CentralityRecord {
    pub const ZERO: Self = Self {
        degree: 0.0,
        betweenness: 0.0,
        closeness: 0.0,
        pagerank: 0.0,
        eigenvector: 0.0,
        composite: 0.0,
    };

    pub fn from_components(degree: f64, betweenness: f64, closeness: f64, pagerank: f64, eigenvector: f64) -> Self {
        let composite = COMPOSITE_DEGREE * degree
            + COMPOSITE_BETWEENNESS * betweenness
            + COMPOSITE_CLOSENESS * closeness
            + COMPOSITE_PAGERANK * pagerank
            + COMPOSITE_EIGENVECTOR * eigenvector;
        Self {
            degree,
            betweenness,
            closeness,
            pagerank,
            eigenvector,
            composite: composite.clamp(0.0, 1.0),
        }
    }
}

/// Centrality records in graph node order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CentralityTable {
    records: Vec<(ProteinId, CentralityRecord)>,
    #[serde(skip)]
    index: HashMap<ProteinId, usize>,
}

impl CentralityTable {
    fn from_records(records: Vec<(ProteinId, CentralityRecord)>) -> Self {
        let index = records.iter().enumerate().map(|(i, (id, _))| (id.clone(), i)).collect();
        Self { records, index }
    }

    fn zero_filled(graph: &InteractionGraph) -> Self {
        Self::from_records(graph.node_ids().map(|id| (id.clone(), CentralityRecord::ZERO)).collect())
    }

    pub fn get(&self, id: &str) -> Option<&CentralityRecord> {
        self.index.get(id).map(|&i| &self.records[i].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ProteinId, &CentralityRecord)> + '_ {
        self.records.iter().map(|(id, r)| (id, r))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn to_map(&self) -> HashMap<ProteinId, CentralityRecord> {
        self.records.iter().cloned().collect()
    }
}

#[derive(Debug, Error, PartialEq)]
enum CentralityFailure {
    #[error("{metric} did not converge within {max_iter} iterations")]
    NotConverged { metric: &'static str, max_iter: usize },

    #[error("graph has no dominant eigenvector (zero adjacency)")]
    NoDominantEigenvector,

    #[error("{metric} produced a non-finite value")]
    NonFinite { metric: &'static str },
}

/// Parameters for the centrality metrics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CentralityConfig {
    pub distance: DistanceMode,
    pub damping: f64,
    pub max_iter: usize,
    pub tolerance: f64,
}

impl Default for CentralityConfig {
    fn default() -> Self {
        Self::from(&NetworkConfig::default())
    }
}

impl From<&NetworkConfig> for CentralityConfig {
    fn from(cfg: &NetworkConfig) -> Self {
        Self {
            distance: cfg.distance,
            damping: cfg.damping,
            max_iter: cfg.max_iter,
            tolerance: cfg.tolerance,
        }
    }
}

pub struct CentralityComputer {
    config: CentralityConfig,
}

impl CentralityComputer {
    pub fn new(config: CentralityConfig) -> Self {
        Self { config }
    }

    /// Compute a complete record set for `graph`. Never fails.
    pub fn compute(&self, graph: &InteractionGraph) -> CentralityTable {
        if graph.is_empty() {
            return CentralityTable::default();
        }
        match self.try_compute(graph) {
            Ok(table) => table,
            Err(e) => {
                error!(error = %e, nodes = graph.node_count(), "Centrality computation failed, zero-filling all records");
                CentralityTable::zero_filled(graph)
            }
        }
    }

    fn try_compute(&self, graph: &InteractionGraph) -> Result<CentralityTable, CentralityFailure> {
        let adj = graph.adjacency();
        let lengths = path_lengths(&adj, self.config.distance);

        let degree = degree_centrality(&adj);
        let betweenness = betweenness_centrality(&lengths);
        let closeness = closeness_centrality(&lengths);
        let pagerank = pagerank(&adj, &self.config)?;
        let eigenvector = match eigenvector_centrality(&adj, &self.config) {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "Eigenvector centrality unavailable, defaulting to 0.0");
                vec![0.0; adj.len()]
            }
        };

        for (metric, values) in [
            ("degree", &degree),
            ("betweenness", &betweenness),
            ("closeness", &closeness),
            ("pagerank", &pagerank),
            ("eigenvector", &eigenvector),
        ] {
            if values.iter().any(|v| !v.is_finite()) {
                return Err(CentralityFailure::NonFinite { metric });
            }
        }

        let records = graph
            .node_ids()
            .enumerate()
            .map(|(i, id)| {
                let record = CentralityRecord::from_components(
                    degree[i],
                    betweenness[i],
                    closeness[i],
                    pagerank[i],
                    eigenvector[i],
                );
                (id.clone(), record)
            })
            .collect();

        debug!(nodes = graph.node_count(), "Centrality computed");
        Ok(CentralityTable::from_records(records))
    }
}

impl Default for CentralityComputer {
    fn default() -> Self {
        Self::new(CentralityConfig::default())
    }
}

// ── Path lengths ────────────────────────────────────────────────────────────

/// Traversal cost per edge. Zero-confidence edges are not traversable.
fn path_lengths(adj: &[Vec<(usize, f64)>], mode: DistanceMode) -> Vec<Vec<(usize, f64)>> {
    adj.iter()
        .map(|neighbours| {
            neighbours
                .iter()
                .filter(|&&(_, w)| w > 0.0)
                .map(|&(n, w)| {
                    let len = match mode {
                        DistanceMode::Inverse => 1.0 / w,
                        DistanceMode::Raw => w,
                    };
                    (n, len)
                })
                .collect()
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct QueueEntry {
    dist: f64,
    node: usize,
}

impl Eq for QueueEntry {}

impl Ord for QueueEntry {
    // Reversed so BinaryHeap pops the shortest tentative distance first,
    // lower node index on ties.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .dist
            .total_cmp(&self.dist)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn same_length(a: f64, b: f64) -> bool {
    (a - b).abs() <= PATH_EPSILON * a.abs().max(1.0)
}

/// Dijkstra from `source`, recording shortest-path counts and predecessors.
struct ShortestPaths {
    /// Settled nodes in non-decreasing distance order.
    order: Vec<usize>,
    dist: Vec<Option<f64>>,
    sigma: Vec<f64>,
    pred: Vec<Vec<usize>>,
}

fn single_source(lengths: &[Vec<(usize, f64)>], source: usize) -> ShortestPaths {
    let n = lengths.len();
    let mut dist: Vec<Option<f64>> = vec![None; n];
    let mut seen: Vec<Option<f64>> = vec![None; n];
    let mut sigma = vec![0.0; n];
    let mut pred: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut order = Vec::with_capacity(n);
    let mut heap = BinaryHeap::new();

    sigma[source] = 1.0;
    seen[source] = Some(0.0);
    heap.push(QueueEntry { dist: 0.0, node: source });

    while let Some(QueueEntry { dist: d, node: v }) = heap.pop() {
        if dist[v].is_some() {
            continue;
        }
        dist[v] = Some(d);
        order.push(v);

        for &(w, len) in &lengths[v] {
            if dist[w].is_some() {
                continue;
            }
            let candidate = d + len;
            match seen[w] {
                Some(best) if same_length(candidate, best) => {
                    sigma[w] += sigma[v];
                    pred[w].push(v);
                }
                Some(best) if candidate > best => {}
                _ => {
                    seen[w] = Some(candidate);
                    sigma[w] = sigma[v];
                    pred[w] = vec![v];
                    heap.push(QueueEntry { dist: candidate, node: w });
                }
            }
        }
    }

    ShortestPaths { order, dist, sigma, pred }
}

// ── Metrics ─────────────────────────────────────────────────────────────────

/// Neighbour count over `n - 1`; 0 for graphs with fewer than two nodes.
fn degree_centrality(adj: &[Vec<(usize, f64)>]) -> Vec<f64> {
    let n = adj.len();
    if n < 2 {
        return vec![0.0; n];
    }
    let scale = 1.0 / (n - 1) as f64;
    adj.iter().map(|nbrs| nbrs.len() as f64 * scale).collect()
}

/// Brandes betweenness over weighted shortest paths, normalised by
/// `(n-1)(n-2)` so a star centre scores 1.0.
fn betweenness_centrality(lengths: &[Vec<(usize, f64)>]) -> Vec<f64> {
    let n = lengths.len();
    let mut bc = vec![0.0; n];
    if n <= 2 {
        return bc;
    }

    for s in 0..n {
        let ShortestPaths { mut order, sigma, pred, .. } = single_source(lengths, s);
        let mut delta = vec![0.0; n];
        while let Some(w) = order.pop() {
            for &v in &pred[w] {
                delta[v] += sigma[v] / sigma[w] * (1.0 + delta[w]);
            }
            if w != s {
                bc[w] += delta[w];
            }
        }
    }

    let scale = 1.0 / ((n - 1) * (n - 2)) as f64;
    bc.iter_mut().for_each(|b| *b *= scale);
    bc
}

/// Wasserman–Faust closeness: `(r-1)/Σd · (r-1)/(n-1)` where `r` is the
/// number of nodes reachable from the node (itself included).
fn closeness_centrality(lengths: &[Vec<(usize, f64)>]) -> Vec<f64> {
    let n = lengths.len();
    (0..n)
        .map(|u| {
            let paths = single_source(lengths, u);
            let reachable = paths.order.len();
            let total: f64 = paths.dist.iter().flatten().sum();
            if total > 0.0 && n > 1 {
                let r = (reachable - 1) as f64;
                (r / total) * (r / (n - 1) as f64)
            } else {
                0.0
            }
        })
        .collect()
}

/// Damped random walk on the weighted graph. Dangling mass (nodes whose
/// incident weight is zero) is redistributed uniformly.
fn pagerank(adj: &[Vec<(usize, f64)>], cfg: &CentralityConfig) -> Result<Vec<f64>, CentralityFailure> {
    let n = adj.len();
    if n == 0 {
        return Ok(vec![]);
    }
    let nf = n as f64;
    let alpha = cfg.damping;
    let out_weight: Vec<f64> = adj.iter().map(|nbrs| nbrs.iter().map(|&(_, w)| w).sum()).collect();

    let mut x = vec![1.0 / nf; n];
    for _ in 0..cfg.max_iter {
        let last = x.clone();
        let dangling_sum: f64 = alpha
            * (0..n)
                .filter(|&v| out_weight[v] <= 0.0)
                .map(|v| last[v])
                .sum::<f64>();

        x = vec![dangling_sum / nf + (1.0 - alpha) / nf; n];
        for (v, nbrs) in adj.iter().enumerate() {
            if out_weight[v] <= 0.0 {
                continue;
            }
            for &(u, w) in nbrs {
                x[u] += alpha * last[v] * w / out_weight[v];
            }
        }

        let err: f64 = x.iter().zip(&last).map(|(a, b)| (a - b).abs()).sum();
        if err < nf * cfg.tolerance {
            return Ok(x);
        }
    }
    Err(CentralityFailure::NotConverged { metric: "pagerank", max_iter: cfg.max_iter })
}

/// Power iteration on the weighted adjacency matrix, Euclidean-normalised.
/// Bipartite topologies oscillate and report non-convergence.
fn eigenvector_centrality(adj: &[Vec<(usize, f64)>], cfg: &CentralityConfig) -> Result<Vec<f64>, CentralityFailure> {
    let n = adj.len();
    if n == 0 {
        return Ok(vec![]);
    }
    let nf = n as f64;

    let mut x = vec![1.0 / nf; n];
    for _ in 0..cfg.max_iter {
        let last = x;
        x = vec![0.0; n];
        for (v, nbrs) in adj.iter().enumerate() {
            for &(u, w) in nbrs {
                x[u] += last[v] * w;
            }
        }

        let norm = x.iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm <= 0.0 {
            return Err(CentralityFailure::NoDominantEigenvector);
        }
        x.iter_mut().for_each(|v| *v /= norm);

        let err: f64 = x.iter().zip(&last).map(|(a, b)| (a - b).abs()).sum();
        if err < nf * cfg.tolerance {
            return Ok(x);
        }
    }
    Err(CentralityFailure::NotConverged { metric: "eigenvector", max_iter: cfg.max_iter })
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

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_composite_uses_fixed_blend() {
        let r = CentralityRecord::from_components(1.0, 0.5, 0.5, 0.2, 0.4);
        assert!(approx(r.composite, 0.30 + 0.125 + 0.10 + 0.03 + 0.04));
    }

    #[test]
    fn test_empty_graph_yields_empty_table() {
        let table = CentralityComputer::default().compute(&InteractionGraph::default());
        assert!(table.is_empty());
    }

    #[test]
    fn test_triangle_is_symmetric() {
        let g = graph(&[("A", "B", 1000), ("B", "C", 1000), ("A", "C", 1000)]);
        let table = CentralityComputer::default().compute(&g);
        for (_, r) in table.iter() {
            assert!(approx(r.degree, 1.0));
            assert!(approx(r.betweenness, 0.0));
            assert!(approx(r.closeness, 1.0));
            assert!(approx(r.pagerank, 1.0 / 3.0));
            assert!(approx(r.eigenvector, 1.0 / 3f64.sqrt()));
        }
    }

    #[test]
    fn test_path_betweenness_and_closeness() {
        // A - B - C with unit confidence: B bridges the only pair.
        let g = graph(&[("A", "B", 1000), ("B", "C", 1000)]);
        let table = CentralityComputer::default().compute(&g);
        let b = table.get("B").unwrap();
        let a = table.get("A").unwrap();

        assert!(approx(b.betweenness, 1.0));
        assert!(approx(a.betweenness, 0.0));
        assert!(approx(b.closeness, 1.0));
        assert!(approx(a.closeness, 2.0 / 3.0));
        assert!(approx(b.degree, 1.0));
        assert!(approx(a.degree, 0.5));
    }

    #[test]
    fn test_inverse_distance_prefers_confident_path() {
        // A-B-C via confident edges versus a weak direct A-C edge.
        // Inverse lengths: A-B-C = 1.25 + 1.25 = 2.5 < A-C = 10.
        let g = graph(&[("A", "B", 800), ("B", "C", 800), ("A", "C", 100)]);
        let inverse = CentralityComputer::default().compute(&g);
        assert!(approx(inverse.get("B").unwrap().betweenness, 1.0));

        // Raw lengths: A-C = 0.1 < A-B-C = 1.6, so B bridges nothing.
        let raw = CentralityComputer::new(CentralityConfig {
            distance: DistanceMode::Raw,
            ..CentralityConfig::default()
        })
        .compute(&g);
        assert!(approx(raw.get("B").unwrap().betweenness, 0.0));
    }

    #[test]
    fn test_equal_paths_split_betweenness() {
        // Square A-B-D, A-C-D: B and C each carry half of A–D.
        let g = graph(&[("A", "B", 1000), ("B", "D", 1000), ("A", "C", 1000), ("C", "D", 1000)]);
        let table = CentralityComputer::default().compute(&g);
        // 4 nodes → scale 1/6; pair (A,D) counted both directions → 2 × 0.5 = 1.
        assert!(approx(table.get("B").unwrap().betweenness, 1.0 / 6.0));
        assert!(approx(table.get("C").unwrap().betweenness, 1.0 / 6.0));
    }

    #[test]
    fn test_pagerank_sums_to_one() {
        let g = graph(&[("A", "B", 900), ("B", "C", 400), ("C", "D", 700), ("D", "B", 300), ("E", "A", 500)]);
        let table = CentralityComputer::default().compute(&g);
        let total: f64 = table.iter().map(|(_, r)| r.pagerank).sum();
        assert!(approx(total, 1.0));
    }

    #[test]
    fn test_zero_weight_edges_are_dangling_for_pagerank() {
        let g = graph(&[("A", "B", 0)]);
        let table = CentralityComputer::default().compute(&g);
        assert!(approx(table.get("A").unwrap().pagerank, 0.5));
        assert!(approx(table.get("A").unwrap().closeness, 0.0));
        // Degree still counts the interaction.
        assert!(approx(table.get("A").unwrap().degree, 1.0));
        // Zero adjacency has no dominant eigenvector.
        assert_eq!(table.get("A").unwrap().eigenvector, 0.0);
    }

    #[test]
    fn test_star_with_pendant_zeroes_eigenvector_only() {
        // Star centred on HUB plus a pendant hanging off one leaf: bipartite,
        // so plain power iteration oscillates.
        let g = graph(&[
            ("HUB", "L1", 900),
            ("HUB", "L2", 900),
            ("HUB", "L3", 900),
            ("L1", "PENDANT", 900),
        ]);
        let table = CentralityComputer::default().compute(&g);

        for (_, r) in table.iter() {
            assert_eq!(r.eigenvector, 0.0);
            assert!(r.degree > 0.0);
            assert!(r.pagerank > 0.0);
            assert!(r.closeness > 0.0);
        }
        let hub = table.get("HUB").unwrap();
        assert!(hub.betweenness > 0.5);
        assert!(hub.composite > 0.0);
    }

    #[test]
    fn test_pagerank_failure_zero_fills_everything() {
        let g = graph(&[("A", "B", 900), ("B", "C", 100), ("C", "D", 800), ("A", "D", 200), ("A", "C", 500)]);
        let table = CentralityComputer::new(CentralityConfig {
            max_iter: 1,
            ..CentralityConfig::default()
        })
        .compute(&g);

        assert_eq!(table.len(), 4);
        for (_, r) in table.iter() {
            assert_eq!(*r, CentralityRecord::ZERO);
        }
    }

    #[test]
    fn test_disconnected_graph_closeness_is_scaled() {
        // Two components of two nodes. Each node reaches one other at length 1.
        let g = graph(&[("A", "B", 1000), ("C", "D", 1000)]);
        let table = CentralityComputer::default().compute(&g);
        // (1/1) * (1/3)
        assert!(approx(table.get("A").unwrap().closeness, 1.0 / 3.0));
    }

    #[test]
    fn test_composite_in_unit_interval_under_raw_lengths() {
        let g = graph(&[("A", "B", 50), ("B", "C", 50), ("C", "A", 60), ("C", "D", 10)]);
        let table = CentralityComputer::new(CentralityConfig {
            distance: DistanceMode::Raw,
            ..CentralityConfig::default()
        })
        .compute(&g);
        for (_, r) in table.iter() {
            assert!((0.0..=1.0).contains(&r.composite), "composite = {}", r.composite);
        }
    }

    #[test]
    fn test_table_lookup_and_map() {
        let g = graph(&[("tp53", "MDM2", 999)]);
        let table = CentralityComputer::default().compute(&g);
        assert!(table.get("TP53").is_some());
        assert!(table.get("tp53").is_none(), "lookups take canonical ids");
        assert_eq!(table.to_map().len(), 2);
    }
}
