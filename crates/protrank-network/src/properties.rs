//! Structural properties of an interaction graph and hub selection.

use serde::Serialize;
use std::collections::VecDeque;

use protrank_common::ProteinId;

use crate::centrality::{CentralityRecord, CentralityTable};
use crate::graph::InteractionGraph;

/// Unweighted summary statistics of the graph topology.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NetworkProperties {
    pub num_nodes: usize,
    pub num_edges: usize,
    pub density: f64,
    pub is_connected: bool,
    pub num_connected_components: usize,
    pub average_clustering: f64,
    pub transitivity: f64,
    pub average_degree: f64,
    /// Population variance of node degree
    pub degree_variance: f64,
    /// Mean hop count over the largest connected component
    pub average_path_length: f64,
}

impl NetworkProperties {
    pub fn compute(graph: &InteractionGraph) -> Self {
        let n = graph.node_count();
        if n == 0 {
            return Self::default();
        }

        let neighbours: Vec<Vec<usize>> = graph
            .adjacency()
            .into_iter()
            .map(|nbrs| nbrs.into_iter().map(|(v, _)| v).collect())
            .collect();
        let degrees: Vec<f64> = neighbours.iter().map(|nbrs| nbrs.len() as f64).collect();
        let e = graph.edge_count();

        let density = if n < 2 { 0.0 } else { 2.0 * e as f64 / (n as f64 * (n as f64 - 1.0)) };
        let average_degree = degrees.iter().sum::<f64>() / n as f64;
        let degree_variance = degrees.iter().map(|d| (d - average_degree).powi(2)).sum::<f64>() / n as f64;

        let (average_clustering, transitivity) = clustering(&neighbours);
        let components = graph.components();

        Self {
            num_nodes: n,
            num_edges: e,
            density,
            is_connected: components.len() == 1,
            num_connected_components: components.len(),
            average_clustering,
            transitivity,
            average_degree,
            degree_variance,
            average_path_length: largest_component_path_length(&neighbours, &components),
        }
    }
}

/// Returns (mean local clustering coefficient, global transitivity).
fn clustering(neighbours: &[Vec<usize>]) -> (f64, f64) {
    let n = neighbours.len();
    let mut local_sum = 0.0;
    let mut triangles = 0usize;
    let mut triads = 0usize;

    for nbrs in neighbours {
        let d = nbrs.len();
        if d < 2 {
            continue;
        }
        // neighbour lists are sorted, so membership is a binary search
        let mut closed = 0usize;
        for (i, &a) in nbrs.iter().enumerate() {
            for &b in &nbrs[i + 1..] {
                if neighbours[a].binary_search(&b).is_ok() {
                    closed += 1;
                }
            }
        }
        let possible = d * (d - 1) / 2;
        local_sum += closed as f64 / possible as f64;
        triangles += closed;
        triads += possible;
    }

    let average = local_sum / n as f64;
    let transitivity = if triads == 0 { 0.0 } else { triangles as f64 / triads as f64 };
    (average, transitivity)
}

fn largest_component_path_length(neighbours: &[Vec<usize>], components: &[Vec<usize>]) -> f64 {
    // first of the largest, by lowest node index
    let Some(largest) = components
        .iter()
        .fold(None::<&Vec<usize>>, |best, c| match best {
            Some(b) if b.len() >= c.len() => Some(b),
            _ => Some(c),
        })
    else {
        return 0.0;
    };
    let size = largest.len();
    if size < 2 {
        return 0.0;
    }

    let mut total = 0usize;
    let mut dist = vec![usize::MAX; neighbours.len()];
    let mut queue = VecDeque::new();
    for &source in largest {
        for &v in largest {
            dist[v] = usize::MAX;
        }
        dist[source] = 0;
        queue.push_back(source);
        while let Some(v) = queue.pop_front() {
            for &u in &neighbours[v] {
                if dist[u] == usize::MAX {
                    dist[u] = dist[v] + 1;
                    total += dist[u];
                    queue.push_back(u);
                }
            }
        }
    }
    total as f64 / (size * (size - 1)) as f64
}

/// A highly central protein.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkHub {
    pub protein_id: ProteinId,
    #[serde(flatten)]
    pub centrality: CentralityRecord,
}

/// The `top_n` proteins by composite centrality, descending. Ties keep
/// graph node order.
pub fn identify_hubs(table: &CentralityTable, top_n: usize) -> Vec<NetworkHub> {
    let mut hubs: Vec<NetworkHub> = table
        .iter()
        .map(|(id, record)| NetworkHub { protein_id: id.clone(), centrality: *record })
        .collect();
    hubs.sort_by(|a, b| b.centrality.composite.total_cmp(&a.centrality.composite));
    hubs.truncate(top_n);
    hubs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::centrality::CentralityComputer;
    use crate::graph::InteractionGraphBuilder;

    fn graph(edges: &[(&str, &str, i64)]) -> InteractionGraph {
        let mut builder = InteractionGraphBuilder::new();
        for &(a, b, s) in edges {
            builder.add_interaction(a, b, s).unwrap();
        }
        builder.build()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_empty_graph_properties() {
        let props = NetworkProperties::compute(&InteractionGraph::default());
        assert_eq!(props, NetworkProperties::default());
        assert!(!props.is_connected);
    }

    #[test]
    fn test_triangle_properties() {
        let props = NetworkProperties::compute(&graph(&[("A", "B", 900), ("B", "C", 900), ("A", "C", 900)]));
        assert_eq!(props.num_nodes, 3);
        assert_eq!(props.num_edges, 3);
        assert!(approx(props.density, 1.0));
        assert!(props.is_connected);
        assert!(approx(props.average_clustering, 1.0));
        assert!(approx(props.transitivity, 1.0));
        assert!(approx(props.average_degree, 2.0));
        assert!(approx(props.degree_variance, 0.0));
        assert!(approx(props.average_path_length, 1.0));
    }

    #[test]
    fn test_path_graph_properties() {
        // A - B - C - D
        let props = NetworkProperties::compute(&graph(&[("A", "B", 500), ("B", "C", 500), ("C", "D", 500)]));
        assert!(approx(props.density, 0.5));
        assert!(approx(props.average_clustering, 0.0));
        assert!(approx(props.transitivity, 0.0));
        assert!(approx(props.average_degree, 1.5));
        assert!(approx(props.degree_variance, 0.25));
        // pair distances 1,2,3,1,2,1 -> 10/6
        assert!(approx(props.average_path_length, 10.0 / 6.0));
    }

    #[test]
    fn test_disconnected_uses_largest_component() {
        let props = NetworkProperties::compute(&graph(&[
            ("A", "B", 500),
            ("C", "D", 500),
            ("D", "E", 500),
        ]));
        assert!(!props.is_connected);
        assert_eq!(props.num_connected_components, 2);
        // C - D - E: distances 1,2,1 -> 4/3
        assert!(approx(props.average_path_length, 4.0 / 3.0));
    }

    #[test]
    fn test_paw_graph_clustering() {
        // triangle A-B-C with pendant D on C
        let props = NetworkProperties::compute(&graph(&[
            ("A", "B", 500),
            ("B", "C", 500),
            ("A", "C", 500),
            ("C", "D", 500),
        ]));
        // local: A=1, B=1, C=1/3, D=0
        assert!(approx(props.average_clustering, (1.0 + 1.0 + 1.0 / 3.0) / 4.0));
        // 3 closed of 5 triads
        assert!(approx(props.transitivity, 0.6));
    }

    #[test]
    fn test_hubs_sorted_by_composite() {
        let g = graph(&[("HUB", "A", 900), ("HUB", "B", 900), ("HUB", "C", 900), ("A", "D", 900)]);
        let table = CentralityComputer::default().compute(&g);
        let hubs = identify_hubs(&table, 2);

        assert_eq!(hubs.len(), 2);
        assert_eq!(hubs[0].protein_id.as_str(), "HUB");
        assert!(hubs[0].centrality.composite >= hubs[1].centrality.composite);
    }

    #[test]
    fn test_hubs_top_n_larger_than_graph() {
        let g = graph(&[("A", "B", 900)]);
        let table = CentralityComputer::default().compute(&g);
        assert_eq!(identify_hubs(&table, 10).len(), 2);
        assert!(identify_hubs(&table, 0).is_empty());
    }
}
