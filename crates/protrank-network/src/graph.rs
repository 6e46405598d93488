//! Undirected weighted protein-protein interaction graph.

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::unionfind::UnionFind;
use petgraph::visit::EdgeRef;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info};

use protrank_common::{ProteinId, RawInteraction, Result};

/// A protein in the interaction network.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ProteinNode {
    pub id: ProteinId,
}

/// Interaction between two proteins.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct InteractionEdge {
    /// Source confidence, 0–1000.
    pub raw_score: i64,
    /// `raw_score / 1000`, in [0, 1].
    pub weight: f64,
}

/// Interaction graph for one analysis run. Node indices are dense and
/// follow first-mention order.
#[derive(Debug, Clone, Default)]
pub struct InteractionGraph {
    inner: UnGraph<ProteinNode, InteractionEdge>,
    index: HashMap<ProteinId, NodeIndex>,
}

impl InteractionGraph {
    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.node_count() == 0
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn node_index(&self, id: &str) -> Option<NodeIndex> {
        self.index.get(id).copied()
    }

    /// Identifier of the node at dense position `i`.
    pub fn node_id(&self, i: usize) -> &ProteinId {
        &self.inner[NodeIndex::new(i)].id
    }

    /// Node identifiers in index order.
    pub fn node_ids(&self) -> impl Iterator<Item = &ProteinId> + '_ {
        self.inner.node_weights().map(|n| &n.id)
    }

    /// Weight of the edge between `a` and `b`, if any.
    pub fn edge_weight(&self, a: &str, b: &str) -> Option<f64> {
        let (ia, ib) = (self.node_index(a)?, self.node_index(b)?);
        self.inner.find_edge(ia, ib).map(|e| self.inner[e].weight)
    }

    /// Edges as `(a, b, weight)` using dense node positions.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.inner
            .edge_references()
            .map(|e| (e.source().index(), e.target().index(), e.weight().weight))
    }

    /// Symmetric adjacency list `(neighbour, weight)` per node, neighbours
    /// in ascending index order.
    pub fn adjacency(&self) -> Vec<Vec<(usize, f64)>> {
        let mut adj = vec![Vec::new(); self.node_count()];
        for (a, b, w) in self.edges() {
            adj[a].push((b, w));
            adj[b].push((a, w));
        }
        for neighbours in &mut adj {
            neighbours.sort_by_key(|&(n, _)| n);
        }
        adj
    }

    /// Connected components as dense node positions, ordered by their
    /// lowest position.
    pub fn components(&self) -> Vec<Vec<usize>> {
        let n = self.node_count();
        let mut uf = UnionFind::new(n);
        for (a, b, _) in self.edges() {
            uf.union(a, b);
        }
        let mut by_root: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for v in 0..n {
            by_root.entry(uf.find(v)).or_default().push(v);
        }
        let mut groups: Vec<Vec<usize>> = by_root.into_values().collect();
        groups.sort_by_key(|g| g[0]);
        groups
    }
}

/// Accumulates interactions and produces an [`InteractionGraph`].
///
/// Identifiers are canonicalised on entry, self-interactions are dropped,
/// and a repeated pair keeps the weight of its last insertion.
#[derive(Debug, Default)]
pub struct InteractionGraphBuilder {
    graph: InteractionGraph,
    self_loops_skipped: usize,
    overwritten: usize,
}

impl InteractionGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_node(&mut self, id: ProteinId) -> NodeIndex {
        if let Some(&idx) = self.graph.index.get(&id) {
            return idx;
        }
        let idx = self.graph.inner.add_node(ProteinNode { id: id.clone() });
        self.graph.index.insert(id, idx);
        idx
    }

    /// Add a single interaction. Fails on an out-of-range score or an
    /// identifier that cleans to nothing.
    pub fn add_interaction(&mut self, protein_a: &str, protein_b: &str, raw_score: i64) -> Result<()> {
        let interaction = RawInteraction::new(protein_b, raw_score);
        let weight = interaction.normalized_weight()?;
        let a = ProteinId::parse(protein_a)?;
        let b = ProteinId::parse(protein_b)?;

        if a == b {
            debug!(protein = %a, "Skipping self-interaction");
            self.self_loops_skipped += 1;
            return Ok(());
        }

        let ia = self.ensure_node(a);
        let ib = self.ensure_node(b);
        if self.graph.inner.find_edge(ia, ib).is_some() {
            self.overwritten += 1;
        }
        self.graph.inner.update_edge(ia, ib, InteractionEdge { raw_score, weight });
        Ok(())
    }

    /// Register a protein with no interactions yet.
    pub fn add_protein(&mut self, protein: &str) -> Result<()> {
        let id = ProteinId::parse(protein)?;
        self.ensure_node(id);
        Ok(())
    }

    /// Add every interaction a source reported for `target`.
    pub fn add_target_interactions(&mut self, target: &str, interactions: &[RawInteraction]) -> Result<()> {
        for interaction in interactions {
            self.add_interaction(target, &interaction.partner, interaction.score)?;
        }
        Ok(())
    }

    pub fn build(self) -> InteractionGraph {
        info!(
            nodes = self.graph.node_count(),
            edges = self.graph.edge_count(),
            self_loops_skipped = self.self_loops_skipped,
            overwritten = self.overwritten,
            "Built interaction graph"
        );
        self.graph
    }
}
