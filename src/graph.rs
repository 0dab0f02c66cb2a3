//! Weighted undirected graph shared by every detector.
//!
//! Nodes are plain integer ids and adjacency is kept in ordered maps, so
//! iteration is always ascending by id. All algorithms rely on that ordering
//! to be reproducible for a fixed random source.
//!
//! Queries on unknown nodes never fail: they return an empty neighbor set,
//! zero weight, or zero degree.

use petgraph::graph::UnGraph;
use petgraph::visit::EdgeRef;
use std::collections::BTreeMap;

/// Node identifier.
pub type NodeId = usize;

/// Undirected graph with per-edge `f64` weights.
///
/// `weight(u, v) == weight(v, u)` holds for every pair; it is maintained by
/// [`add_edge`](Self::add_edge) and [`remove_edge`](Self::remove_edge), the
/// only mutators.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeightedGraph {
    /// node -> (neighbor -> weight)
    adj: BTreeMap<NodeId, BTreeMap<NodeId, f64>>,
}

impl WeightedGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from `(u, v, weight)` triples.
    pub fn from_edges<I>(edges: I) -> Self
    where
        I: IntoIterator<Item = (NodeId, NodeId, f64)>,
    {
        let mut graph = Self::new();
        for (u, v, w) in edges {
            graph.add_edge(u, v, w);
        }
        graph
    }

    /// Import a petgraph graph. Node `i` becomes id `i`; parallel edges keep
    /// the last weight seen.
    pub fn from_petgraph<N, E, F>(graph: &UnGraph<N, E>, mut weight: F) -> Self
    where
        F: FnMut(&E) -> f64,
    {
        let mut out = Self::new();
        for node in graph.node_indices() {
            out.add_node(node.index());
        }
        for edge in graph.edge_references() {
            out.add_edge(edge.source().index(), edge.target().index(), weight(edge.weight()));
        }
        out
    }

    /// Add a node. Idempotent.
    pub fn add_node(&mut self, v: NodeId) {
        let _ = self.adj.entry(v).or_default();
    }

    /// Add (or overwrite) the undirected edge `u -- v`.
    pub fn add_edge(&mut self, u: NodeId, v: NodeId, weight: f64) {
        let _ = self.adj.entry(u).or_default().insert(v, weight);
        let _ = self.adj.entry(v).or_default().insert(u, weight);
    }

    /// Add an edge of weight 1.0.
    pub fn add_unit_edge(&mut self, u: NodeId, v: NodeId) {
        self.add_edge(u, v, 1.0);
    }

    /// Remove the edge `u -- v`, keeping both nodes.
    ///
    /// Returns `true` if the edge existed.
    pub fn remove_edge(&mut self, u: NodeId, v: NodeId) -> bool {
        let removed = self
            .adj
            .get_mut(&u)
            .and_then(|n| n.remove(&v))
            .is_some();
        if let Some(n) = self.adj.get_mut(&v) {
            let _ = n.remove(&u);
        }
        removed
    }

    /// Whether `v` is a node of the graph.
    pub fn contains_node(&self, v: NodeId) -> bool {
        self.adj.contains_key(&v)
    }

    /// Whether the edge `u -- v` exists.
    pub fn has_edge(&self, u: NodeId, v: NodeId) -> bool {
        self.adj.get(&u).is_some_and(|n| n.contains_key(&v))
    }

    /// Neighbors of `v` in ascending order (empty if `v` is unknown).
    pub fn neighbors(&self, v: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.adj.get(&v).into_iter().flat_map(|n| n.keys().copied())
    }

    /// `(neighbor, weight)` pairs of `v` in ascending neighbor order.
    pub fn weighted_neighbors(&self, v: NodeId) -> impl Iterator<Item = (NodeId, f64)> + '_ {
        self.adj
            .get(&v)
            .into_iter()
            .flat_map(|n| n.iter().map(|(&u, &w)| (u, w)))
    }

    /// Weight of `u -- v`, or 0.0 if there is no such edge.
    pub fn weight(&self, u: NodeId, v: NodeId) -> f64 {
        self.adj
            .get(&u)
            .and_then(|n| n.get(&v))
            .copied()
            .unwrap_or(0.0)
    }

    /// Number of neighbors of `v`.
    pub fn degree(&self, v: NodeId) -> usize {
        self.adj.get(&v).map_or(0, BTreeMap::len)
    }

    /// Sum of the weights incident to `v`.
    pub fn weighted_degree(&self, v: NodeId) -> f64 {
        self.adj.get(&v).map_or(0.0, |n| n.values().sum())
    }

    /// Sum of all edge weights, each edge counted once.
    pub fn total_weight(&self) -> f64 {
        self.adj.values().flat_map(BTreeMap::values).sum::<f64>() / 2.0
    }

    /// Node ids in ascending order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.adj.keys().copied()
    }

    /// Every undirected edge once, as `(u, v, weight)` with `u <= v`.
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId, f64)> + '_ {
        self.adj
            .iter()
            .flat_map(|(&u, n)| n.range(u..).map(move |(&v, &w)| (u, v, w)))
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.adj.len()
    }

    /// Number of undirected edges (self-loops count once).
    pub fn edge_count(&self) -> usize {
        self.edges().count()
    }

    /// Whether the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.adj.is_empty()
    }
}
