//! Girvan-Newman divisive community detection.
//!
//! Repeatedly removes the edge with the highest betweenness: edges that
//! bridge communities carry most shortest paths, so cutting them first
//! separates the graph along community boundaries.
//!
//! Each step scores every edge from scratch (Brandes accumulation from every
//! source), removes the top edge from a private working copy, and takes the
//! connected components as the new partition. Modularity is always measured
//! on the untouched input graph. The partition with the highest modularity
//! seen so far is the answer.
//!
//! ## Complexity
//!
//! O(m n) per step for unweighted betweenness, O(m² n) to exhaustion.
//!
//! ## References
//!
//! - Girvan & Newman (2002). "Community structure in social and biological
//!   networks." PNAS 99(12).
//! - Brandes (2001). "A faster algorithm for betweenness centrality."

use super::partition::{modularity, Partition};
use super::traits::CommunityDetection;
use crate::error::{Error, Result};
use crate::graph::{NodeId, WeightedGraph};
use log::debug;
use petgraph::unionfind::UnionFind;
use std::collections::{BTreeMap, HashMap, VecDeque};

/// Scores closer than this count as equal when picking the edge to remove.
const SCORE_EPSILON: f64 = 1e-9;

/// An undirected edge keyed by `(low, high)` endpoint.
pub type EdgeKey = (NodeId, NodeId);

/// Partition snapshot with its modularity on the input graph.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PartitionRecord {
    /// Connected components at this step.
    pub communities: Partition,
    /// Modularity against the input graph.
    pub modularity: f64,
}

/// Stepwise Girvan-Newman over a private copy of the input graph.
pub struct GirvanNewmanEngine<'a> {
    original: &'a WeightedGraph,
    working: WeightedGraph,
    /// One record per step, starting with the initial components.
    history: Vec<PartitionRecord>,
    /// Index into `history` of the best record.
    best: usize,
    current_step: usize,
}

impl<'a> GirvanNewmanEngine<'a> {
    /// Copy `graph` and record its connected components as step 0.
    pub fn new(graph: &'a WeightedGraph) -> Self {
        let working = graph.clone();
        let communities = connected_components(&working);
        let initial = PartitionRecord {
            modularity: modularity(graph, &communities),
            communities,
        };
        Self {
            original: graph,
            working,
            history: vec![initial],
            best: 0,
            current_step: 0,
        }
    }

    /// Remove the highest-betweenness edge and record the new partition.
    ///
    /// Returns `false`, changing nothing, once the working graph has no edges.
    pub fn perform_one_step(&mut self) -> bool {
        let scores = edge_betweenness(&self.working);
        let Some(((u, v), score)) = top_edge(&scores) else {
            return false;
        };

        let _ = self.working.remove_edge(u, v);
        self.current_step += 1;

        let communities = connected_components(&self.working);
        let modularity = modularity(self.original, &communities);
        debug!(
            "girvan_newman: step {} cut ({u}, {v}) at {score:.3}: {} parts, Q {modularity:.6}",
            self.current_step,
            communities.len()
        );

        self.history.push(PartitionRecord {
            communities,
            modularity,
        });
        if modularity > self.history[self.best].modularity {
            self.best = self.history.len() - 1;
        }
        true
    }

    fn current(&self) -> &PartitionRecord {
        // history always holds the initial record
        &self.history[self.history.len() - 1]
    }

    /// Connected components of the working graph.
    pub fn current_communities(&self) -> &Partition {
        &self.current().communities
    }

    /// Partition with the highest modularity seen so far.
    pub fn best_communities(&self) -> &Partition {
        &self.history[self.best].communities
    }

    /// Modularity of the current partition.
    pub fn current_modularity(&self) -> f64 {
        self.current().modularity
    }

    /// Highest modularity seen so far.
    pub fn max_modularity(&self) -> f64 {
        self.history[self.best].modularity
    }

    /// Number of edges removed so far.
    pub fn current_step(&self) -> usize {
        self.current_step
    }

    /// Edges left in the working graph.
    pub fn remaining_edge_count(&self) -> usize {
        self.working.edge_count()
    }

    /// Every recorded partition, step 0 first.
    pub fn history(&self) -> &[PartitionRecord] {
        &self.history
    }

    /// The input graph.
    pub fn original_graph(&self) -> &WeightedGraph {
        self.original
    }

    /// The working graph with all removed edges missing.
    pub fn working_graph(&self) -> &WeightedGraph {
        &self.working
    }

    /// Betweenness of every edge of the working graph.
    pub fn edge_betweenness(&self) -> BTreeMap<EdgeKey, f64> {
        edge_betweenness(&self.working)
    }
}

/// Edge with the highest score; near-ties go to the lowest key.
fn top_edge(scores: &BTreeMap<EdgeKey, f64>) -> Option<(EdgeKey, f64)> {
    let mut best: Option<(EdgeKey, f64)> = None;
    for (&edge, &score) in scores {
        match best {
            Some((_, top)) if score <= top + SCORE_EPSILON => {}
            _ => best = Some((edge, score)),
        }
    }
    best
}

/// Edge betweenness summed over every source node (Brandes).
///
/// Every edge of the graph gets an entry; self-loops never lie on a
/// shortest path and score 0.
pub fn edge_betweenness(graph: &WeightedGraph) -> BTreeMap<EdgeKey, f64> {
    let mut scores: BTreeMap<EdgeKey, f64> =
        graph.edges().map(|(u, v, _)| ((u, v), 0.0)).collect();

    for source in graph.nodes() {
        accumulate_from_source(graph, source, &mut scores);
    }
    scores
}

/// Add the dependency credit of all shortest paths starting at `source`.
fn accumulate_from_source(
    graph: &WeightedGraph,
    source: NodeId,
    scores: &mut BTreeMap<EdgeKey, f64>,
) {
    let mut dist: HashMap<NodeId, usize> = HashMap::new();
    let mut sigma: HashMap<NodeId, f64> = HashMap::new();
    let mut predecessors: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
    let mut stack: Vec<NodeId> = Vec::new();
    let mut queue: VecDeque<NodeId> = VecDeque::new();

    let _ = dist.insert(source, 0);
    let _ = sigma.insert(source, 1.0);
    queue.push_back(source);

    // Forward BFS: shortest-path counts and predecessor lists
    while let Some(v) = queue.pop_front() {
        stack.push(v);
        let dist_v = dist[&v];
        let sigma_v = sigma[&v];

        for w in graph.neighbors(v) {
            let dist_w = *dist.entry(w).or_insert_with(|| {
                queue.push_back(w);
                dist_v + 1
            });
            if dist_w == dist_v + 1 {
                *sigma.entry(w).or_insert(0.0) += sigma_v;
                predecessors.entry(w).or_default().push(v);
            }
        }
    }

    // Back-propagation in reverse discovery order
    let mut delta: HashMap<NodeId, f64> = HashMap::new();
    while let Some(w) = stack.pop() {
        let Some(preds) = predecessors.get(&w) else {
            continue;
        };
        let sigma_w = sigma[&w];
        let delta_w = delta.get(&w).copied().unwrap_or(0.0);

        for &v in preds {
            let credit = (sigma[&v] / sigma_w) * (1.0 + delta_w);
            *scores.entry((v.min(w), v.max(w))).or_insert(0.0) += credit;
            *delta.entry(v).or_insert(0.0) += credit;
        }
    }
}

/// Connected components, numbered in ascending order of their lowest node.
pub fn connected_components(graph: &WeightedGraph) -> Partition {
    let nodes: Vec<NodeId> = graph.nodes().collect();
    let index: HashMap<NodeId, usize> = nodes.iter().enumerate().map(|(i, &n)| (n, i)).collect();

    let mut uf = UnionFind::<usize>::new(nodes.len());
    for (u, v, _) in graph.edges() {
        let _ = uf.union(index[&u], index[&v]);
    }

    let mut component_of_root: HashMap<usize, usize> = HashMap::new();
    let mut out = Partition::new();
    for (i, &node) in nodes.iter().enumerate() {
        let next_id = component_of_root.len();
        let id = *component_of_root.entry(uf.find(i)).or_insert(next_id);
        let _ = out.entry(id).or_default().insert(node);
    }
    out
}

/// Girvan-Newman community detection.
///
/// Removes edges until none remain (or `max_steps` is reached) and returns
/// the partition with the highest modularity.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GirvanNewman {
    /// Maximum edge removals (`None` = run to exhaustion).
    max_steps: Option<usize>,
}

impl GirvanNewman {
    /// Create a detector that runs to exhaustion.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop after at most `max_steps` edge removals.
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = Some(max_steps);
        self
    }
}

impl CommunityDetection for GirvanNewman {
    fn detect(&self, graph: &WeightedGraph) -> Result<Partition> {
        if graph.is_empty() {
            return Err(Error::EmptyInput);
        }

        let mut engine = GirvanNewmanEngine::new(graph);
        let limit = self.max_steps.unwrap_or(usize::MAX);
        while engine.current_step() < limit && engine.perform_one_step() {}

        debug!(
            "{}: {} steps, best Q = {:.6}",
            self.name(),
            engine.current_step(),
            engine.max_modularity()
        );
        Ok(engine.best_communities().clone())
    }

    fn name(&self) -> &'static str {
        "girvan_newman"
    }
}
