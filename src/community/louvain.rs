//! Louvain algorithm for community detection.
//!
//! Fast modularity optimization through local node moves and graph aggregation.
//!
//! ## The Algorithm (Blondel et al. 2008)
//!
//! Louvain is a multi-level, greedy modularity optimization algorithm:
//!
//! 1. **Phase 1 (Local Moving)**: Start with each node in its own community.
//!    Repeatedly move nodes to the neighboring community with the highest
//!    modularity gain until no node moves.
//!
//! 2. **Phase 2 (Aggregation)**: Build a meta-graph where communities become
//!    single nodes. Edge weights are sums of edges between communities.
//!
//! 3. **Iterate**: Repeat phases 1-2 on the meta-graph until a pass after
//!    aggregation moves nothing.
//!
//! ## Gain
//!
//! ```text
//! gain(i, C) = k_i,in / m - Σ_tot(C) × k_i / (2m)²
//! ```
//!
//! `k_i,in` is the weight from `i` into `C`, `Σ_tot(C)` the total degree of
//! `C` without `i`, `k_i` the degree of `i`, `m` the total edge weight.
//!
//! ## Known approximation
//!
//! Aggregation drops intra-community weight instead of turning it into
//! self-loops, so [`LouvainEngine::compute_modularity`] on later levels only
//! sees the edges between super-nodes. [`LouvainEngine::modularity_on_original`]
//! measures the resolved assignment on the input graph instead, and the
//! [`Louvain`] detector uses it to decide which level to keep.
//!
//! The gain's degree penalty is half of the exact modularity change, so a
//! move with positive gain can lower [`LouvainEngine::compute_modularity`].
//! Passes within a phase are therefore not guaranteed to be monotone. The
//! detector's guarantee is weaker but exact: its result never scores below
//! the singleton partition on the input graph.
//!
//! ## References
//!
//! Blondel et al. (2008). "Fast unfolding of communities in large networks."
//! Journal of Statistical Mechanics: Theory and Experiment, P10008.

use super::partition::{group_by_label, modularity, Partition};
use super::traits::CommunityDetection;
use crate::error::{Error, Result};
use crate::graph::{NodeId, WeightedGraph};
use log::{debug, trace};
use rand::prelude::*;
use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};

/// Stepwise Louvain optimizer.
///
/// Borrows the input graph until the first aggregation, then owns the
/// coarsened graph of the current level.
pub struct LouvainEngine<'a, R> {
    /// Untouched input graph.
    original: &'a WeightedGraph,
    /// Graph of the current level.
    graph: Cow<'a, WeightedGraph>,
    /// Weighted degree of each node of the current level.
    degrees: BTreeMap<NodeId, f64>,
    /// Total edge weight of the current level.
    total_weight: f64,
    node_to_community: BTreeMap<NodeId, usize>,
    /// Weight of edges with both endpoints in the community.
    community_internal: BTreeMap<usize, f64>,
    /// Summed weighted degree of the community.
    community_degree: BTreeMap<usize, f64>,
    /// Super-node -> original nodes it stands for.
    members: BTreeMap<NodeId, BTreeSet<NodeId>>,
    phase: usize,
    rng: R,
}

impl<'a, R: Rng> LouvainEngine<'a, R> {
    /// Start in phase 1 with every node in its own community.
    pub fn new(graph: &'a WeightedGraph, rng: R) -> Self {
        let mut engine = Self {
            original: graph,
            graph: Cow::Borrowed(graph),
            degrees: BTreeMap::new(),
            total_weight: 0.0,
            node_to_community: BTreeMap::new(),
            community_internal: BTreeMap::new(),
            community_degree: BTreeMap::new(),
            members: graph.nodes().map(|n| (n, BTreeSet::from([n]))).collect(),
            phase: 1,
            rng,
        };
        engine.reset_level();
        engine
    }

    /// Singleton communities over the current level graph.
    fn reset_level(&mut self) {
        self.degrees = self
            .graph
            .nodes()
            .map(|n| (n, self.graph.weighted_degree(n)))
            .collect();
        self.total_weight = self.graph.total_weight();
        self.node_to_community = self.graph.nodes().map(|n| (n, n)).collect();
        self.recompute_stats();
    }

    /// Rebuild community totals from scratch.
    fn recompute_stats(&mut self) {
        self.community_internal.clear();
        self.community_degree.clear();

        for (&node, &comm) in &self.node_to_community {
            let _ = self.community_internal.entry(comm).or_insert(0.0);
            *self.community_degree.entry(comm).or_insert(0.0) += self.degrees[&node];
        }
        for (u, v, w) in self.graph.edges() {
            if u == v {
                continue;
            }
            let cu = self.node_to_community[&u];
            if cu == self.node_to_community[&v] {
                *self.community_internal.entry(cu).or_insert(0.0) += w;
            }
        }
    }

    /// Weight from `node` into each neighboring community (self-loops ignored).
    fn community_links(&self, node: NodeId) -> BTreeMap<usize, f64> {
        let mut links = BTreeMap::new();
        for (neighbor, w) in self.graph.weighted_neighbors(node) {
            if neighbor == node {
                continue;
            }
            *links.entry(self.node_to_community[&neighbor]).or_insert(0.0) += w;
        }
        links
    }

    fn gain(&self, k_in: f64, community: usize, k_i: f64) -> f64 {
        let m2 = 2.0 * self.total_weight;
        let sigma_tot = self.community_degree.get(&community).copied().unwrap_or(0.0);
        k_in / self.total_weight - sigma_tot * k_i / (m2 * m2)
    }

    /// One local-moving pass over all nodes in random order.
    ///
    /// Returns `true` if any node changed community.
    pub fn perform_one_pass(&mut self) -> bool {
        if self.total_weight == 0.0 {
            return false;
        }

        let mut order: Vec<NodeId> = self.graph.nodes().collect();
        order.shuffle(&mut self.rng);

        let mut moved = false;
        for node in order {
            let old = self.node_to_community[&node];
            let k_i = self.degrees[&node];
            let links = self.community_links(node);
            let k_in_old = links.get(&old).copied().unwrap_or(0.0);

            // Take the node out of its community
            *self.community_degree.entry(old).or_insert(0.0) -= k_i;
            *self.community_internal.entry(old).or_insert(0.0) -= k_in_old;

            // Staying put is the baseline; only a strictly better gain moves
            let mut best = old;
            let mut best_gain = self.gain(k_in_old, old, k_i).max(0.0);
            for (&comm, &k_in) in &links {
                if comm == old {
                    continue;
                }
                let gain = self.gain(k_in, comm, k_i);
                if gain > best_gain {
                    best_gain = gain;
                    best = comm;
                }
            }

            let k_in_best = links.get(&best).copied().unwrap_or(0.0);
            *self.community_degree.entry(best).or_insert(0.0) += k_i;
            *self.community_internal.entry(best).or_insert(0.0) += k_in_best;
            let _ = self.node_to_community.insert(node, best);

            if best != old {
                trace!(
                    "phase {}: node {node} {old} -> {best} (gain {best_gain:.6})",
                    self.phase
                );
                moved = true;
            }
        }

        if !moved {
            // Resync running totals against accumulated float drift
            self.recompute_stats();
        }
        moved
    }

    /// Modularity of the current level's partition from the running totals.
    pub fn compute_modularity(&self) -> f64 {
        if self.total_weight == 0.0 {
            return 0.0;
        }
        let m2 = 2.0 * self.total_weight;
        let communities: BTreeSet<usize> = self.node_to_community.values().copied().collect();

        communities
            .into_iter()
            .map(|c| {
                let internal = self.community_internal.get(&c).copied().unwrap_or(0.0);
                let degree = self.community_degree.get(&c).copied().unwrap_or(0.0);
                internal / self.total_weight - (degree / m2).powi(2)
            })
            .sum()
    }

    /// Collapse every community into a super-node and start the next phase.
    ///
    /// Super-nodes are numbered from 0 in ascending community order. Edges
    /// between super-nodes carry the summed weight of the original crossing
    /// edges; intra-community weight is dropped.
    pub fn aggregate_graph(&mut self) {
        let communities: BTreeSet<usize> = self.node_to_community.values().copied().collect();
        let super_of: BTreeMap<usize, NodeId> = communities
            .into_iter()
            .enumerate()
            .map(|(s, c)| (c, s))
            .collect();

        let mut next = WeightedGraph::new();
        let mut next_members: BTreeMap<NodeId, BTreeSet<NodeId>> = BTreeMap::new();
        for (node, comm) in &self.node_to_community {
            let s = super_of[comm];
            next.add_node(s);
            let originals = self.members.remove(node).unwrap_or_default();
            next_members.entry(s).or_default().extend(originals);
        }

        let mut crossing: BTreeMap<(NodeId, NodeId), f64> = BTreeMap::new();
        for (u, v, w) in self.graph.edges() {
            let su = super_of[&self.node_to_community[&u]];
            let sv = super_of[&self.node_to_community[&v]];
            if su == sv {
                continue;
            }
            *crossing.entry((su.min(sv), su.max(sv))).or_insert(0.0) += w;
        }
        for ((a, b), w) in crossing {
            next.add_edge(a, b, w);
        }

        debug!(
            "louvain: phase {} -> {}, {} nodes -> {} super-nodes",
            self.phase,
            self.phase + 1,
            self.graph.node_count(),
            next.node_count()
        );

        self.graph = Cow::Owned(next);
        self.members = next_members;
        self.phase += 1;
        self.reset_level();
    }

    /// Current phase: 1 before the first aggregation, then 2, 3, ...
    pub fn phase(&self) -> usize {
        self.phase
    }

    /// Number of distinct communities on the current level.
    pub fn num_communities(&self) -> usize {
        self.node_to_community
            .values()
            .collect::<BTreeSet<_>>()
            .len()
    }

    /// Community of every original node, resolved through all aggregations.
    pub fn community_map(&self) -> BTreeMap<NodeId, usize> {
        let mut out = BTreeMap::new();
        for (node, &comm) in &self.node_to_community {
            if let Some(originals) = self.members.get(node) {
                out.extend(originals.iter().map(|&o| (o, comm)));
            }
        }
        out
    }

    /// Current communities as a partition of the original nodes.
    pub fn communities(&self) -> Partition {
        group_by_label(&self.community_map())
    }

    /// Modularity of [`community_map`](Self::community_map) on the input graph.
    pub fn modularity_on_original(&self) -> f64 {
        modularity(self.original, &self.communities())
    }

    /// Graph of the current level.
    pub fn level_graph(&self) -> &WeightedGraph {
        &self.graph
    }

    /// Original nodes represented by a super-node of the current level.
    pub fn super_node_members(&self, node: NodeId) -> Option<&BTreeSet<NodeId>> {
        self.members.get(&node)
    }
}

/// Louvain community detection algorithm.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Louvain {
    /// Maximum local-moving passes per level.
    max_passes: usize,
    /// Maximum levels of aggregation.
    max_levels: usize,
    /// Minimum modularity improvement (on the input graph) to keep a level.
    min_modularity_gain: f64,
    /// Random seed for the visit order.
    seed: Option<u64>,
}

impl Louvain {
    /// Create a new Louvain detector with default settings.
    pub fn new() -> Self {
        Self {
            max_passes: 100,
            max_levels: 10,
            min_modularity_gain: 1e-7,
            seed: None,
        }
    }

    /// Set maximum passes per level.
    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = max_passes;
        self
    }

    /// Set maximum aggregation levels.
    pub fn with_max_levels(mut self, levels: usize) -> Self {
        self.max_levels = levels;
        self
    }

    /// Set the minimum modularity improvement a level must bring.
    pub fn with_min_modularity_gain(mut self, gain: f64) -> Self {
        self.min_modularity_gain = gain;
        self
    }

    /// Set random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

impl Default for Louvain {
    fn default() -> Self {
        Self::new()
    }
}

impl CommunityDetection for Louvain {
    fn detect(&self, graph: &WeightedGraph) -> Result<Partition> {
        if graph.is_empty() {
            return Err(Error::EmptyInput);
        }
        if self.max_passes == 0 || self.max_levels == 0 {
            return Err(Error::invalid_parameter(
                "max_passes/max_levels",
                "must be positive",
            ));
        }

        let rng: Box<dyn RngCore> = match self.seed {
            Some(s) => Box::new(StdRng::seed_from_u64(s)),
            None => Box::new(rand::rng()),
        };
        let mut engine = LouvainEngine::new(graph, rng);

        let mut best = engine.communities();
        let mut best_modularity = engine.modularity_on_original();

        for level in 0..self.max_levels {
            // Phase 1: local moving
            let mut improved = false;
            for _ in 0..self.max_passes {
                if !engine.perform_one_pass() {
                    break;
                }
                improved = true;
            }
            if !improved {
                break;
            }

            // Keep the level only if the input graph agrees it is better
            let mod_now = engine.modularity_on_original();
            if mod_now - best_modularity < self.min_modularity_gain {
                debug!(
                    "{}: level {level} did not improve modularity ({mod_now:.6})",
                    self.name()
                );
                break;
            }
            best_modularity = mod_now;
            best = engine.communities();

            // Phase 2: aggregate
            engine.aggregate_graph();
        }

        debug!(
            "{}: {} communities, modularity {best_modularity:.6}",
            self.name(),
            best.len()
        );

        // Renumber to consecutive integers
        Ok(best.into_values().enumerate().collect())
    }

    fn name(&self) -> &'static str {
        "louvain"
    }
}
