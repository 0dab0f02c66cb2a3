//! Label propagation for community detection.
//!
//! Very fast O(E) per iteration: every node adopts the most common label
//! among its neighbors. Updates are synchronous, so each iteration reads the
//! labels as they stood when it started.
//!
//! Convergence is not guaranteed. Random tie-breaking can make labels
//! oscillate (a single edge swaps labels forever); that is a property of the
//! method, reported as "still changing", not as an error.

use super::partition::{group_by_label, Partition};
use super::traits::CommunityDetection;
use crate::error::{Error, Result};
use crate::graph::{NodeId, WeightedGraph};
use log::{debug, trace};
use rand::prelude::*;
use std::collections::BTreeMap;

/// Votes whose weights differ by less than this are ties.
const TIE_EPSILON: f64 = 1e-9;

/// How neighbor votes are counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Voting {
    /// Each neighbor casts one vote.
    #[default]
    Unweighted,
    /// Each neighbor's vote counts its edge weight.
    Weighted,
}

/// Stepwise label propagation over a borrowed graph.
pub struct LabelPropagationEngine<'a, R> {
    graph: &'a WeightedGraph,
    labels: BTreeMap<NodeId, usize>,
    iteration: usize,
    voting: Voting,
    rng: R,
}

impl<'a, R: Rng> LabelPropagationEngine<'a, R> {
    /// Start with every node labelled by its own id.
    pub fn new(graph: &'a WeightedGraph, rng: R) -> Self {
        Self {
            graph,
            labels: initial_labels(graph),
            iteration: 0,
            voting: Voting::default(),
            rng,
        }
    }

    /// Set the voting rule.
    pub fn with_voting(mut self, voting: Voting) -> Self {
        self.voting = voting;
        self
    }

    /// Run one synchronous iteration.
    ///
    /// Returns `true` if any label changed.
    pub fn iterate(&mut self) -> bool {
        let mut order: Vec<NodeId> = self.graph.nodes().collect();
        order.shuffle(&mut self.rng);

        let mut next = self.labels.clone();
        let mut changed = false;

        for node in order {
            let new_label = most_frequent_label(
                self.graph,
                &self.labels,
                node,
                self.voting,
                &mut self.rng,
            );
            if self.labels.get(&node) != Some(&new_label) {
                trace!("node {node}: label -> {new_label}");
                changed = true;
            }
            let _ = next.insert(node, new_label);
        }

        self.labels = next;
        self.iteration += 1;
        changed
    }

    /// Current label of `node`, or `None` if it is not in the graph.
    pub fn label(&self, node: NodeId) -> Option<usize> {
        self.labels.get(&node).copied()
    }

    /// Label -> member nodes.
    pub fn communities(&self) -> Partition {
        group_by_label(&self.labels)
    }

    /// Number of iterations run since construction or the last reset.
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    /// Restore singleton labels and zero the iteration counter.
    pub fn reset(&mut self) {
        self.labels = initial_labels(self.graph);
        self.iteration = 0;
    }
}

fn initial_labels(graph: &WeightedGraph) -> BTreeMap<NodeId, usize> {
    graph.nodes().map(|n| (n, n)).collect()
}

/// Most common label among the neighbors of `node` in `labels`.
///
/// Ties are broken uniformly at random; a node without neighbors keeps its
/// label.
fn most_frequent_label<R: Rng + ?Sized>(
    graph: &WeightedGraph,
    labels: &BTreeMap<NodeId, usize>,
    node: NodeId,
    voting: Voting,
    rng: &mut R,
) -> usize {
    let own = labels.get(&node).copied().unwrap_or(node);

    let mut votes: BTreeMap<usize, f64> = BTreeMap::new();
    for (neighbor, w) in graph.weighted_neighbors(node) {
        let Some(&label) = labels.get(&neighbor) else {
            continue;
        };
        let vote = match voting {
            Voting::Unweighted => 1.0,
            Voting::Weighted => w,
        };
        *votes.entry(label).or_insert(0.0) += vote;
    }

    if votes.is_empty() {
        return own;
    }

    let max_vote = votes.values().copied().fold(f64::NEG_INFINITY, f64::max);
    let candidates: Vec<usize> = votes
        .iter()
        .filter(|(_, &v)| (v - max_vote).abs() < TIE_EPSILON)
        .map(|(&label, _)| label)
        .collect();

    if candidates.len() == 1 {
        candidates[0]
    } else {
        candidates[rng.random_range(0..candidates.len())]
    }
}

/// Label propagation community detection.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LabelPropagation {
    /// Maximum iterations.
    max_iter: usize,
    /// Random seed.
    seed: Option<u64>,
    /// Vote counting rule.
    voting: Voting,
}

impl LabelPropagation {
    /// Create a new label propagation detector.
    pub fn new() -> Self {
        Self {
            max_iter: 100,
            seed: None,
            voting: Voting::Unweighted,
        }
    }

    /// Set maximum iterations.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the voting rule.
    pub fn with_voting(mut self, voting: Voting) -> Self {
        self.voting = voting;
        self
    }
}

impl Default for LabelPropagation {
    fn default() -> Self {
        Self::new()
    }
}

impl CommunityDetection for LabelPropagation {
    fn detect(&self, graph: &WeightedGraph) -> Result<Partition> {
        if graph.is_empty() {
            return Err(Error::EmptyInput);
        }
        if self.max_iter == 0 {
            return Err(Error::invalid_parameter("max_iter", "must be positive"));
        }

        let rng: Box<dyn RngCore> = match self.seed {
            Some(s) => Box::new(StdRng::seed_from_u64(s)),
            None => Box::new(rand::rng()),
        };
        let mut engine = LabelPropagationEngine::new(graph, rng).with_voting(self.voting);

        let mut converged = false;
        while engine.iteration() < self.max_iter {
            if !engine.iterate() {
                converged = true;
                break;
            }
        }

        if converged {
            debug!(
                "{}: converged after {} iterations",
                self.name(),
                engine.iteration()
            );
        } else {
            debug!(
                "{}: still changing after {} iterations",
                self.name(),
                self.max_iter
            );
        }

        // Renumber to consecutive integers
        Ok(engine.communities().into_values().enumerate().collect())
    }

    fn name(&self) -> &'static str {
        "label_propagation"
    }
}
