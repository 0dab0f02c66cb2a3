//! Maximal cliques and clique percolation (CPM).
//!
//! CPM defines a community as the union of k-cliques that can reach each
//! other through a chain of adjacent k-cliques, where two k-cliques are
//! adjacent when they share k-1 nodes. Unlike the modularity methods,
//! communities may overlap and nodes outside any k-clique belong to none.
//!
//! ## Algorithm
//!
//! 1. Enumerate all maximal cliques (Bron-Kerbosch with pivoting).
//! 2. Keep cliques with at least k members.
//! 3. Connect cliques sharing at least k-1 nodes.
//! 4. Each connected component of that clique graph is one community.
//!
//! Maximal clique enumeration is exponential in the worst case; it is fast
//! on sparse graphs.
//!
//! ## References
//!
//! - Bron & Kerbosch (1973). "Algorithm 457: finding all cliques of an
//!   undirected graph."
//! - Palla et al. (2005). "Uncovering the overlapping community structure of
//!   complex networks in nature and society." Nature 435.

use super::partition::Partition;
use super::traits::CommunityDetection;
use crate::error::{Error, Result};
use crate::graph::{NodeId, WeightedGraph};
use log::debug;
use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::OnceLock;

/// A set of pairwise adjacent nodes.
pub type Clique = BTreeSet<NodeId>;

type Adjacency = BTreeMap<NodeId, BTreeSet<NodeId>>;

/// Clique enumeration and percolation over a borrowed graph.
///
/// The graph cannot change while borrowed, so the maximal cliques are
/// enumerated once and reused for every `k`.
pub struct CliqueEngine<'a> {
    graph: &'a WeightedGraph,
    cliques: OnceLock<Vec<Clique>>,
    communities: Option<Partition>,
}

impl<'a> CliqueEngine<'a> {
    /// Create an engine for `graph`.
    pub fn new(graph: &'a WeightedGraph) -> Self {
        Self {
            graph,
            cliques: OnceLock::new(),
            communities: None,
        }
    }

    /// All maximal cliques with at least two members, sorted and
    /// duplicate-free.
    pub fn enumerate_maximal_cliques(&self) -> &[Clique] {
        self.cliques.get_or_init(|| {
            let cliques = maximal_cliques(self.graph);
            debug!("cliques: {} maximal cliques", cliques.len());
            cliques
        })
    }

    /// Maximal cliques with at least `k` members.
    pub fn cliques_of_size_at_least(&self, k: usize) -> Vec<&Clique> {
        self.enumerate_maximal_cliques()
            .iter()
            .filter(|c| c.len() >= k)
            .collect()
    }

    /// Maximal cliques containing `node`.
    pub fn cliques_containing(&self, node: NodeId) -> Vec<&Clique> {
        self.enumerate_maximal_cliques()
            .iter()
            .filter(|c| c.contains(&node))
            .collect()
    }

    /// Overlapping k-clique communities, numbered in discovery order.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidParameter`] if `k < 2`.
    pub fn find_communities(&mut self, k: usize) -> Result<Partition> {
        if k < 2 {
            return Err(Error::invalid_parameter("k", "must be at least 2"));
        }

        let k_cliques = self.cliques_of_size_at_least(k);
        let n = k_cliques.len();

        // Clique graph: adjacent when sharing at least k-1 nodes
        let mut adjacent: Vec<Vec<usize>> = vec![Vec::new(); n];
        for i in 0..n {
            for j in (i + 1)..n {
                if k_cliques[i].intersection(k_cliques[j]).count() >= k - 1 {
                    adjacent[i].push(j);
                    adjacent[j].push(i);
                }
            }
        }

        let mut communities = Partition::new();
        let mut visited = vec![false; n];
        for start in 0..n {
            if visited[start] {
                continue;
            }
            visited[start] = true;

            let mut members = BTreeSet::new();
            let mut queue = VecDeque::from([start]);
            while let Some(current) = queue.pop_front() {
                members.extend(k_cliques[current].iter().copied());
                for &next in &adjacent[current] {
                    if !visited[next] {
                        visited[next] = true;
                        queue.push_back(next);
                    }
                }
            }
            let _ = communities.insert(communities.len(), members);
        }

        debug!(
            "cpm: k = {k}, {n} k-cliques -> {} communities",
            communities.len()
        );
        self.communities = Some(communities.clone());
        Ok(communities)
    }

    /// Result of the last successful [`find_communities`](Self::find_communities).
    pub fn communities(&self) -> Option<&Partition> {
        self.communities.as_ref()
    }

    /// Whether [`find_communities`](Self::find_communities) has produced a result.
    pub fn has_results(&self) -> bool {
        self.communities.is_some()
    }
}

/// Enumerate maximal cliques of `graph`, ignoring self-loops.
fn maximal_cliques(graph: &WeightedGraph) -> Vec<Clique> {
    let adj: Adjacency = graph
        .nodes()
        .map(|n| (n, graph.neighbors(n).filter(|&m| m != n).collect()))
        .collect();

    let mut cliques = Vec::new();
    let p: BTreeSet<NodeId> = adj.keys().copied().collect();
    bron_kerbosch(&adj, BTreeSet::new(), p, BTreeSet::new(), &mut cliques);
    cliques.sort();
    cliques
}

/// Bron-Kerbosch with pivoting.
///
/// `r`: current clique, `p`: candidates, `x`: already explored.
fn bron_kerbosch(
    adj: &Adjacency,
    r: Clique,
    mut p: BTreeSet<NodeId>,
    mut x: BTreeSet<NodeId>,
    cliques: &mut Vec<Clique>,
) {
    // P ∪ X empty: R cannot be extended
    let Some(pivot) = p
        .union(&x)
        .copied()
        .max_by_key(|u| (adj[u].len(), Reverse(*u)))
    else {
        if r.len() >= 2 {
            cliques.push(r);
        }
        return;
    };

    // Branch only on candidates outside the pivot's neighborhood
    let candidates: Vec<NodeId> = p.difference(&adj[&pivot]).copied().collect();

    for v in candidates {
        let neighbors = &adj[&v];
        let mut next_r = r.clone();
        let _ = next_r.insert(v);
        let next_p = p.intersection(neighbors).copied().collect();
        let next_x = x.intersection(neighbors).copied().collect();

        bron_kerbosch(adj, next_r, next_p, next_x, cliques);

        let _ = p.remove(&v);
        let _ = x.insert(v);
    }
}

/// Clique percolation community detection.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CliquePercolation {
    /// Clique size threshold.
    k: usize,
}

impl CliquePercolation {
    /// Create a detector percolating triangles (k = 3).
    pub fn new() -> Self {
        Self { k: 3 }
    }

    /// Set the clique size.
    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }
}

impl Default for CliquePercolation {
    fn default() -> Self {
        Self::new()
    }
}

impl CommunityDetection for CliquePercolation {
    fn detect(&self, graph: &WeightedGraph) -> Result<Partition> {
        if graph.is_empty() {
            return Err(Error::EmptyInput);
        }
        CliqueEngine::new(graph).find_communities(self.k)
    }

    fn name(&self) -> &'static str {
        "clique_percolation"
    }
}
