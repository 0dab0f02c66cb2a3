//! Community detection algorithms for graphs.
//!
//! Given a graph, find natural groupings where nodes within groups are
//! densely connected, and connections between groups are sparse.
//!
//! ## The Modularity Objective
//!
//! Louvain and Girvan-Newman score partitions by **modularity** Q, which
//! compares the weight inside communities to the weight expected in a random
//! graph with the same degree sequence:
//!
//! ```text
//! Q = Σ_c [ L_c / m - (D_c / 2m)² ]
//! ```
//!
//! Where:
//! - m = total edge weight (each edge counted once)
//! - L_c = weight of edges inside community c
//! - D_c = summed weighted degree of community c
//!
//! **Intuition**: a good partition has Q > 0, meaning more internal weight
//! than expected by chance. A single community covering a connected graph
//! always has Q = 0.
//!
//! ## Algorithms
//!
//! ### Louvain
//!
//! Greedy local moves followed by graph coarsening
//! ([Blondel et al. 2008](https://arxiv.org/abs/0803.0476)). Fast, but can
//! produce disconnected communities.
//!
//! ### Girvan-Newman
//!
//! Divisive: remove the edge with the highest betweenness, one per step,
//! and keep the best-modularity partition of connected components. Exact but
//! O(m² n) to exhaustion; suited to small graphs.
//!
//! ### Label Propagation
//!
//! O(E) per iteration: each node adopts the most common label among its
//! neighbors. Fast but approximate, and non-deterministic unless the random
//! source is fixed.
//!
//! ### Clique Percolation
//!
//! Communities are unions of k-cliques chained through (k-1)-node overlaps.
//! The only method here that yields **overlapping** communities.
//!
//! ## Engines and detectors
//!
//! Every algorithm has a stepwise engine (one pass, step or iteration per
//! call) for callers that report progress or cancel between steps, and a
//! builder-style detector implementing [`CommunityDetection`] that runs the
//! engine to convergence.
//!
//! ## Usage
//!
//! ```rust
//! use commune::community::{CommunityDetection, Louvain};
//! use commune::WeightedGraph;
//!
//! // Two triangles joined by a bridge
//! let graph = WeightedGraph::from_edges([
//!     (0, 1, 1.0), (1, 2, 1.0), (0, 2, 1.0),
//!     (3, 4, 1.0), (4, 5, 1.0), (3, 5, 1.0),
//!     (2, 3, 1.0),
//! ]);
//!
//! let communities = Louvain::new().with_seed(42).detect(&graph).unwrap();
//! assert_eq!(communities.len(), 2);
//! ```
//!
//! ## References
//!
//! - Blondel et al. (2008). "Fast unfolding of communities in large networks."
//! - Newman & Girvan (2004). "Finding and evaluating community structure in networks."
//! - Raghavan, Albert, Kumara (2007). "Near linear time algorithm to detect
//!   community structures in large-scale networks."
//! - Palla et al. (2005). "Uncovering the overlapping community structure of
//!   complex networks in nature and society."

mod clique;
mod girvan_newman;
mod label_prop;
mod louvain;
mod partition;
mod traits;

pub use clique::{Clique, CliqueEngine, CliquePercolation};
pub use girvan_newman::{
    connected_components, edge_betweenness, EdgeKey, GirvanNewman, GirvanNewmanEngine,
    PartitionRecord,
};
pub use label_prop::{LabelPropagation, LabelPropagationEngine, Voting};
pub use louvain::{Louvain, LouvainEngine};
pub use partition::{group_by_label, modularity, node_assignment, Partition};
pub use traits::CommunityDetection;
