//! Shared fixtures for unit tests.

use crate::graph::{NodeId, WeightedGraph};
use rand::RngCore;

/// RNG that only ever yields zero bits.
///
/// `random_range(0..n)` always returns 0 with it, so tie-breaks pick the
/// first (lowest) candidate.
pub struct ZeroRng;

impl RngCore for ZeroRng {
    fn next_u32(&mut self) -> u32 {
        0
    }

    fn next_u64(&mut self) -> u64 {
        0
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        dst.fill(0);
    }
}

/// Two disjoint unit-weight triangles {0,1,2} and {3,4,5}.
pub fn two_triangles() -> WeightedGraph {
    WeightedGraph::from_edges([
        (0, 1, 1.0),
        (1, 2, 1.0),
        (0, 2, 1.0),
        (3, 4, 1.0),
        (4, 5, 1.0),
        (3, 5, 1.0),
    ])
}

/// Two triangles joined by the bridge 2 -- 3.
pub fn bridged_triangles() -> WeightedGraph {
    let mut g = two_triangles();
    g.add_unit_edge(2, 3);
    g
}

/// Complete graph on `0..n`.
pub fn complete(n: NodeId) -> WeightedGraph {
    let mut g = WeightedGraph::new();
    for u in 0..n {
        g.add_node(u);
        for v in (u + 1)..n {
            g.add_unit_edge(u, v);
        }
    }
    g
}

/// Single node, no edges.
pub fn isolated_node() -> WeightedGraph {
    let mut g = WeightedGraph::new();
    g.add_node(0);
    g
}
