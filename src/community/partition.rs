//! Modularity and partition helpers shared by the detectors.

use crate::graph::{NodeId, WeightedGraph};
use std::collections::{BTreeMap, BTreeSet};

/// Community id -> member nodes.
///
/// Disjoint for Louvain, Girvan-Newman and label propagation; possibly
/// overlapping for clique percolation.
pub type Partition = BTreeMap<usize, BTreeSet<NodeId>>;

/// Modularity of `partition` on `graph`.
///
/// ```text
/// Q = Σ_c [ L_c / m - (D_c / 2m)² ]
/// ```
///
/// where `L_c` is the weight of edges with both endpoints in `c`, `D_c` the
/// summed weighted degree of `c`, and `m` the total edge weight. Returns 0.0
/// for a graph without edge weight.
pub fn modularity(graph: &WeightedGraph, partition: &Partition) -> f64 {
    let m = graph.total_weight();
    if m == 0.0 {
        return 0.0;
    }

    partition
        .values()
        .map(|members| {
            let mut internal = 0.0;
            let mut degree = 0.0;
            for &i in members {
                degree += graph.weighted_degree(i);
                internal += graph
                    .weighted_neighbors(i)
                    .filter(|&(j, _)| i < j && members.contains(&j))
                    .map(|(_, w)| w)
                    .sum::<f64>();
            }
            internal / m - (degree / (2.0 * m)).powi(2)
        })
        .sum()
}

/// Invert a non-overlapping partition into node -> community id.
///
/// For overlapping partitions the highest community id containing a node wins.
pub fn node_assignment(partition: &Partition) -> BTreeMap<NodeId, usize> {
    partition
        .iter()
        .flat_map(|(&c, members)| members.iter().map(move |&n| (n, c)))
        .collect()
}

/// Group a node -> label map into a partition keyed by label.
pub fn group_by_label(labels: &BTreeMap<NodeId, usize>) -> Partition {
    let mut out = Partition::new();
    for (&node, &label) in labels {
        let _ = out.entry(label).or_default().insert(node);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_triangles() -> WeightedGraph {
        WeightedGraph::from_edges([
            (0, 1, 1.0),
            (1, 2, 1.0),
            (0, 2, 1.0),
            (3, 4, 1.0),
            (4, 5, 1.0),
            (3, 5, 1.0),
        ])
    }

    fn partition(groups: &[&[NodeId]]) -> Partition {
        groups
            .iter()
            .enumerate()
            .map(|(c, g)| (c, g.iter().copied().collect()))
            .collect()
    }

    #[test]
    fn test_modularity_two_triangles() {
        let g = two_triangles();
        let q = modularity(&g, &partition(&[&[0, 1, 2], &[3, 4, 5]]));
        // Each triangle: 3/6 - (6/12)^2 = 0.25
        assert!((q - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_modularity_single_community_is_zero() {
        let g = two_triangles();
        let q = modularity(&g, &partition(&[&[0, 1, 2, 3, 4, 5]]));
        assert!(q.abs() < 1e-12);
    }

    #[test]
    fn test_modularity_no_edges() {
        let mut g = WeightedGraph::new();
        g.add_node(0);
        assert_eq!(modularity(&g, &partition(&[&[0]])), 0.0);
    }

    #[test]
    fn test_modularity_singletons_negative() {
        let g = two_triangles();
        let q = modularity(&g, &partition(&[&[0], &[1], &[2], &[3], &[4], &[5]]));
        assert!(q < 0.0);
    }

    #[test]
    fn test_assignment_and_grouping_invert() {
        let p = partition(&[&[0, 2], &[1]]);
        let labels = node_assignment(&p);
        assert_eq!(labels[&0], 0);
        assert_eq!(labels[&1], 1);
        assert_eq!(group_by_label(&labels), p);
    }
}
