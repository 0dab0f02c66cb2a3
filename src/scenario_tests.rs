#[cfg(test)]
mod tests {
    use crate::community::{
        modularity, CliqueEngine, CommunityDetection, GirvanNewmanEngine, LabelPropagation,
        LabelPropagationEngine, Louvain, LouvainEngine,
    };
    use crate::graph::{NodeId, WeightedGraph};
    use crate::test_utils::{isolated_node, two_triangles, ZeroRng};
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::BTreeSet;

    fn set(nodes: &[NodeId]) -> BTreeSet<NodeId> {
        nodes.iter().copied().collect()
    }

    fn graph_from_pairs(n: usize, pairs: &[(usize, usize)]) -> WeightedGraph {
        let mut g = WeightedGraph::new();
        for u in 0..n {
            g.add_node(u);
        }
        for &(u, v) in pairs {
            if u != v {
                g.add_unit_edge(u, v);
            }
        }
        g
    }

    /// Random graph on `0..n` made connected by a path through all nodes.
    fn connected_component(offset: usize, n: usize, pairs: &[(usize, usize)]) -> WeightedGraph {
        let mut g = WeightedGraph::new();
        for u in 1..n {
            g.add_unit_edge(offset + u - 1, offset + u);
        }
        for &(u, v) in pairs {
            if u != v && u < n && v < n {
                g.add_unit_edge(offset + u, offset + v);
            }
        }
        g
    }

    fn covers_exactly_once(
        graph: &WeightedGraph,
        communities: &crate::community::Partition,
    ) -> bool {
        let mut seen = BTreeSet::new();
        for members in communities.values() {
            for &n in members {
                if !seen.insert(n) {
                    return false;
                }
            }
        }
        seen == graph.nodes().collect()
    }

    #[test]
    fn two_disjoint_triangles_across_engines() {
        let g = two_triangles();

        let cliques = CliqueEngine::new(&g);
        assert_eq!(
            cliques.enumerate_maximal_cliques(),
            &[set(&[0, 1, 2]), set(&[3, 4, 5])]
        );

        let mut lpa = LabelPropagationEngine::new(&g, ZeroRng);
        let _ = lpa.iterate();
        let _ = lpa.iterate();
        let groups: Vec<_> = lpa.communities().into_values().collect();
        assert_eq!(groups, vec![set(&[0, 1, 2]), set(&[3, 4, 5])]);

        let mut louvain = LouvainEngine::new(&g, StdRng::seed_from_u64(42));
        assert!(louvain.perform_one_pass());
        assert!(louvain.compute_modularity() > 0.3);

        let mut gn = GirvanNewmanEngine::new(&g);
        assert!(gn.perform_one_step());
        assert_eq!(gn.current_step(), 1);
        assert_eq!(gn.remaining_edge_count(), 5);
    }

    #[test]
    fn isolated_node_across_engines() {
        let g = isolated_node();

        let mut louvain = LouvainEngine::new(&g, ZeroRng);
        assert!(!louvain.perform_one_pass());
        assert_eq!(louvain.num_communities(), 1);
        assert_eq!(louvain.compute_modularity(), 0.0);

        let gn = GirvanNewmanEngine::new(&g);
        assert_eq!(gn.current_communities().len(), 1);
        assert_eq!(gn.max_modularity(), 0.0);

        let mut lpa = LabelPropagationEngine::new(&g, ZeroRng);
        assert!(!lpa.iterate());
        assert_eq!(lpa.communities().len(), 1);

        let mut cpm = CliqueEngine::new(&g);
        assert!(cpm.enumerate_maximal_cliques().is_empty());
        assert!(cpm.find_communities(2).unwrap().is_empty());
    }

    #[test]
    fn lpa_result_scored_with_shared_modularity() {
        let g = two_triangles();
        let communities = LabelPropagation::new()
            .with_seed(3)
            .detect(&g)
            .unwrap();
        // The two triangles are the optimum (Q = 0.5)
        let q = modularity(&g, &communities);
        assert!(q <= 0.5 + 1e-12);
        assert!(communities.len() >= 2);
    }

    proptest! {
        #[test]
        fn maximal_cliques_are_complete_and_maximal(
            pairs in proptest::collection::vec((0usize..9, 0usize..9), 0..30),
        ) {
            let g = graph_from_pairs(9, &pairs);
            let engine = CliqueEngine::new(&g);
            let cliques = engine.enumerate_maximal_cliques();

            for (i, clique) in cliques.iter().enumerate() {
                prop_assert!(clique.len() >= 2);
                for &u in clique {
                    for &v in clique {
                        prop_assert!(u == v || g.has_edge(u, v));
                    }
                }
                // No outside node extends it
                for n in g.nodes().filter(|n| !clique.contains(n)) {
                    prop_assert!(!clique.iter().all(|&c| g.has_edge(n, c)));
                }
                for (j, other) in cliques.iter().enumerate() {
                    if i != j {
                        prop_assert!(!clique.is_subset(other));
                    }
                }
            }

            // Every edge lies in some maximal clique
            for (u, v, _) in g.edges() {
                prop_assert!(cliques.iter().any(|c| c.contains(&u) && c.contains(&v)));
            }
        }

        #[test]
        fn cpm_communities_are_unions_of_k_cliques(
            pairs in proptest::collection::vec((0usize..9, 0usize..9), 0..30),
            k in 2usize..5,
        ) {
            let g = graph_from_pairs(9, &pairs);
            let mut engine = CliqueEngine::new(&g);
            let communities = engine.find_communities(k).unwrap();
            let k_cliques: Vec<_> = engine
                .cliques_of_size_at_least(k)
                .into_iter()
                .cloned()
                .collect();

            prop_assert!(communities.len() <= k_cliques.len());
            for clique in &k_cliques {
                prop_assert!(communities.values().any(|c| clique.is_subset(c)));
            }
            for members in communities.values() {
                let union: BTreeSet<NodeId> = k_cliques
                    .iter()
                    .filter(|c| c.is_subset(members))
                    .flatten()
                    .copied()
                    .collect();
                prop_assert_eq!(&union, members);
            }
        }

        #[test]
        fn girvan_newman_removes_one_edge_per_step(
            pairs in proptest::collection::vec((0usize..7, 0usize..7), 0..14),
        ) {
            let g = graph_from_pairs(7, &pairs);
            let mut engine = GirvanNewmanEngine::new(&g);
            let mut edges = engine.remaining_edge_count();
            let mut best = engine.max_modularity();

            while engine.perform_one_step() {
                prop_assert_eq!(engine.remaining_edge_count(), edges - 1);
                prop_assert!(engine.max_modularity() >= best);
                prop_assert!(engine.max_modularity() >= engine.current_modularity());
                edges = engine.remaining_edge_count();
                best = engine.max_modularity();
            }

            prop_assert_eq!(engine.current_step(), g.edge_count());
            prop_assert_eq!(engine.current_communities().len(), g.node_count());
            prop_assert!(covers_exactly_once(&g, engine.best_communities()));
        }

        #[test]
        fn lpa_never_merges_components(
            left in proptest::collection::vec((0usize..6, 0usize..6), 0..10),
            right in proptest::collection::vec((0usize..6, 0usize..6), 0..10),
            seed in any::<u64>(),
        ) {
            let mut g = connected_component(0, 6, &left);
            for (u, v, w) in connected_component(10, 6, &right).edges() {
                g.add_edge(u, v, w);
            }

            let communities = LabelPropagation::new()
                .with_seed(seed)
                .with_max_iter(50)
                .detect(&g)
                .unwrap();

            prop_assert!(communities.len() >= 2);
            prop_assert!(covers_exactly_once(&g, &communities));
            for members in communities.values() {
                let left_side = members.iter().all(|&n| n < 10);
                let right_side = members.iter().all(|&n| n >= 10);
                prop_assert!(left_side || right_side);
            }
        }

        #[test]
        fn louvain_partitions_every_node(
            pairs in proptest::collection::vec((0usize..10, 0usize..10), 0..25),
            seed in any::<u64>(),
        ) {
            let g = graph_from_pairs(10, &pairs);
            let communities = Louvain::new().with_seed(seed).detect(&g).unwrap();
            prop_assert!(covers_exactly_once(&g, &communities));

            // Never worse than leaving every node alone
            let singletons = g.nodes().enumerate().map(|(i, n)| (i, set(&[n]))).collect();
            prop_assert!(modularity(&g, &communities) >= modularity(&g, &singletons) - 1e-12);
        }
    }
}
