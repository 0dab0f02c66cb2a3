//! Community detection traits.

use super::partition::Partition;
use crate::error::Result;
use crate::graph::WeightedGraph;

/// One-shot community detection: drive an engine to convergence and return
/// its final partition.
pub trait CommunityDetection {
    /// Detect communities in a graph.
    ///
    /// Returns a mapping from community ID to member nodes.
    fn detect(&self, graph: &WeightedGraph) -> Result<Partition>;

    /// Short algorithm name, used in log output.
    fn name(&self) -> &'static str;
}
