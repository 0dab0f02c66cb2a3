//! # commune
//!
//! Community detection on weighted undirected graphs: Louvain, Girvan-Newman,
//! label propagation, and clique percolation over one shared
//! [`WeightedGraph`].
//!
//! Each algorithm comes as a stepwise engine driven by the caller and as a
//! one-shot detector implementing [`CommunityDetection`]. Randomized engines
//! take their random source at construction, so a seeded RNG makes every run
//! reproducible.

pub mod community;
/// Error types used across `commune`.
pub mod error;
pub mod graph;

#[cfg(test)]
mod scenario_tests;
#[cfg(test)]
mod test_utils;

pub use error::{Error, Result};
pub use graph::{NodeId, WeightedGraph};

pub use community::{
    modularity, CliqueEngine, CliquePercolation, CommunityDetection, GirvanNewman,
    GirvanNewmanEngine, LabelPropagation, LabelPropagationEngine, Louvain, LouvainEngine,
    Partition,
};
