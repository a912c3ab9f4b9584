// Mutual dependency detector
//
// Reports pairs of units that directly reference each other. Deliberately
// limited to two-node cycles: a chain A -> B -> C -> A is not a mutual
// pair and is not reported.

use crate::classfile::QualifiedName;
use crate::graph::DependencyGraph;
use petgraph::visit::EdgeRef;
use serde::Serialize;
use std::fmt;

/// An unordered pair of units that reference each other, normalized so
/// that `a < b`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct MutualPair {
    pub a: QualifiedName,
    pub b: QualifiedName,
}

impl MutualPair {
    pub fn new(first: QualifiedName, second: QualifiedName) -> Self {
        if first <= second {
            Self { a: first, b: second }
        } else {
            Self { a: second, b: first }
        }
    }
}

impl fmt::Display for MutualPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <-> {}", self.a, self.b)
    }
}

/// Detector for mutual (two-node) dependency pairs.
pub struct CycleDetector;

impl CycleDetector {
    pub fn new() -> Self {
        Self
    }

    /// Every unordered pair {A, B} with an edge in both directions, each
    /// emitted exactly once, sorted.
    pub fn find_mutual_pairs(&self, graph: &DependencyGraph) -> Vec<MutualPair> {
        let inner = graph.inner();
        let mut pairs: Vec<MutualPair> = inner
            .edge_references()
            .filter_map(|edge| {
                let from = &inner[edge.source()];
                let to = &inner[edge.target()];
                // visit each pair from its lexicographically smaller side
                if from < to && inner.contains_edge(edge.target(), edge.source()) {
                    Some(MutualPair::new(from.clone(), to.clone()))
                } else {
                    None
                }
            })
            .collect();
        pairs.sort();
        pairs.dedup();
        pairs
    }
}

impl Default for CycleDetector {
    fn default() -> Self {
        Self::new()
    }
}
