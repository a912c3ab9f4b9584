//! The class dependency graph.

mod builder;
mod parallel_builder;

pub use builder::{BuildOutput, GraphBuilder};
pub use parallel_builder::ParallelGraphBuilder;

use crate::classfile::QualifiedName;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Directed graph of direct references between units of one universe.
///
/// Built once per scan and immutable afterwards. All exported views are
/// sorted so repeated scans over the same archive produce identical output.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    inner: DiGraph<QualifiedName, ()>,
    node_map: HashMap<QualifiedName, NodeIndex>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensure a node exists for `name`.
    pub fn add_unit(&mut self, name: QualifiedName) -> NodeIndex {
        match self.node_map.get(&name) {
            Some(&index) => index,
            None => {
                let index = self.inner.add_node(name.clone());
                self.node_map.insert(name, index);
                index
            }
        }
    }

    /// Record that `from` directly references `to`. Parallel edges collapse.
    pub fn add_dependency(&mut self, from: QualifiedName, to: QualifiedName) {
        let from_index = self.add_unit(from);
        let to_index = self.add_unit(to);
        self.inner.update_edge(from_index, to_index, ());
    }

    pub fn contains(&self, name: &QualifiedName) -> bool {
        self.node_map.contains_key(name)
    }

    pub fn contains_edge(&self, from: &QualifiedName, to: &QualifiedName) -> bool {
        match (self.node_map.get(from), self.node_map.get(to)) {
            (Some(&from_index), Some(&to_index)) => self.inner.contains_edge(from_index, to_index),
            _ => false,
        }
    }

    /// Names this unit directly references.
    pub fn dependencies_of(&self, name: &QualifiedName) -> BTreeSet<QualifiedName> {
        self.neighbors(name, petgraph::Direction::Outgoing)
    }

    /// Names that directly reference this unit.
    pub fn dependents_of(&self, name: &QualifiedName) -> BTreeSet<QualifiedName> {
        self.neighbors(name, petgraph::Direction::Incoming)
    }

    fn neighbors(
        &self,
        name: &QualifiedName,
        direction: petgraph::Direction,
    ) -> BTreeSet<QualifiedName> {
        let Some(&index) = self.node_map.get(name) else {
            return BTreeSet::new();
        };
        self.inner
            .neighbors_directed(index, direction)
            .map(|n| self.inner[n].clone())
            .collect()
    }

    pub fn unit_count(&self) -> usize {
        self.inner.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    pub fn units(&self) -> impl Iterator<Item = &QualifiedName> {
        self.node_map.keys()
    }

    /// Sorted name -> direct references view; units without references are
    /// omitted.
    pub fn adjacency(&self) -> BTreeMap<QualifiedName, BTreeSet<QualifiedName>> {
        let mut map = BTreeMap::new();
        for edge in self.inner.edge_references() {
            let from = self.inner[edge.source()].clone();
            let to = self.inner[edge.target()].clone();
            map.entry(from).or_insert_with(BTreeSet::new).insert(to);
        }
        map
    }

    /// Sorted name -> referencing-units view (the inverse adjacency).
    pub fn inverse_adjacency(&self) -> BTreeMap<QualifiedName, BTreeSet<QualifiedName>> {
        let mut map = BTreeMap::new();
        for edge in self.inner.edge_references() {
            let from = self.inner[edge.source()].clone();
            let to = self.inner[edge.target()].clone();
            map.entry(to).or_insert_with(BTreeSet::new).insert(from);
        }
        map
    }

    /// The underlying petgraph for algorithms that want it.
    pub fn inner(&self) -> &DiGraph<QualifiedName, ()> {
        &self.inner
    }
}
