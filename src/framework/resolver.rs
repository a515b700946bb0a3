//! # Dependency Resolver
//!
//! Computes the bootstrap sequence: an order in which every component appears
//! strictly after all of its dependencies.
//!
//! ## Algorithm
//! Wave-based topological sort (Kahn):
//!
//! ```text
//! ready  = { ids with no remaining dependency }
//! while ready ≠ ∅:
//!     append ready to the sequence (ascending id order)
//!     for each dependent of a ready id: remaining -= 1
//!     ready = dependents whose remaining reached 0
//! if some ids were never appended → CircularDependency(those ids)
//! ```
//!
//! Each edge is visited once, so resolution is O(V + E) plus the per-wave sort.
//! Ties between simultaneously ready identifiers are broken by identifier order,
//! which makes the sequence a pure function of the graph.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use crate::framework::OrchestratorError;

/// Identifier → dependency set. Consumed by [`resolve`](DependencyGraph::resolve).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyGraph {
    edges: BTreeMap<String, BTreeSet<String>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node; dependencies are merged if the node already exists.
    pub fn add<I, S>(&mut self, id: impl Into<String>, dependencies: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.edges
            .entry(id.into())
            .or_default()
            .extend(dependencies.into_iter().map(Into::into));
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Resolves the graph into a [`BootstrapSequence`].
    ///
    /// # Errors
    /// - [`OrchestratorError::MissingDependency`] if an edge points at an unknown id
    /// - [`OrchestratorError::CircularDependency`] with every id left unresolved
    pub fn resolve(self) -> Result<BootstrapSequence, OrchestratorError> {
        for (id, deps) in &self.edges {
            if let Some(missing) = deps.iter().find(|d| !self.edges.contains_key(*d)) {
                return Err(OrchestratorError::MissingDependency {
                    component: id.clone(),
                    dependency: missing.clone(),
                });
            }
        }

        // Arena indices follow BTreeMap order, so lower index == smaller id.
        let ids: Vec<String> = self.edges.keys().cloned().collect();
        let index: HashMap<&str, usize> = ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.as_str(), i))
            .collect();

        let mut remaining = vec![0usize; ids.len()];
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); ids.len()];
        for (node, deps) in self.edges.values().enumerate() {
            remaining[node] = deps.len();
            for dep in deps {
                dependents[index[dep.as_str()]].push(node);
            }
        }

        let mut ready: Vec<usize> = (0..ids.len()).filter(|&i| remaining[i] == 0).collect();
        let mut order: Vec<usize> = Vec::with_capacity(ids.len());

        while !ready.is_empty() {
            let mut next = Vec::new();
            for &node in &ready {
                for &dependent in &dependents[node] {
                    remaining[dependent] -= 1;
                    if remaining[dependent] == 0 {
                        next.push(dependent);
                    }
                }
            }
            order.extend_from_slice(&ready);
            next.sort_unstable();
            ready = next;
        }

        if order.len() < ids.len() {
            let unresolved = (0..ids.len())
                .filter(|&i| remaining[i] > 0)
                .map(|i| ids[i].clone())
                .collect();
            return Err(OrchestratorError::CircularDependency { unresolved });
        }

        let mut slots: Vec<Option<String>> = ids.into_iter().map(Some).collect();
        Ok(BootstrapSequence(
            order.into_iter().filter_map(|i| slots[i].take()).collect(),
        ))
    }
}

impl<K, D, S> FromIterator<(K, D)> for DependencyGraph
where
    K: Into<String>,
    D: IntoIterator<Item = S>,
    S: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, D)>>(iter: I) -> Self {
        let mut graph = DependencyGraph::new();
        for (id, deps) in iter {
            graph.add(id, deps);
        }
        graph
    }
}

/// Dependency-respecting start order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootstrapSequence(Vec<String>);

impl BootstrapSequence {
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Position of `id` in the sequence.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.0.iter().position(|s| s == id)
    }
}

impl fmt::Display for BootstrapSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(edges: &[(&str, &[&str])]) -> DependencyGraph {
        edges
            .iter()
            .map(|(id, deps)| (*id, deps.iter().copied()))
            .collect()
    }

    fn assert_respects_dependencies(source: &DependencyGraph, seq: &BootstrapSequence) {
        for (id, deps) in &source.edges {
            let at = seq.position(id).unwrap();
            for dep in deps {
                assert!(
                    seq.position(dep).unwrap() < at,
                    "{dep} must start before {id} in [{seq}]"
                );
            }
        }
    }

    #[test]
    fn chain_resolves_in_dependency_order() {
        let seq = graph(&[("api", &["cache"]), ("cache", &["db"]), ("db", &[])])
            .resolve()
            .unwrap();
        assert_eq!(seq.as_slice(), ["db", "cache", "api"]);
    }

    #[test]
    fn insertion_order_does_not_matter() {
        let a = graph(&[("db", &[]), ("cache", &["db"]), ("api", &["cache"])]);
        let b = graph(&[("api", &["cache"]), ("db", &[]), ("cache", &["db"])]);
        assert_eq!(a.resolve().unwrap(), b.resolve().unwrap());
    }

    #[test]
    fn simultaneous_ready_ids_are_sorted() {
        let seq = graph(&[
            ("zeta", &[]),
            ("alpha", &[]),
            ("mid", &["zeta", "alpha"]),
            ("beta", &["alpha"]),
        ])
        .resolve()
        .unwrap();
        assert_eq!(seq.as_slice(), ["alpha", "zeta", "beta", "mid"]);
    }

    #[test]
    fn diamond_respects_every_edge() {
        let source = graph(&[
            ("handler", &[]),
            ("store", &["handler"]),
            ("broker", &["handler"]),
            ("http", &["store", "broker"]),
            ("rpc", &["store", "broker", "http"]),
        ]);
        let seq = source.clone().resolve().unwrap();
        assert_eq!(seq.len(), 5);
        assert_respects_dependencies(&source, &seq);
    }

    #[test]
    fn two_node_cycle_reports_both() {
        let err = graph(&[("a", &["b"]), ("b", &["a"])]).resolve().unwrap_err();
        match err {
            OrchestratorError::CircularDependency { unresolved } => {
                assert_eq!(unresolved, vec!["a", "b"])
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn cycle_reports_blocked_dependents_but_not_resolved_nodes() {
        let err = graph(&[
            ("db", &[]),
            ("a", &["b", "db"]),
            ("b", &["a"]),
            ("c", &["a"]),
        ])
        .resolve()
        .unwrap_err();
        match err {
            OrchestratorError::CircularDependency { unresolved } => {
                assert_eq!(unresolved, vec!["a", "b", "c"])
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn self_dependency_is_a_cycle() {
        let err = graph(&[("loop", &["loop"])]).resolve().unwrap_err();
        assert!(matches!(err, OrchestratorError::CircularDependency { .. }));
    }

    #[test]
    fn unknown_dependency_is_reported() {
        let err = graph(&[("api", &["cache"])]).resolve().unwrap_err();
        match err {
            OrchestratorError::MissingDependency {
                component,
                dependency,
            } => {
                assert_eq!(component, "api");
                assert_eq!(dependency, "cache");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn empty_graph_resolves_to_empty_sequence() {
        let seq = DependencyGraph::new().resolve().unwrap();
        assert!(seq.is_empty());
        assert_eq!(seq.to_string(), "");
    }

    #[test]
    fn wide_graph_resolves_every_node() {
        let mut source = DependencyGraph::new();
        for i in 0..200 {
            let deps: Vec<String> = (0..i).filter(|j| j % 7 == i % 7).map(|j| format!("n{j:03}")).collect();
            source.add(format!("n{i:03}"), deps);
        }
        let seq = source.clone().resolve().unwrap();
        assert_eq!(seq.len(), 200);
        assert_respects_dependencies(&source, &seq);
    }
}
