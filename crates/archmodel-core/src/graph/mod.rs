//! Directed reference graph
//!
//! One node per id seen as a reference source or target, one edge per
//! reference. Parallel edges are kept so degrees count references; neighbour
//! queries collapse them.

mod algorithms;

pub(crate) use algorithms::bfs_levels;

use std::collections::{BTreeSet, HashMap};

use crate::references::Reference;

/// Edge attributes carried over from the reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    pub reference_type: String,
    pub property: String,
}

/// Which way to follow edges
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeDirection {
    /// Source to target (successors)
    Outgoing,
    /// Target to source (predecessors)
    Incoming,
}

#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    nodes: BTreeSet<String>,
    outgoing: HashMap<String, Vec<GraphEdge>>,
    incoming: HashMap<String, Vec<GraphEdge>>,
    edge_count: usize,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_references<'a>(references: impl IntoIterator<Item = &'a Reference>) -> Self {
        let mut graph = Self::new();
        for reference in references {
            graph.add_edge(GraphEdge {
                source: reference.source.clone(),
                target: reference.target.clone(),
                reference_type: reference.reference_type.clone(),
                property: reference.property.clone(),
            });
        }
        graph
    }

    pub fn add_node(&mut self, id: impl Into<String>) {
        self.nodes.insert(id.into());
    }

    pub fn add_edge(&mut self, edge: GraphEdge) {
        self.nodes.insert(edge.source.clone());
        self.nodes.insert(edge.target.clone());
        self.incoming
            .entry(edge.target.clone())
            .or_default()
            .push(edge.clone());
        self.outgoing
            .entry(edge.source.clone())
            .or_default()
            .push(edge);
        self.edge_count += 1;
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.contains(id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Node ids in sorted order
    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(String::as_str)
    }

    pub fn out_edges(&self, id: &str) -> &[GraphEdge] {
        self.outgoing.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn in_edges(&self, id: &str) -> &[GraphEdge] {
        self.incoming.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Distinct neighbours in first-edge order
    pub fn neighbors(&self, id: &str, direction: EdgeDirection) -> Vec<&str> {
        let mut seen = BTreeSet::new();
        let edges = match direction {
            EdgeDirection::Outgoing => self.out_edges(id),
            EdgeDirection::Incoming => self.in_edges(id),
        };
        edges
            .iter()
            .map(|edge| match direction {
                EdgeDirection::Outgoing => edge.target.as_str(),
                EdgeDirection::Incoming => edge.source.as_str(),
            })
            .filter(|n| seen.insert(*n))
            .collect()
    }

    pub fn successors(&self, id: &str) -> Vec<&str> {
        self.neighbors(id, EdgeDirection::Outgoing)
    }

    pub fn predecessors(&self, id: &str) -> Vec<&str> {
        self.neighbors(id, EdgeDirection::Incoming)
    }

    pub fn out_degree(&self, id: &str) -> usize {
        self.out_edges(id).len()
    }

    pub fn in_degree(&self, id: &str) -> usize {
        self.in_edges(id).len()
    }

    /// In-degree plus out-degree; a self-reference counts twice
    pub fn degree(&self, id: &str) -> usize {
        self.in_degree(id) + self.out_degree(id)
    }

    /// Reference type of the first edge from `source` to `target`
    pub fn edge_type(&self, source: &str, target: &str) -> Option<&str> {
        self.out_edges(source)
            .iter()
            .find(|edge| edge.target == target)
            .map(|edge| edge.reference_type.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(source: &str, target: &str, reference_type: &str) -> GraphEdge {
        GraphEdge {
            source: source.to_string(),
            target: target.to_string(),
            reference_type: reference_type.to_string(),
            property: "uses".to_string(),
        }
    }

    #[test]
    fn test_parallel_edges_count_in_degree_not_neighbors() {
        let mut graph = DependencyGraph::new();
        graph.add_edge(edge("a", "b", "usage"));
        graph.add_edge(edge("a", "b", "usage"));
        graph.add_edge(edge("a", "c", "access"));

        assert_eq!(graph.out_degree("a"), 3);
        assert_eq!(graph.successors("a"), vec!["b", "c"]);
        assert_eq!(graph.predecessors("b"), vec!["a"]);
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.node_count(), 3);
    }

    #[test]
    fn test_unknown_node_queries_are_empty() {
        let graph = DependencyGraph::new();
        assert!(graph.successors("x").is_empty());
        assert!(graph.in_edges("x").is_empty());
        assert_eq!(graph.degree("x"), 0);
        assert!(!graph.contains_node("x"));
    }

    #[test]
    fn test_edge_type_lookup() {
        let mut graph = DependencyGraph::new();
        graph.add_edge(edge("a", "b", "realization"));
        assert_eq!(graph.edge_type("a", "b"), Some("realization"));
        assert_eq!(graph.edge_type("b", "a"), None);
    }
}
