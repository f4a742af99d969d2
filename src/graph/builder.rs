//! Directed lineage graph built from relation triples.

use indexmap::{IndexMap, IndexSet};

use super::{NodeId, RelationTriple};

/// Directed graph with at most one labelled edge per ordered node pair.
///
/// Nodes and edges iterate in first-seen order. Re-adding an existing
/// `(from, to)` pair replaces its label in place.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: IndexSet<NodeId>,
    edges: IndexMap<(NodeId, NodeId), String>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node if not already present
    pub fn add_node(&mut self, node: NodeId) {
        self.nodes.insert(node);
    }

    /// Add the edge `from -> to`, creating both nodes; overwrites an existing label
    pub fn add_edge(&mut self, from: NodeId, to: NodeId, label: impl Into<String>) {
        self.add_node(from.clone());
        self.add_node(to.clone());
        let label = label.into();
        if let Some(previous) = self.edges.insert((from, to), label) {
            log::debug!("Replaced edge label '{}'", previous);
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &NodeId> {
        self.nodes.iter()
    }

    /// Edges as `(from, to, label)`
    pub fn edges(&self) -> impl Iterator<Item = (&NodeId, &NodeId, &str)> {
        self.edges
            .iter()
            .map(|((from, to), label)| (from, to, label.as_str()))
    }

    /// Targets of edges leaving `node`, in edge order
    pub fn neighbors_out<'a>(&'a self, node: &'a NodeId) -> impl Iterator<Item = &'a NodeId> + 'a {
        self.edges
            .keys()
            .filter(move |(from, _)| from == node)
            .map(|(_, to)| to)
    }
}

#[cfg(test)]
impl Graph {
    /// Label of the edge `from -> to`
    pub fn edge_label(&self, from: &str, to: &str) -> Option<&str> {
        let key = (NodeId::new(from)?, NodeId::new(to)?);
        self.edges.get(&key).map(|s| s.as_str())
    }
}

/// Accumulate triples into a graph
pub fn build_graph(triples: &[RelationTriple]) -> Graph {
    let mut graph = Graph::new();
    for triple in triples {
        graph.add_edge(
            triple.subject.clone(),
            triple.object.clone(),
            triple.predicate.clone(),
        );
    }
    log::debug!(
        "Built graph: {} nodes, {} edges from {} triples",
        graph.node_count(),
        graph.edge_count(),
        triples.len()
    );
    graph
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str, p: &str, o: &str) -> RelationTriple {
        RelationTriple::new(s, p, o).unwrap()
    }

    #[test]
    fn test_build_basic() {
        let graph = build_graph(&[t("A", "师徒", "B")]);
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        let names: Vec<&str> = graph.nodes().map(|n| n.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(graph.edge_label("A", "B"), Some("师徒"));
        assert_eq!(graph.edge_label("B", "A"), None);
    }

    #[test]
    fn test_nodes_deduplicated_by_name() {
        let graph = build_graph(&[
            t("A", "师徒", "B"),
            t(" B ", "同事", "C"),
            t("C", "同事", "A"),
            t("a", "同事", "A"),
        ]);
        let names: Vec<&str> = graph.nodes().map(|n| n.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C", "a"]);
        assert_eq!(graph.edge_count(), 4);
    }

    #[test]
    fn test_duplicate_pair_overwrites_label_in_place() {
        let graph = build_graph(&[
            t("A", "师徒", "B"),
            t("B", "同事", "C"),
            t("A", "父子", "B"),
        ]);
        assert_eq!(graph.edge_count(), 2);
        let edges: Vec<(&str, &str, &str)> = graph
            .edges()
            .map(|(f, to, l)| (f.as_str(), to.as_str(), l))
            .collect();
        assert_eq!(edges, vec![("A", "B", "父子"), ("B", "C", "同事")]);
    }

    #[test]
    fn test_reverse_direction_is_separate_edge() {
        let graph = build_graph(&[t("A", "师", "B"), t("B", "徒", "A")]);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.edge_label("B", "A"), Some("徒"));
    }

    #[test]
    fn test_self_loop_permitted() {
        let graph = build_graph(&[t("A", "自述", "A")]);
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.edge_label("A", "A"), Some("自述"));
    }

    #[test]
    fn test_neighbors_out() {
        let graph = build_graph(&[t("A", "r", "B"), t("A", "r", "C"), t("B", "r", "C")]);
        let a = NodeId::new("A").unwrap();
        let out: Vec<&str> = graph.neighbors_out(&a).map(|n| n.as_str()).collect();
        assert_eq!(out, vec!["B", "C"]);
        let c = NodeId::new(" C ").unwrap();
        assert_eq!(graph.neighbors_out(&c).count(), 0);
    }

    #[test]
    fn test_empty() {
        let graph = build_graph(&[]);
        assert_eq!(graph.node_count(), 0);
        assert_eq!(graph.edges().count(), 0);
    }
}
