//! Lineage graph module: relation extraction and graph construction.
//!
//! Turns tabular relation records into (subject, predicate, object) triples
//! and accumulates them into a directed graph keyed by person name.

mod builder;
mod extraction;

pub use builder::{build_graph, Graph};
pub use extraction::{parse_relations, DescriptionSchema, ExplicitColumns, RelationSchema};

use serde::Serialize;
use std::fmt;

/// Predicate used when a record names no relation
pub const DEFAULT_RELATION: &str = "关系";

/// A person's identity in the graph: a trimmed, non-empty name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Trim `name`; `None` if nothing is left.
    pub fn new(name: &str) -> Option<Self> {
        let name = name.trim();
        if name.is_empty() {
            None
        } else {
            Some(Self(name.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A single relation fact (subject --predicate--> object).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelationTriple {
    pub subject: NodeId,
    pub predicate: String,
    pub object: NodeId,
}

impl RelationTriple {
    /// Build a triple from raw strings. Subject and object are trimmed and
    /// must be non-empty; a blank predicate becomes [`DEFAULT_RELATION`].
    pub fn new(subject: &str, predicate: &str, object: &str) -> Option<Self> {
        let predicate = predicate.trim();
        Some(Self {
            subject: NodeId::new(subject)?,
            predicate: if predicate.is_empty() {
                DEFAULT_RELATION.to_string()
            } else {
                predicate.to_string()
            },
            object: NodeId::new(object)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_trims_and_rejects_blank() {
        assert_eq!(NodeId::new("  张三 ").unwrap().as_str(), "张三");
        assert!(NodeId::new("").is_none());
        assert!(NodeId::new(" \t ").is_none());
    }

    #[test]
    fn test_node_id_is_case_sensitive() {
        assert_ne!(NodeId::new("Alice"), NodeId::new("alice"));
    }

    #[test]
    fn test_triple_default_predicate() {
        let t = RelationTriple::new("A", "  ", "B").unwrap();
        assert_eq!(t.predicate, DEFAULT_RELATION);
        assert!(RelationTriple::new("A", "师徒", " ").is_none());
        assert!(RelationTriple::new("", "师徒", "B").is_none());
    }

    #[test]
    fn test_node_id_serializes_as_string() {
        let id = NodeId::new("李四").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"李四\"");
    }
}
