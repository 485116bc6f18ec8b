//! The merged, provenance-tagged graph

use super::edge::EdgeId;
use super::node::ElementId;
use super::source::Provenance;
use super::value::Attributes;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A node after merging every source that mentions its identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalNode {
    pub id: ElementId,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub node_type: Option<String>,
    pub attributes: Attributes,
    /// Sources attesting this node (serialized as `in_graph`)
    #[serde(rename = "in_graph")]
    pub provenance: Provenance,
}

impl CanonicalNode {
    pub fn new(id: ElementId) -> Self {
        Self {
            id,
            node_type: None,
            attributes: Attributes::new(),
            provenance: Provenance::new(),
        }
    }
}

/// An edge after merging every source that mentions its identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalEdge {
    pub id: EdgeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub attributes: Attributes,
    #[serde(rename = "in_graph")]
    pub provenance: Provenance,
}

impl CanonicalEdge {
    pub fn new(id: EdgeId) -> Self {
        Self {
            id,
            role: None,
            attributes: Attributes::new(),
            provenance: Provenance::new(),
        }
    }
}

/// Canonical node and edge maps keyed by identity.
///
/// Both maps are ordered so iteration (and serialization) is deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CanonicalGraph {
    pub nodes: BTreeMap<ElementId, CanonicalNode>,
    pub edges: BTreeMap<EdgeId, CanonicalEdge>,
}

impl CanonicalGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_node(&self, id: &ElementId) -> Option<&CanonicalNode> {
        self.nodes.get(id)
    }

    pub fn get_edge(&self, id: &EdgeId) -> Option<&CanonicalEdge> {
        self.edges.get(id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &CanonicalNode> {
        self.nodes.values()
    }

    pub fn edges(&self) -> impl Iterator<Item = &CanonicalEdge> {
        self.edges.values()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Serialize as `{"nodes": [...], "edges": [...]}` in identity order.
    pub fn to_json_string(&self) -> serde_json::Result<String> {
        #[derive(Serialize)]
        struct View<'a> {
            nodes: Vec<&'a CanonicalNode>,
            edges: Vec<&'a CanonicalEdge>,
        }
        serde_json::to_string(&View {
            nodes: self.nodes.values().collect(),
            edges: self.edges.values().collect(),
        })
    }
}
