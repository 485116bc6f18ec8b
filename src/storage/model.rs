//! Persisted shapes of the canonical graph
//!
//! Every stored element carries a label (derived from its type or role), its
//! identity, and `in_graph`, the sources that attest it.

use crate::graph::{Attributes, EdgeId, ElementId, Provenance};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;

/// Label of canonical place nodes, the targets of roadmap correspondence
pub const PLACE_LABEL: &str = "PLACE";
pub const ROADMAP_PLACE_LABEL: &str = "ROADMAP_PLACE";
/// Correspondence edge from a roadmap node to its canonical place
pub const IS_LABEL: &str = "IS";
pub const ROUTE_LABEL: &str = "ROUTE";

/// Storage label for a type or role: uppercase, `.` replaced by `_`.
///
/// `"entity.person"` → `"ENTITY_PERSON"`
pub fn label_for(raw: &str) -> String {
    raw.to_uppercase().replace('.', "_")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredNode {
    pub label: String,
    pub id: ElementId,
    pub in_graph: Provenance,
    pub properties: Attributes,
}

impl StoredNode {
    pub fn new(label: impl Into<String>, id: ElementId, in_graph: Provenance, properties: Attributes) -> Self {
        Self {
            label: label.into(),
            id,
            in_graph,
            properties,
        }
    }
}

/// A stored edge. Serializes its identity both inline (`source`, `target`,
/// `key`) and as the dashed `id` string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StoredEdge {
    pub label: String,
    #[serde(flatten)]
    pub id: EdgeId,
    pub in_graph: Provenance,
    pub properties: Attributes,
}

impl StoredEdge {
    pub fn new(label: impl Into<String>, id: EdgeId, in_graph: Provenance, properties: Attributes) -> Self {
        Self {
            label: label.into(),
            id,
            in_graph,
            properties,
        }
    }
}

impl Serialize for StoredEdge {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("StoredEdge", 7)?;
        state.serialize_field("label", &self.label)?;
        state.serialize_field("id", &self.id.to_string())?;
        state.serialize_field("source", &self.id.source)?;
        state.serialize_field("target", &self.id.target)?;
        state.serialize_field("key", &self.id.key)?;
        state.serialize_field("in_graph", &self.in_graph)?;
        state.serialize_field("properties", &self.properties)?;
        state.end()
    }
}

/// A set of canonical nodes and edges, sorted by identity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Subgraph {
    pub nodes: Vec<StoredNode>,
    pub edges: Vec<StoredEdge>,
}

impl Subgraph {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}

/// The persisted canonical layer, indexed by identity
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CanonicalSnapshot {
    nodes: BTreeMap<ElementId, StoredNode>,
    edges: BTreeMap<EdgeId, StoredEdge>,
}

impl CanonicalSnapshot {
    pub fn new(nodes: Vec<StoredNode>, edges: Vec<StoredEdge>) -> Self {
        Self {
            nodes: nodes.into_iter().map(|n| (n.id.clone(), n)).collect(),
            edges: edges.into_iter().map(|e| (e.id.clone(), e)).collect(),
        }
    }

    pub fn node(&self, id: &ElementId) -> Option<&StoredNode> {
        self.nodes.get(id)
    }

    pub fn edge(&self, id: &EdgeId) -> Option<&StoredEdge> {
        self.edges.get(id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &StoredNode> {
        self.nodes.values()
    }

    pub fn edges(&self) -> impl Iterator<Item = &StoredEdge> {
        self.edges.values()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

/// Element counts per layer, plus canonical nodes per label
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub canonical_nodes: usize,
    pub canonical_edges: usize,
    pub roadmap_nodes: usize,
    pub routes: usize,
    pub correspondences: usize,
    pub labels: BTreeMap<String, usize>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::SourceTag;

    #[test]
    fn labels_are_uppercased_with_underscores() {
        assert_eq!(label_for("entity.person"), "ENTITY_PERSON");
        assert_eq!(label_for("place"), PLACE_LABEL);
        assert_eq!(label_for("visit"), "VISIT");
    }

    #[test]
    fn stored_edge_serializes_identity_inline() {
        let edge = StoredEdge::new(
            "VISIT",
            EdgeId::new("trip_1", "harbor", 0),
            Provenance::from_tags([SourceTag::Trout, SourceTag::Journalist]),
            Attributes::new(),
        );
        let json = serde_json::to_value(&edge).unwrap();
        assert_eq!(json["id"], "trip_1-harbor-0");
        assert_eq!(json["source"], "trip_1");
        assert_eq!(json["key"], 0);
        assert_eq!(json["in_graph"], serde_json::json!(["journalist", "TROUT"]));

        let back: StoredEdge = serde_json::from_value(json).unwrap();
        assert_eq!(back, edge);
    }
}
