//! Serialization tests with read-layer fixtures

use serde_json::{json, Value};

/// Fixture: a canonical node as the read layer expects it
fn canonical_node_fixture() -> Value {
    json!({
        "id": "Haacklee Harbor",
        "type": "place",
        "attributes": {
            "lat": {"kind": "float", "value": 39.1},
            "lon": {"kind": "float", "value": -76.4}
        },
        "in_graph": ["journalist", "TROUT"]
    })
}

/// Fixture: a canonical edge with an integer endpoint
fn canonical_edge_fixture() -> Value {
    json!({
        "id": {"source": "trip_12", "target": 10803677425_i64, "key": 0},
        "role": "visit",
        "attributes": {
            "time": {"kind": "datetime", "value": "2040-10-01T08:15:00"}
        },
        "in_graph": ["journalist", "FILAH", "TROUT"]
    })
}

#[cfg(test)]
mod serialization_tests {
    use super::*;
    use crate::graph::{
        AttributeValue, CanonicalEdge, CanonicalGraph, CanonicalNode, EdgeId, ElementId,
        NodeRecord, Provenance, SourceTag,
    };

    #[test]
    fn element_id_serializes_untagged() {
        assert_eq!(serde_json::to_string(&ElementId::from("Sean")).unwrap(), "\"Sean\"");
        assert_eq!(serde_json::to_string(&ElementId::Int(7)).unwrap(), "7");
    }

    #[test]
    fn element_id_keeps_strings_and_integers_apart() {
        let s: ElementId = serde_json::from_str("\"7\"").unwrap();
        let i: ElementId = serde_json::from_str("7").unwrap();
        assert_ne!(s, i);
    }

    #[test]
    fn edge_id_displays_as_dashed_triple() {
        let id = EdgeId::new("trip_12", 10803677425_i64, 0_i64);
        assert_eq!(id.to_string(), "trip_12-10803677425-0");
    }

    #[test]
    fn can_deserialize_canonical_node_fixture() {
        let node: CanonicalNode = serde_json::from_value(canonical_node_fixture()).unwrap();
        assert_eq!(node.id, ElementId::from("Haacklee Harbor"));
        assert_eq!(node.node_type.as_deref(), Some("place"));
        assert_eq!(node.attributes["lat"], AttributeValue::Float(39.1));
        assert_eq!(node.provenance.tags(), &[SourceTag::Journalist, SourceTag::Trout]);
    }

    #[test]
    fn can_deserialize_canonical_edge_fixture() {
        let edge: CanonicalEdge = serde_json::from_value(canonical_edge_fixture()).unwrap();
        assert_eq!(edge.id.target, ElementId::Int(10803677425));
        assert_eq!(edge.role.as_deref(), Some("visit"));
        assert!(matches!(edge.attributes["time"], AttributeValue::DateTime(_)));
        assert_eq!(edge.provenance.len(), 3);
    }

    #[test]
    fn serialized_node_exposes_in_graph() {
        let mut node = CanonicalNode::new(ElementId::from("X"));
        node.node_type = Some("place".to_string());
        node.provenance = Provenance::from_tags([SourceTag::Filah, SourceTag::Journalist]);

        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["type"], "place");
        assert_eq!(json["in_graph"], json!(["journalist", "FILAH"]));
        assert!(json.get("provenance").is_none());
    }

    #[test]
    fn unresolved_type_is_omitted() {
        let record = NodeRecord::new("Sean");
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("type").is_none());
    }

    #[test]
    fn canonical_graph_json_is_in_identity_order() {
        let mut graph = CanonicalGraph::new();
        for id in ["b", "a"] {
            graph.nodes.insert(ElementId::from(id), CanonicalNode::new(ElementId::from(id)));
        }
        let json: Value = serde_json::from_str(&graph.to_json_string().unwrap()).unwrap();
        assert_eq!(json["nodes"][0]["id"], "a");
        assert_eq!(json["nodes"][1]["id"], "b");
        assert_eq!(json["edges"], json!([]));
    }
}
