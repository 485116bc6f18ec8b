//! Loading raw source documents
//!
//! Source documents are JSON objects with a `nodes` list and a `links` list.
//! Every record is a flat attribute map; a `null` value means "unknown" and
//! is removed before anything else sees the record.

use crate::graph::{
    AttributeValue, Attributes, EdgeRecord, ElementId, NodeRecord, RoadmapGraph, RoadmapNode,
    RoadmapRoute, SourceDataset, SourceTag,
};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name of the road network document
pub const ROADMAP_FILE: &str = "road_map.json";

/// Errors raised while reading source documents
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Document is missing the '{0}' list")]
    MissingList(&'static str),

    #[error("Record {index} in '{list}' is not an object")]
    NotAnObject { list: &'static str, index: usize },

    #[error("Record {index} in '{list}' has no usable '{field}'")]
    MissingField {
        list: &'static str,
        index: usize,
        field: &'static str,
    },
}

/// Remove every key whose value is `null`.
pub fn strip_nulls(records: Vec<Map<String, Value>>) -> Vec<Map<String, Value>> {
    records
        .into_iter()
        .map(|record| record.into_iter().filter(|(_, v)| !v.is_null()).collect())
        .collect()
}

fn records(doc: &Value, list: &'static str) -> Result<Vec<Map<String, Value>>, LoadError> {
    let items = doc
        .get(list)
        .and_then(Value::as_array)
        .ok_or(LoadError::MissingList(list))?;

    let raw = items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            item.as_object()
                .cloned()
                .ok_or(LoadError::NotAnObject { list, index })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(strip_nulls(raw))
}

fn take_id(
    record: &mut Map<String, Value>,
    list: &'static str,
    index: usize,
    field: &'static str,
) -> Result<ElementId, LoadError> {
    record
        .remove(field)
        .as_ref()
        .and_then(ElementId::from_json)
        .ok_or(LoadError::MissingField { list, index, field })
}

/// Lift a string label out of the record. Non-string labels stay as attributes.
fn take_label(record: &mut Map<String, Value>, field: &str) -> Option<String> {
    if !matches!(record.get(field), Some(Value::String(_))) {
        return None;
    }
    match record.remove(field) {
        Some(Value::String(s)) => Some(s),
        _ => None,
    }
}

fn into_attributes(record: Map<String, Value>) -> Attributes {
    record
        .iter()
        .filter_map(|(k, v)| AttributeValue::from_json(v).map(|v| (k.clone(), v)))
        .collect()
}

impl SourceDataset {
    /// Convert a parsed source document.
    ///
    /// Edges without a `key` get key `0`, matching single-edge multigraph exports.
    /// Numeric string keys are read as integers.
    pub fn from_json(tag: SourceTag, doc: &Value) -> Result<Self, LoadError> {
        let mut dataset = SourceDataset::new(tag);

        for (index, mut record) in records(doc, "nodes")?.into_iter().enumerate() {
            let id = take_id(&mut record, "nodes", index, "id")?;
            let node_type = take_label(&mut record, "type");
            dataset.nodes.push(NodeRecord {
                id,
                node_type,
                attributes: into_attributes(record),
            });
        }

        for (index, mut record) in records(doc, "links")?.into_iter().enumerate() {
            let source = take_id(&mut record, "links", index, "source")?;
            let target = take_id(&mut record, "links", index, "target")?;
            let key = record
                .remove("key")
                .as_ref()
                .and_then(ElementId::key_from_json)
                .unwrap_or(ElementId::Int(0));
            let role = take_label(&mut record, "role");
            let mut edge = EdgeRecord::new(source, target, key);
            edge.role = role;
            edge.attributes = into_attributes(record);
            dataset.edges.push(edge);
        }

        Ok(dataset)
    }
}

impl RoadmapGraph {
    /// Convert a parsed roadmap document.
    pub fn from_json(doc: &Value) -> Result<Self, LoadError> {
        let mut roadmap = RoadmapGraph::new();

        for (index, mut record) in records(doc, "nodes")?.into_iter().enumerate() {
            let id = take_id(&mut record, "nodes", index, "id")?;
            let mut node = RoadmapNode::new(id);
            node.attributes = into_attributes(record);
            roadmap.nodes.push(node);
        }

        for (index, mut record) in records(doc, "links")?.into_iter().enumerate() {
            let source = take_id(&mut record, "links", index, "source")?;
            let target = take_id(&mut record, "links", index, "target")?;
            let key = record
                .remove("key")
                .as_ref()
                .and_then(ElementId::key_from_json)
                .unwrap_or(ElementId::Int(0));
            roadmap.routes.push(RoadmapRoute::new(source, target, key));
        }

        Ok(roadmap)
    }
}

fn read_json(path: &Path) -> Result<Value, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| LoadError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Read the document at `path` as the dataset of `tag`.
pub fn load_source_file(path: &Path, tag: SourceTag) -> Result<SourceDataset, LoadError> {
    let doc = read_json(path)?;
    tracing::debug!(source = %tag, path = %path.display(), "loading source document");
    SourceDataset::from_json(tag, &doc)
}

pub fn load_roadmap_file(path: &Path) -> Result<RoadmapGraph, LoadError> {
    let doc = read_json(path)?;
    RoadmapGraph::from_json(&doc)
}
