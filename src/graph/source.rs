//! Source datasets and provenance tags

use super::edge::EdgeRecord;
use super::node::{ElementId, NodeRecord};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// One of the independently collected input graphs.
///
/// Declaration order is the fixed processing order; `Ord` follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SourceTag {
    #[serde(rename = "journalist", alias = "jo")]
    Journalist,
    #[serde(rename = "FILAH", alias = "filah", alias = "fi")]
    Filah,
    #[serde(rename = "TROUT", alias = "trout", alias = "tr")]
    Trout,
}

impl SourceTag {
    /// All sources, in processing order
    pub const ALL: [SourceTag; 3] = [SourceTag::Journalist, SourceTag::Filah, SourceTag::Trout];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Journalist => "journalist",
            Self::Filah => "FILAH",
            Self::Trout => "TROUT",
        }
    }

    /// Two-letter alias used by the read layer
    pub fn short(&self) -> &'static str {
        match self {
            Self::Journalist => "jo",
            Self::Filah => "fi",
            Self::Trout => "tr",
        }
    }
}

impl fmt::Display for SourceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SourceTag {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "journalist" | "jo" => Ok(Self::Journalist),
            "FILAH" | "filah" | "fi" => Ok(Self::Filah),
            "TROUT" | "trout" | "tr" => Ok(Self::Trout),
            _ => Err(format!("unknown source dataset: {}", s)),
        }
    }
}

/// Ordered, duplicate-free list of the sources that attest an element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Provenance(Vec<SourceTag>);

impl Provenance {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Build from arbitrary tags, normalizing order and dropping repeats.
    pub fn from_tags(tags: impl IntoIterator<Item = SourceTag>) -> Self {
        let mut provenance = Self::new();
        for tag in tags {
            provenance.record(tag);
        }
        provenance
    }

    /// Record that `tag` attests this element. Returns false if already present.
    pub fn record(&mut self, tag: SourceTag) -> bool {
        match self.0.binary_search(&tag) {
            Ok(_) => false,
            Err(pos) => {
                self.0.insert(pos, tag);
                true
            }
        }
    }

    pub fn contains(&self, tag: SourceTag) -> bool {
        self.0.contains(&tag)
    }

    pub fn is_superset_of(&self, required: &[SourceTag]) -> bool {
        required.iter().all(|t| self.contains(*t))
    }

    pub fn tags(&self) -> &[SourceTag] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The nodes and edges contributed by one source
#[derive(Debug, Clone)]
pub struct SourceDataset {
    pub tag: SourceTag,
    pub nodes: Vec<NodeRecord>,
    pub edges: Vec<EdgeRecord>,
}

impl SourceDataset {
    pub fn new(tag: SourceTag) -> Self {
        Self {
            tag,
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    pub fn with_node(mut self, node: NodeRecord) -> Self {
        self.nodes.push(node);
        self
    }

    pub fn with_edge(mut self, edge: EdgeRecord) -> Self {
        self.edges.push(edge);
        self
    }

    /// First node carrying `id`, if any
    pub fn node(&self, id: &ElementId) -> Option<&NodeRecord> {
        self.nodes.iter().find(|n| &n.id == id)
    }

    /// Resolved node types keyed by identity (first occurrence wins)
    pub fn node_types(&self) -> HashMap<ElementId, String> {
        let mut types = HashMap::new();
        for node in &self.nodes {
            if let Some(t) = &node.node_type {
                types.entry(node.id.clone()).or_insert_with(|| t.clone());
            }
        }
        types
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provenance_keeps_processing_order_and_drops_repeats() {
        let mut p = Provenance::new();
        assert!(p.record(SourceTag::Trout));
        assert!(p.record(SourceTag::Journalist));
        assert!(!p.record(SourceTag::Trout));
        assert_eq!(p.tags(), &[SourceTag::Journalist, SourceTag::Trout]);
    }

    #[test]
    fn provenance_superset() {
        let p = Provenance::from_tags(SourceTag::ALL);
        assert!(p.is_superset_of(&[SourceTag::Filah, SourceTag::Journalist]));
        assert!(p.is_superset_of(&[]));
        let partial = Provenance::from_tags([SourceTag::Journalist]);
        assert!(!partial.is_superset_of(&[SourceTag::Journalist, SourceTag::Trout]));
    }

    #[test]
    fn source_tag_parses_wire_names_and_aliases() {
        assert_eq!("FILAH".parse::<SourceTag>().unwrap(), SourceTag::Filah);
        assert_eq!("tr".parse::<SourceTag>().unwrap(), SourceTag::Trout);
        assert_eq!("journalist".parse::<SourceTag>().unwrap(), SourceTag::Journalist);
        assert!("reuters".parse::<SourceTag>().is_err());
    }

    #[test]
    fn provenance_serializes_as_wire_names() {
        let p = Provenance::from_tags([SourceTag::Filah, SourceTag::Journalist]);
        assert_eq!(serde_json::to_string(&p).unwrap(), r#"["journalist","FILAH"]"#);
    }
}
