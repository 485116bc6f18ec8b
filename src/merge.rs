//! Provenance-tagged merge of per-source graphs
//!
//! Sources are folded in the fixed order journalist, FILAH, TROUT no matter
//! how they are handed in. A later source overwrites a key's earlier value;
//! after a passing consistency check that only ever adds keys.

use crate::graph::{
    Attributes, CanonicalEdge, CanonicalGraph, CanonicalNode, SourceDataset,
    SourceTag,
};
use serde::Serialize;

/// Counters describing a merge
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeStats {
    pub node_records: usize,
    pub edge_records: usize,
    pub canonical_nodes: usize,
    pub canonical_edges: usize,
    /// Existing values replaced by a different value from a later source
    pub overwrites: usize,
}

/// Folds source datasets into one canonical graph.
#[derive(Debug, Default)]
pub struct MergeEngine {
    graph: CanonicalGraph,
    stats: MergeStats,
}

fn merge_attributes(
    target: &mut Attributes,
    incoming: &Attributes,
    tag: SourceTag,
    identity: &dyn std::fmt::Display,
    overwrites: &mut usize,
) {
    for (key, value) in incoming {
        if let Some(previous) = target.insert(key.clone(), value.clone()) {
            if !previous.agrees_with(value) {
                *overwrites += 1;
                tracing::warn!(
                    source = %tag,
                    identity = %identity,
                    key = %key,
                    previous = %previous,
                    value = %value,
                    "later source overwrote an attribute value"
                );
            }
        }
    }
}

/// Label precedence follows attribute precedence: a later label replaces an earlier one.
fn merge_label(
    target: &mut Option<String>,
    incoming: &Option<String>,
    tag: SourceTag,
    identity: &dyn std::fmt::Display,
    overwrites: &mut usize,
) {
    let Some(label) = incoming else { return };
    if let Some(previous) = target.replace(label.clone()) {
        if &previous != label {
            *overwrites += 1;
            tracing::warn!(
                source = %tag,
                identity = %identity,
                previous = %previous,
                label = %label,
                "later source overwrote a label"
            );
        }
    }
}

impl MergeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one source into the canonical graph.
    pub fn add_source(&mut self, dataset: &SourceDataset) {
        let tag = dataset.tag;

        for record in &dataset.nodes {
            let node = self
                .graph
                .nodes
                .entry(record.id.clone())
                .or_insert_with(|| CanonicalNode::new(record.id.clone()));
            merge_label(&mut node.node_type, &record.node_type, tag, &record.id, &mut self.stats.overwrites);
            merge_attributes(&mut node.attributes, &record.attributes, tag, &record.id, &mut self.stats.overwrites);
            node.provenance.record(tag);
            self.stats.node_records += 1;
        }

        for record in &dataset.edges {
            let edge = self
                .graph
                .edges
                .entry(record.id.clone())
                .or_insert_with(|| CanonicalEdge::new(record.id.clone()));
            merge_label(&mut edge.role, &record.role, tag, &record.id, &mut self.stats.overwrites);
            merge_attributes(&mut edge.attributes, &record.attributes, tag, &record.id, &mut self.stats.overwrites);
            edge.provenance.record(tag);
            self.stats.edge_records += 1;
        }
    }

    pub fn finish(mut self) -> (CanonicalGraph, MergeStats) {
        self.stats.canonical_nodes = self.graph.node_count();
        self.stats.canonical_edges = self.graph.edge_count();
        tracing::info!(
            nodes = self.stats.canonical_nodes,
            edges = self.stats.canonical_edges,
            overwrites = self.stats.overwrites,
            "merged sources"
        );
        (self.graph, self.stats)
    }
}

/// Merge all datasets in processing order.
pub fn merge_sources(datasets: &[SourceDataset]) -> (CanonicalGraph, MergeStats) {
    let mut ordered: Vec<&SourceDataset> = datasets.iter().collect();
    ordered.sort_by_key(|d| d.tag);

    let mut engine = MergeEngine::new();
    for dataset in ordered {
        engine.add_source(dataset);
    }
    engine.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{AttributeValue, EdgeId, EdgeRecord, ElementId, NodeRecord};

    fn place(id: &str) -> NodeRecord {
        NodeRecord::new(id).with_type("place").with_attribute("lat", 1)
    }

    #[test]
    fn shared_node_collects_provenance_in_order() {
        let jo = SourceDataset::new(SourceTag::Journalist).with_node(place("X"));
        let fi = SourceDataset::new(SourceTag::Filah).with_node(place("X"));

        let (graph, _) = merge_sources(&[fi, jo]);
        let node = graph.get_node(&ElementId::from("X")).unwrap();
        assert_eq!(node.provenance.tags(), &[SourceTag::Journalist, SourceTag::Filah]);
        assert_eq!(node.node_type.as_deref(), Some("place"));
    }

    #[test]
    fn attributes_are_unioned() {
        let jo = SourceDataset::new(SourceTag::Journalist).with_node(place("X"));
        let tr = SourceDataset::new(SourceTag::Trout)
            .with_node(NodeRecord::new("X").with_attribute("name", "Harbor"));

        let (graph, stats) = merge_sources(&[jo, tr]);
        let node = graph.get_node(&ElementId::from("X")).unwrap();
        assert_eq!(node.attributes.len(), 2);
        assert_eq!(node.node_type.as_deref(), Some("place"));
        assert_eq!(stats.overwrites, 0);
    }

    #[test]
    fn later_source_wins_on_disagreement() {
        let fi = SourceDataset::new(SourceTag::Filah)
            .with_node(NodeRecord::new("X").with_attribute("name", "old"));
        let tr = SourceDataset::new(SourceTag::Trout)
            .with_node(NodeRecord::new("X").with_attribute("name", "new"));

        let (graph, stats) = merge_sources(&[tr, fi]);
        let node = graph.get_node(&ElementId::from("X")).unwrap();
        assert_eq!(node.attributes["name"], AttributeValue::from("new"));
        assert_eq!(stats.overwrites, 1);
    }

    #[test]
    fn edges_merge_by_triple() {
        let jo = SourceDataset::new(SourceTag::Journalist)
            .with_edge(EdgeRecord::new("a", "b", 0).with_role("visit"))
            .with_edge(EdgeRecord::new("a", "b", 1).with_role("visit"));
        let tr = SourceDataset::new(SourceTag::Trout).with_edge(EdgeRecord::new("a", "b", 1));

        let (graph, stats) = merge_sources(&[jo, tr]);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(stats.edge_records, 3);
        let edge = graph.get_edge(&EdgeId::new("a", "b", 1_i64)).unwrap();
        assert_eq!(edge.provenance.tags(), &[SourceTag::Journalist, SourceTag::Trout]);
        assert_eq!(edge.role.as_deref(), Some("visit"));
    }

    #[test]
    fn record_order_within_a_source_does_not_matter() {
        let forward = SourceDataset::new(SourceTag::Journalist)
            .with_node(place("A"))
            .with_node(place("B"));
        let backward = SourceDataset::new(SourceTag::Journalist)
            .with_node(place("B"))
            .with_node(place("A"));

        let (a, _) = merge_sources(&[forward]);
        let (b, _) = merge_sources(&[backward]);
        assert_eq!(a.to_json_string().unwrap(), b.to_json_string().unwrap());
    }
}
