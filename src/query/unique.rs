//! What one source adds on top of the reference source

use super::skeleton::SkeletonQuery;
use crate::graph::{Provenance, SourceTag};
use crate::storage::{CanonicalSnapshot, Subgraph};
use std::collections::BTreeSet;

/// Elements attested by both the reference source and `source`, excluding
/// everything in the all-source skeleton.
///
/// Unlike a skeleton this is not an induced subgraph: an edge is judged by
/// its own provenance only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetUniqueQuery {
    source: SourceTag,
    reference: SourceTag,
}

impl DatasetUniqueQuery {
    pub fn new(source: SourceTag) -> Self {
        Self {
            source,
            reference: SourceTag::Journalist,
        }
    }

    pub fn with_reference(mut self, reference: SourceTag) -> Self {
        self.reference = reference;
        self
    }

    /// Sources every returned element must carry
    pub fn baseline(&self) -> Provenance {
        Provenance::from_tags([self.reference, self.source])
    }

    pub fn execute(&self, snapshot: &CanonicalSnapshot) -> Subgraph {
        let baseline = self.baseline();
        let skeleton = SkeletonQuery::all().execute(snapshot);

        let shared_nodes: BTreeSet<_> = skeleton.nodes.iter().map(|n| &n.id).collect();
        let shared_edges: BTreeSet<_> = skeleton.edges.iter().map(|e| &e.id).collect();

        let nodes = snapshot
            .nodes()
            .filter(|n| n.in_graph.is_superset_of(baseline.tags()))
            .filter(|n| !shared_nodes.contains(&n.id))
            .cloned()
            .collect();
        let edges = snapshot
            .edges()
            .filter(|e| e.in_graph.is_superset_of(baseline.tags()))
            .filter(|e| !shared_edges.contains(&e.id))
            .cloned()
            .collect();

        Subgraph { nodes, edges }
    }
}
