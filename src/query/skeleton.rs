//! Skeleton queries: the part of the graph a set of sources agrees on

use crate::graph::{ElementId, Provenance, SourceTag};
use crate::storage::{CanonicalSnapshot, Subgraph};

/// Induced subgraph of elements attested by every required source.
///
/// A node qualifies when its provenance contains every required source. An
/// edge qualifies when it does and both its endpoints qualify.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkeletonQuery {
    required: Vec<SourceTag>,
}

impl SkeletonQuery {
    pub fn new(required: impl IntoIterator<Item = SourceTag>) -> Self {
        Self {
            required: Provenance::from_tags(required).tags().to_vec(),
        }
    }

    /// The skeleton shared by all sources
    pub fn all() -> Self {
        Self::new(SourceTag::ALL)
    }

    pub fn required(&self) -> &[SourceTag] {
        &self.required
    }

    fn admits(&self, provenance: &Provenance) -> bool {
        provenance.is_superset_of(&self.required)
    }

    /// Execute the query against a snapshot of the canonical graph
    pub fn execute(&self, snapshot: &CanonicalSnapshot) -> Subgraph {
        let nodes: Vec<_> = snapshot
            .nodes()
            .filter(|n| self.admits(&n.in_graph))
            .cloned()
            .collect();

        let endpoint_admitted = |id: &ElementId| snapshot.node(id).is_some_and(|n| self.admits(&n.in_graph));
        let edges = snapshot
            .edges()
            .filter(|e| self.admits(&e.in_graph))
            .filter(|e| endpoint_admitted(&e.id.source) && endpoint_admitted(&e.id.target))
            .cloned()
            .collect();

        Subgraph { nodes, edges }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Attributes, EdgeId};
    use crate::storage::{StoredEdge, StoredNode};
    use SourceTag::*;

    fn node(id: &str, tags: &[SourceTag]) -> StoredNode {
        StoredNode::new("PLACE", ElementId::from(id), Provenance::from_tags(tags.iter().copied()), Attributes::new())
    }

    fn edge(source: &str, target: &str, tags: &[SourceTag]) -> StoredEdge {
        StoredEdge::new(
            "VISIT",
            EdgeId::new(source, target, 0),
            Provenance::from_tags(tags.iter().copied()),
            Attributes::new(),
        )
    }

    #[test]
    fn edge_needs_both_endpoints_in_skeleton() {
        let snapshot = CanonicalSnapshot::new(
            vec![node("a", &[Journalist, Filah, Trout]), node("b", &[Journalist, Trout])],
            vec![edge("a", "b", &[Journalist, Filah, Trout])],
        );

        let result = SkeletonQuery::all().execute(&snapshot);
        assert_eq!(result.nodes.len(), 1);
        assert_eq!(result.nodes[0].id, ElementId::from("a"));
        assert!(result.edges.is_empty());
    }

    #[test]
    fn partial_requirement_admits_more() {
        let snapshot = CanonicalSnapshot::new(
            vec![node("a", &[Journalist, Filah, Trout]), node("b", &[Journalist, Trout])],
            vec![edge("a", "b", &[Journalist, Trout])],
        );

        let result = SkeletonQuery::new([Trout, Journalist]).execute(&snapshot);
        assert_eq!(result.nodes.len(), 2);
        assert_eq!(result.edges.len(), 1);
    }

    #[test]
    fn requirement_is_normalized() {
        let query = SkeletonQuery::new([Trout, Journalist, Trout]);
        assert_eq!(query.required(), &[Journalist, Trout]);
    }

    #[test]
    fn results_are_sorted_by_identity() {
        let snapshot = CanonicalSnapshot::new(
            vec![node("c", &SourceTag::ALL), node("a", &SourceTag::ALL), node("b", &SourceTag::ALL)],
            vec![],
        );
        let ids: Vec<_> = SkeletonQuery::all()
            .execute(&snapshot)
            .nodes
            .into_iter()
            .map(|n| n.id.to_string())
            .collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }
}
