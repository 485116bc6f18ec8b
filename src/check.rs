//! Cross-source consistency checking
//!
//! Every unordered pair of sources is compared identity by identity. An
//! identity present in both sources either carries agreeing attribute maps
//! (an overlap) or differs somewhere (divergent). A divergent identity is only
//! acceptable when the difference is a key that one side lacks; two different
//! values for the same key abort the run.

use crate::graph::{attributes_agree, AttributeValue, Attributes, EdgeId, ElementId, SourceDataset, SourceTag};
use serde::Serialize;
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use thiserror::Error;

/// Whether a finding concerns a node or an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Node,
    Edge,
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Node => f.write_str("node"),
            Self::Edge => f.write_str("edge"),
        }
    }
}

#[derive(Debug, Error)]
pub enum CheckError {
    #[error(
        "Attribute conflict on {kind} {identity}: key '{key}' is {left} in {left_source} but {right} in {right_source}"
    )]
    AttributeConflict {
        kind: ElementKind,
        identity: String,
        key: String,
        left_source: SourceTag,
        left: AttributeValue,
        right_source: SourceTag,
        right: AttributeValue,
    },
}

/// Overlap statistics for one pair of sources
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairOverlap {
    pub left: SourceTag,
    pub right: SourceTag,
    pub overlapping_nodes: usize,
    pub divergent_nodes: usize,
    pub overlapping_edges: usize,
    pub divergent_edges: usize,
    /// Share of the non-reference source's nodes that overlap with the
    /// reference source, in percent. Only set for pairs with the reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_coverage_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edge_coverage_pct: Option<f64>,
}

/// An identity occurring more than once inside a single source
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicateIdentity {
    pub source: SourceTag,
    pub kind: ElementKind,
    pub identity: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsistencyReport {
    pub reference: SourceTag,
    pub pairs: Vec<PairOverlap>,
    pub duplicates: Vec<DuplicateIdentity>,
    /// Node identities attested only by the reference source
    pub reference_only_nodes: usize,
    pub reference_only_edges: usize,
}

impl ConsistencyReport {
    pub fn pair(&self, a: SourceTag, b: SourceTag) -> Option<&PairOverlap> {
        self.pairs
            .iter()
            .find(|p| (p.left == a && p.right == b) || (p.left == b && p.right == a))
    }
}

/// Identity → comparable attribute map for one source.
///
/// Repeated records of an identity are folded into the first one and must
/// agree with it on every shared key.
struct SourceIndex {
    tag: SourceTag,
    nodes: BTreeMap<ElementId, Attributes>,
    edges: BTreeMap<EdgeId, Attributes>,
}

impl SourceIndex {
    fn build(dataset: &SourceDataset, duplicates: &mut Vec<DuplicateIdentity>) -> Result<Self, CheckError> {
        let tag = dataset.tag;
        let mut nodes = BTreeMap::new();
        for node in &dataset.nodes {
            index_record(&mut nodes, ElementKind::Node, tag, &node.id, node.comparable(), duplicates)?;
        }

        let mut edges = BTreeMap::new();
        for edge in &dataset.edges {
            index_record(&mut edges, ElementKind::Edge, tag, &edge.id, edge.comparable(), duplicates)?;
        }

        Ok(Self { tag, nodes, edges })
    }
}

fn index_record<K: Ord + Clone + fmt::Display>(
    index: &mut BTreeMap<K, Attributes>,
    kind: ElementKind,
    tag: SourceTag,
    id: &K,
    attributes: Attributes,
    duplicates: &mut Vec<DuplicateIdentity>,
) -> Result<(), CheckError> {
    let first = match index.entry(id.clone()) {
        Entry::Vacant(slot) => {
            slot.insert(attributes);
            return Ok(());
        }
        Entry::Occupied(slot) => slot.into_mut(),
    };

    duplicates.push(DuplicateIdentity {
        source: tag,
        kind,
        identity: id.to_string(),
    });
    if let Some((key, left, right)) = first_conflict(first, &attributes) {
        return Err(CheckError::AttributeConflict {
            kind,
            identity: id.to_string(),
            key,
            left_source: tag,
            left,
            right_source: tag,
            right,
        });
    }
    for (key, value) in attributes {
        first.entry(key).or_insert(value);
    }
    Ok(())
}

/// The first key present on both sides whose values disagree.
fn first_conflict(a: &Attributes, b: &Attributes) -> Option<(String, AttributeValue, AttributeValue)> {
    a.iter().find_map(|(key, va)| {
        let vb = b.get(key)?;
        (!va.agrees_with(vb)).then(|| (key.clone(), va.clone(), vb.clone()))
    })
}

/// Counts of (overlapping, divergent) identities between two sources.
///
/// Fails on the first shared key whose values disagree.
fn compare<K: Ord + fmt::Display>(
    kind: ElementKind,
    left_source: SourceTag,
    left: &BTreeMap<K, Attributes>,
    right_source: SourceTag,
    right: &BTreeMap<K, Attributes>,
) -> Result<(usize, usize), CheckError> {
    let mut overlapping = 0;
    let mut divergent = 0;

    for (id, a) in left {
        let Some(b) = right.get(id) else { continue };

        if attributes_agree(a, b) {
            overlapping += 1;
            continue;
        }

        divergent += 1;
        if let Some((key, left, right)) = first_conflict(a, b) {
            return Err(CheckError::AttributeConflict {
                kind,
                identity: id.to_string(),
                key,
                left_source,
                left,
                right_source,
                right,
            });
        }
        tracing::debug!(%kind, identity = %id, %left_source, %right_source, "divergent only in one-sided keys");
    }

    Ok((overlapping, divergent))
}

fn percent(part: usize, whole: usize) -> Option<f64> {
    (whole > 0).then(|| 100.0 * part as f64 / whole as f64)
}

/// Compares every pair of sources and enforces attribute agreement.
#[derive(Debug, Clone)]
pub struct ConsistencyChecker {
    reference: SourceTag,
}

impl Default for ConsistencyChecker {
    fn default() -> Self {
        Self::new(SourceTag::Journalist)
    }
}

impl ConsistencyChecker {
    /// `reference` is the broadest source, against which coverage is reported
    pub fn new(reference: SourceTag) -> Self {
        Self { reference }
    }

    pub fn check(&self, datasets: &[SourceDataset]) -> Result<ConsistencyReport, CheckError> {
        let mut duplicates = Vec::new();
        let mut indexes = datasets
            .iter()
            .map(|d| SourceIndex::build(d, &mut duplicates))
            .collect::<Result<Vec<_>, _>>()?;
        indexes.sort_by_key(|i| i.tag);

        for dup in &duplicates {
            tracing::warn!(source = %dup.source, kind = %dup.kind, identity = %dup.identity, "duplicate identity within source");
        }

        let mut pairs = Vec::new();
        for (i, a) in indexes.iter().enumerate() {
            for b in &indexes[i + 1..] {
                let (overlapping_nodes, divergent_nodes) =
                    compare(ElementKind::Node, a.tag, &a.nodes, b.tag, &b.nodes)?;
                let (overlapping_edges, divergent_edges) =
                    compare(ElementKind::Edge, a.tag, &a.edges, b.tag, &b.edges)?;

                let other = if a.tag == self.reference {
                    Some(b)
                } else if b.tag == self.reference {
                    Some(a)
                } else {
                    None
                };

                let overlap = PairOverlap {
                    left: a.tag,
                    right: b.tag,
                    overlapping_nodes,
                    divergent_nodes,
                    overlapping_edges,
                    divergent_edges,
                    node_coverage_pct: other.and_then(|o| percent(overlapping_nodes, o.nodes.len())),
                    edge_coverage_pct: other.and_then(|o| percent(overlapping_edges, o.edges.len())),
                };

                tracing::info!(
                    left = %overlap.left,
                    right = %overlap.right,
                    nodes = overlap.overlapping_nodes,
                    edges = overlap.overlapping_edges,
                    node_coverage_pct = ?overlap.node_coverage_pct,
                    "source overlap"
                );
                pairs.push(overlap);
            }
        }

        let (reference_only_nodes, reference_only_edges) = match indexes.iter().find(|i| i.tag == self.reference) {
            Some(reference) => {
                let others: Vec<&SourceIndex> =
                    indexes.iter().filter(|i| i.tag != self.reference).collect();
                let seen_nodes: BTreeSet<&ElementId> =
                    others.iter().flat_map(|o| o.nodes.keys()).collect();
                let seen_edges: BTreeSet<&EdgeId> =
                    others.iter().flat_map(|o| o.edges.keys()).collect();
                (
                    reference.nodes.keys().filter(|k| !seen_nodes.contains(k)).count(),
                    reference.edges.keys().filter(|k| !seen_edges.contains(k)).count(),
                )
            }
            None => (0, 0),
        };

        tracing::info!(
            reference = %self.reference,
            nodes = reference_only_nodes,
            edges = reference_only_edges,
            "identities only in reference source"
        );

        Ok(ConsistencyReport {
            reference: self.reference,
            pairs,
            duplicates,
            reference_only_nodes,
            reference_only_edges,
        })
    }
}
