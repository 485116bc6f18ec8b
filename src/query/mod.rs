//! Read-time set algebra over the persisted canonical graph
//!
//! Queries run against a `CanonicalSnapshot`; the functions here load a
//! snapshot from a store first. Both are read-only.

mod skeleton;
mod unique;

pub use skeleton::SkeletonQuery;
pub use unique::DatasetUniqueQuery;

use crate::graph::SourceTag;
use crate::storage::{GraphStore, StorageResult, Subgraph};

/// Elements of the stored canonical graph attested by every `required` source.
pub fn skeleton(store: &dyn GraphStore, required: &[SourceTag]) -> StorageResult<Subgraph> {
    let snapshot = store.load_canonical()?;
    let result = SkeletonQuery::new(required.iter().copied()).execute(&snapshot);
    tracing::debug!(?required, nodes = result.nodes.len(), edges = result.edges.len(), "skeleton query");
    Ok(result)
}

/// Elements the reference source shares with `source` beyond the all-source skeleton.
pub fn dataset_unique(store: &dyn GraphStore, source: SourceTag) -> StorageResult<Subgraph> {
    let snapshot = store.load_canonical()?;
    let result = DatasetUniqueQuery::new(source).execute(&snapshot);
    tracing::debug!(%source, nodes = result.nodes.len(), edges = result.edges.len(), "dataset unique query");
    Ok(result)
}
