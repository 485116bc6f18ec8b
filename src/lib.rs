//! vastgraph: multi-source graph reconciliation
//!
//! Three independently collected graphs describing overlapping people,
//! organizations, places and events are checked against each other, repaired,
//! merged into one provenance-tagged canonical graph and persisted. The
//! persisted graph is then compared per source through skeleton queries.
//!
//! # Core Concepts
//!
//! - **Sources**: the journalist, FILAH and TROUT datasets, merged in that order
//! - **Provenance**: every canonical node and edge records which sources attest it
//! - **Skeleton**: the induced subgraph attested by a given set of sources
//!
//! # Example
//!
//! ```
//! use vastgraph::{
//!     skeleton, NodeRecord, OpenStore, ReconcileConfig, Reconciler, RoadmapGraph,
//!     SourceDataset, SourceInputs, SourceTag, SqliteStore,
//! };
//!
//! let config = ReconcileConfig {
//!     corrections: Default::default(),
//!     ..Default::default()
//! };
//! let datasets = SourceTag::ALL
//!     .iter()
//!     .map(|&tag| SourceDataset::new(tag).with_node(NodeRecord::new("harbor").with_attribute("lat", 1.0)))
//!     .collect();
//!
//! let store = SqliteStore::open_in_memory().unwrap();
//! Reconciler::new(config)
//!     .run(SourceInputs::new(datasets, RoadmapGraph::new()), &store)
//!     .unwrap();
//!
//! let shared = skeleton(&store, &SourceTag::ALL).unwrap();
//! assert_eq!(shared.nodes.len(), 1);
//! assert_eq!(shared.nodes[0].label, "PLACE");
//! ```

pub mod check;
pub mod config;
mod graph;
pub mod loader;
pub mod merge;
pub mod pipeline;
pub mod query;
pub mod repair;
pub mod storage;
pub mod temporal;

pub use check::{CheckError, ConsistencyChecker, ConsistencyReport, ElementKind};
pub use config::{ConfigError, DataFiles, ReconcileConfig};
pub use graph::{
    attributes_agree, AttributeValue, Attributes, CanonicalEdge, CanonicalGraph, CanonicalNode,
    EdgeId, EdgeRecord, ElementId, NodeRecord, Provenance, RoadmapGraph, RoadmapNode,
    RoadmapRoute, SourceDataset, SourceTag,
};
pub use loader::{load_roadmap_file, load_source_file, strip_nulls, LoadError};
pub use merge::{merge_sources, MergeEngine, MergeStats};
pub use pipeline::{
    PersistStats, Prepared, ReconcileError, ReconcileResult, Reconciler, RunSummary, SourceInputs,
};
pub use query::{dataset_unique, skeleton, DatasetUniqueQuery, SkeletonQuery};
pub use repair::{CorrectionTable, RepairError, RepairReport, Repairer, RoleRule, RoleRules, TypeCorrection};
pub use storage::{
    CanonicalSnapshot, GraphStore, OpenStore, SqliteStore, StorageError, StorageResult, StoreStats,
    StoredEdge, StoredNode, Subgraph, WriteSession,
};
pub use temporal::{TemporalError, TemporalNormalizer, TemporalReport};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
