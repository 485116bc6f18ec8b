//! Full reconciliation: load, check, repair, merge, normalize, persist
//!
//! Every fatal check runs before the store is touched. Persistence then
//! happens in one write session: the store is cleared and reloaded, and the
//! session is committed only after the last route is written.

use crate::check::{CheckError, ConsistencyChecker, ConsistencyReport};
use crate::config::{ConfigError, DataFiles, ReconcileConfig};
use crate::graph::{CanonicalGraph, EdgeId, ElementId, RoadmapGraph, SourceDataset, SourceTag};
use crate::loader::{load_roadmap_file, load_source_file, LoadError};
use crate::merge::{merge_sources, MergeStats};
use crate::repair::{RepairError, RepairReport};
use crate::storage::{label_for, GraphStore, StorageError, StoredEdge, StoredNode};
use crate::temporal::{TemporalError, TemporalReport};
use serde::Serialize;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Check(#[from] CheckError),

    #[error(transparent)]
    Repair(#[from] RepairError),

    #[error(transparent)]
    Temporal(#[from] TemporalError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Node {id} still has no type after repair")]
    UnresolvedType { id: ElementId },

    #[error("Edge {id} still has no role after repair")]
    UnresolvedRole { id: EdgeId },

    #[error("Edge {edge} references missing node {endpoint}")]
    DanglingEdge { edge: EdgeId, endpoint: ElementId },
}

/// Result type for reconciliation
pub type ReconcileResult<T> = Result<T, ReconcileError>;

/// Everything a run reads: the per-source datasets and the road network
#[derive(Debug, Clone, Default)]
pub struct SourceInputs {
    pub datasets: Vec<SourceDataset>,
    pub roadmap: RoadmapGraph,
}

impl SourceInputs {
    pub fn new(datasets: Vec<SourceDataset>, roadmap: RoadmapGraph) -> Self {
        Self { datasets, roadmap }
    }

    /// Read all three source documents and the roadmap from `data_dir`.
    pub fn load(data_dir: &Path, files: &DataFiles) -> Result<Self, LoadError> {
        let mut datasets = Vec::with_capacity(SourceTag::ALL.len());
        for tag in SourceTag::ALL {
            datasets.push(load_source_file(&files.source_path(data_dir, tag), tag)?);
        }
        let roadmap = load_roadmap_file(&files.roadmap_path(data_dir))?;

        tracing::info!(
            dir = %data_dir.display(),
            sources = datasets.len(),
            roadmap_nodes = roadmap.nodes.len(),
            routes = roadmap.routes.len(),
            "loaded source documents"
        );
        Ok(Self { datasets, roadmap })
    }
}

/// The validated canonical graph, ready to be written
#[derive(Debug, Clone)]
pub struct Prepared {
    pub nodes: Vec<StoredNode>,
    pub edges: Vec<StoredEdge>,
    pub consistency: ConsistencyReport,
    pub repair: RepairReport,
    pub merge: MergeStats,
    pub temporal: TemporalReport,
}

/// What was written to the store
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PersistStats {
    pub nodes: usize,
    pub edges: usize,
    pub roadmap_nodes: usize,
    pub correspondences: usize,
    pub routes: usize,
    /// Routes repeating an existing route in the other direction
    pub duplicate_routes: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub consistency: ConsistencyReport,
    pub repair: RepairReport,
    pub merge: MergeStats,
    pub temporal: TemporalReport,
    pub persisted: PersistStats,
}

/// Convert the canonical graph to stored elements, enforcing that every
/// node has a type, every edge a role, and every edge endpoint exists.
fn to_stored(graph: CanonicalGraph) -> ReconcileResult<(Vec<StoredNode>, Vec<StoredEdge>)> {
    for edge in graph.edges() {
        for endpoint in [&edge.id.source, &edge.id.target] {
            if graph.get_node(endpoint).is_none() {
                return Err(ReconcileError::DanglingEdge {
                    edge: edge.id.clone(),
                    endpoint: endpoint.clone(),
                });
            }
        }
    }

    let mut nodes = Vec::with_capacity(graph.node_count());
    for node in graph.nodes.into_values() {
        let Some(node_type) = &node.node_type else {
            return Err(ReconcileError::UnresolvedType { id: node.id });
        };
        nodes.push(StoredNode::new(label_for(node_type), node.id, node.provenance, node.attributes));
    }

    let mut edges = Vec::with_capacity(graph.edges.len());
    for edge in graph.edges.into_values() {
        let Some(role) = &edge.role else {
            return Err(ReconcileError::UnresolvedRole { id: edge.id });
        };
        edges.push(StoredEdge::new(label_for(role), edge.id, edge.provenance, edge.attributes));
    }

    Ok((nodes, edges))
}

/// Runs the reconciliation pipeline under one configuration.
#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    config: ReconcileConfig,
}

impl Reconciler {
    pub fn new(config: ReconcileConfig) -> Self {
        Self { config }
    }

    /// Build from a YAML configuration file, or the defaults when `path` is `None`.
    pub fn from_config_file(path: Option<&Path>) -> ReconcileResult<Self> {
        let config = match path {
            Some(path) => ReconcileConfig::from_file(path)?,
            None => ReconcileConfig::default(),
        };
        Ok(Self::new(config))
    }

    pub fn config(&self) -> &ReconcileConfig {
        &self.config
    }

    /// Read the inputs named by the configuration from `data_dir`.
    pub fn load_inputs(&self, data_dir: &Path) -> ReconcileResult<SourceInputs> {
        Ok(SourceInputs::load(data_dir, &self.config.files)?)
    }

    /// Check, repair, merge and normalize without touching any store.
    pub fn prepare(&self, mut datasets: Vec<SourceDataset>) -> ReconcileResult<Prepared> {
        let consistency = ConsistencyChecker::new(self.config.reference_source).check(&datasets)?;
        let repair = self.config.repairer().repair(&mut datasets)?;
        let (mut graph, merge) = merge_sources(&datasets);
        let temporal = self.config.normalizer().normalize(&mut graph)?;
        let (nodes, edges) = to_stored(graph)?;

        Ok(Prepared {
            nodes,
            edges,
            consistency,
            repair,
            merge,
            temporal,
        })
    }

    /// Reconcile `inputs` and replace the contents of `store` with the result.
    ///
    /// On any error the store is left as it was.
    pub fn run(&self, inputs: SourceInputs, store: &dyn GraphStore) -> ReconcileResult<RunSummary> {
        let prepared = self.prepare(inputs.datasets)?;
        let persisted = persist(&prepared, &inputs.roadmap, store)?;

        tracing::info!(
            nodes = persisted.nodes,
            edges = persisted.edges,
            roadmap_nodes = persisted.roadmap_nodes,
            routes = persisted.routes,
            correspondences = persisted.correspondences,
            "reconciliation complete"
        );

        Ok(RunSummary {
            consistency: prepared.consistency,
            repair: prepared.repair,
            merge: prepared.merge,
            temporal: prepared.temporal,
            persisted,
        })
    }

    /// Load from `data_dir` and run, but only when the store holds nothing yet.
    ///
    /// Returns `None` when the store was already populated.
    pub fn run_if_empty(&self, data_dir: &Path, store: &dyn GraphStore) -> ReconcileResult<Option<RunSummary>> {
        if !store.is_empty()? {
            tracing::info!("store already populated, skipping reconciliation");
            return Ok(None);
        }
        let inputs = self.load_inputs(data_dir)?;
        self.run(inputs, store).map(Some)
    }
}

fn persist(prepared: &Prepared, roadmap: &RoadmapGraph, store: &dyn GraphStore) -> ReconcileResult<PersistStats> {
    let mut stats = PersistStats::default();
    let mut session = store.session()?;

    session.clear()?;
    for node in &prepared.nodes {
        session.create_node(node)?;
        stats.nodes += 1;
    }
    for edge in &prepared.edges {
        session.create_edge(edge)?;
        stats.edges += 1;
    }
    for node in &roadmap.nodes {
        session.create_roadmap_node(node)?;
        stats.roadmap_nodes += 1;
    }
    stats.correspondences = session.link_roadmap_places()?;
    for route in &roadmap.routes {
        if session.create_route(route)? {
            stats.routes += 1;
        } else {
            stats.duplicate_routes += 1;
        }
    }

    session.commit()?;
    Ok(stats)
}
