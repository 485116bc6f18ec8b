//! Storage trait definitions

use super::model::{CanonicalSnapshot, StoreStats, StoredEdge, StoredNode};
use crate::graph::{RoadmapGraph, RoadmapNode, RoadmapRoute};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Edge {edge} references missing {layer} node {endpoint}")]
    MissingEndpoint {
        layer: &'static str,
        edge: String,
        endpoint: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store connection lock poisoned")]
    LockPoisoned,
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Exclusive, all-or-nothing write access to a store.
///
/// Nothing written through a session is visible to readers until `commit`.
/// Dropping a session without committing discards its writes.
pub trait WriteSession {
    /// Remove every node and edge, canonical and roadmap alike
    fn clear(&mut self) -> StorageResult<()>;

    fn create_node(&mut self, node: &StoredNode) -> StorageResult<()>;

    /// Both endpoints must already exist as canonical nodes.
    fn create_edge(&mut self, edge: &StoredEdge) -> StorageResult<()>;

    fn create_roadmap_node(&mut self, node: &RoadmapNode) -> StorageResult<()>;

    /// Add an `IS` edge from every roadmap node to the `PLACE` node sharing
    /// its identity. Returns the number of links created.
    fn link_roadmap_places(&mut self) -> StorageResult<usize>;

    /// Create an undirected route. Returns false when a route with the same
    /// endpoints (in either direction) and key already exists.
    fn create_route(&mut self, route: &RoadmapRoute) -> StorageResult<bool>;

    fn commit(self: Box<Self>) -> StorageResult<()>;
}

/// Trait for graph storage backends
///
/// Implementations must be thread-safe (Send + Sync) so the read layer can
/// query one store from several threads.
pub trait GraphStore: Send + Sync {
    /// Start a write session. Only one session can be open at a time.
    fn session(&self) -> StorageResult<Box<dyn WriteSession + '_>>;

    /// True when no node of any layer has been stored
    fn is_empty(&self) -> StorageResult<bool>;

    /// Read every canonical node and edge
    fn load_canonical(&self) -> StorageResult<CanonicalSnapshot>;

    /// Read the stored road network
    fn load_roadmap(&self) -> StorageResult<RoadmapGraph>;

    fn stats(&self) -> StorageResult<StoreStats>;
}

/// Extension trait for opening stores from paths
pub trait OpenStore: GraphStore + Sized {
    /// Open or create a store at the given path
    fn open(path: impl AsRef<Path>) -> StorageResult<Self>;

    /// Create an in-memory store (useful for testing)
    fn open_in_memory() -> StorageResult<Self>;
}
