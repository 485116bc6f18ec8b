//! Persistence of the reconciled graph
//!
//! Backends implement the `GraphStore` trait. All writes go through a
//! `WriteSession`; the primary implementation is `SqliteStore`.

mod model;
mod sqlite;
mod traits;

pub use model::{
    label_for, CanonicalSnapshot, StoreStats, StoredEdge, StoredNode, Subgraph, IS_LABEL,
    PLACE_LABEL, ROADMAP_PLACE_LABEL, ROUTE_LABEL,
};
pub use sqlite::SqliteStore;
pub use traits::{GraphStore, OpenStore, StorageError, StorageResult, WriteSession};
