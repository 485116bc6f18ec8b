//! Shared fixtures for integration tests
//!
//! The fixture is a small, consistent set of the three source documents and a
//! road map, written to a temporary data directory.
//!
//! | identity              | journalist | FILAH | TROUT |
//! |-----------------------|------------|-------|-------|
//! | harbor (place by lat) | x          | x     | x     |
//! | trip_1                | x          | x     | x     |
//! | Sean                  | x          | x     | x     |
//! | office                | x          |       | x     |
//! | meeting_1             | x          |       |       |
//! | trip_1 → harbor       | x          | x     | x     |
//! | trip_1 → Sean         | x          |       | x     |
//! | Sean → meeting_1      | x          |       |       |

#![allow(dead_code)]

use serde_json::{json, Value};
use std::path::Path;
use tempfile::TempDir;
use vastgraph::{
    CorrectionTable, OpenStore, ReconcileConfig, Reconciler, RunSummary, SourceDataset, SourceTag,
    SqliteStore,
};

pub fn journalist_doc() -> Value {
    json!({
        "nodes": [
            {"id": "harbor", "lat": 39.1, "lon": -12.0, "name": "Harbor"},
            {"id": "trip_1", "type": "trip", "date": "0040-03-02"},
            {"id": "Sean", "type": "entity.person", "nickname": null},
            {"id": "office", "type": "place", "lat": 39.2},
            {"id": "meeting_1", "type": "meeting", "date": "1999-01-01"}
        ],
        "links": [
            {"source": "trip_1", "target": "harbor", "key": 0, "time": "0040-03-02T08:00:00"},
            {"source": "trip_1", "target": "Sean", "key": 0},
            {"source": "Sean", "target": "meeting_1", "key": 0, "role": "participant"}
        ]
    })
}

pub fn filah_doc() -> Value {
    json!({
        "nodes": [
            {"id": "harbor", "lat": 39.1},
            {"id": "trip_1", "type": "trip"},
            {"id": "Sean", "type": "entity.person"}
        ],
        "links": [
            {"source": "trip_1", "target": "harbor"}
        ]
    })
}

pub fn trout_doc() -> Value {
    json!({
        "nodes": [
            {"id": "harbor", "lat": 39.1, "name": "Harbor"},
            {"id": "trip_1", "type": "trip"},
            {"id": "Sean", "type": "entity.person"},
            {"id": "office", "type": "place", "lat": 39.2}
        ],
        "links": [
            {"source": "trip_1", "target": "harbor", "key": 0},
            {"source": "trip_1", "target": "Sean", "key": 0}
        ]
    })
}

pub fn roadmap_doc() -> Value {
    json!({
        "nodes": [
            {"id": "harbor"},
            {"id": "crossing", "lat": 39.15}
        ],
        "links": [
            {"source": "harbor", "target": "crossing", "key": 0},
            {"source": "crossing", "target": "harbor", "key": 0}
        ]
    })
}

/// A temporary data directory holding the four documents
pub struct Fixture {
    dir: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_documents(journalist_doc(), filah_doc(), trout_doc())
    }

    pub fn with_documents(journalist: Value, filah: Value, trout: Value) -> Self {
        let dir = tempfile::tempdir().unwrap();
        write_json(dir.path(), "journalist.json", &journalist);
        write_json(dir.path(), "FILAH.json", &filah);
        write_json(dir.path(), "TROUT.json", &trout);
        write_json(dir.path(), "road_map.json", &roadmap_doc());
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

fn write_json(dir: &Path, name: &str, doc: &Value) {
    std::fs::write(dir.join(name), serde_json::to_string_pretty(doc).unwrap()).unwrap();
}

/// Defaults without the correction table, which targets the full journalist data
pub fn test_config() -> ReconcileConfig {
    ReconcileConfig {
        corrections: CorrectionTable::default(),
        ..ReconcileConfig::default()
    }
}

pub fn datasets() -> Vec<SourceDataset> {
    vec![
        SourceDataset::from_json(SourceTag::Journalist, &journalist_doc()).unwrap(),
        SourceDataset::from_json(SourceTag::Filah, &filah_doc()).unwrap(),
        SourceDataset::from_json(SourceTag::Trout, &trout_doc()).unwrap(),
    ]
}

/// Reconcile the default fixture into a fresh in-memory store
pub fn reconciled_store() -> (SqliteStore, RunSummary) {
    let fixture = Fixture::new();
    let store = SqliteStore::open_in_memory().unwrap();
    let reconciler = Reconciler::new(test_config());
    let inputs = reconciler.load_inputs(fixture.path()).unwrap();
    let summary = reconciler.run(inputs, &store).unwrap();
    (store, summary)
}
