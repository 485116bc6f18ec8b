//! SQLite storage backend
//!
//! The labeled property graph is stored in two tables. Every row belongs to a
//! layer: `canonical` for the reconciled graph, `roadmap` for the road network
//! and `correspondence` for the `IS` edges joining the two. Identities are
//! stored as JSON so integer and string ids stay distinct.

use super::model::{
    CanonicalSnapshot, StoreStats, StoredEdge, StoredNode, IS_LABEL, PLACE_LABEL,
    ROADMAP_PLACE_LABEL, ROUTE_LABEL,
};
use super::traits::{GraphStore, OpenStore, StorageError, StorageResult, WriteSession};
use crate::graph::{
    Attributes, EdgeId, ElementId, Provenance, RoadmapGraph, RoadmapNode, RoadmapRoute,
};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const CANONICAL: &str = "canonical";
const ROADMAP: &str = "roadmap";
const CORRESPONDENCE: &str = "correspondence";

/// SQLite-backed graph store
///
/// Uses a single SQLite database file. Thread-safe via internal mutex on the
/// connection; an open write session holds the mutex until it ends.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    fn init_schema(conn: &Connection) -> StorageResult<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS nodes (
                nid INTEGER PRIMARY KEY,
                layer TEXT NOT NULL,
                label TEXT NOT NULL,
                id_json TEXT NOT NULL,
                in_graph_json TEXT NOT NULL,
                properties_json TEXT NOT NULL,
                UNIQUE (layer, id_json)
            );

            CREATE INDEX IF NOT EXISTS idx_nodes_label
                ON nodes(layer, label);

            CREATE TABLE IF NOT EXISTS edges (
                eid INTEGER PRIMARY KEY,
                layer TEXT NOT NULL,
                label TEXT NOT NULL,
                source_nid INTEGER NOT NULL,
                target_nid INTEGER NOT NULL,
                key_json TEXT NOT NULL,
                in_graph_json TEXT NOT NULL,
                properties_json TEXT NOT NULL,
                UNIQUE (layer, source_nid, target_nid, key_json),
                FOREIGN KEY (source_nid) REFERENCES nodes(nid) ON DELETE CASCADE,
                FOREIGN KEY (target_nid) REFERENCES nodes(nid) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_edges_source
                ON edges(layer, source_nid);
            CREATE INDEX IF NOT EXISTS idx_edges_target
                ON edges(layer, target_nid);

            PRAGMA foreign_keys = ON;

            -- Readers keep working while a reload is in progress
            PRAGMA journal_mode = WAL;
            "#,
        )?;
        Ok(())
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StorageError::LockPoisoned)
    }

    /// Serialize a node to database columns: (id, in_graph, properties)
    fn node_to_row(node: &StoredNode) -> StorageResult<(String, String, String)> {
        Ok((
            serde_json::to_string(&node.id)?,
            serde_json::to_string(&node.in_graph)?,
            serde_json::to_string(&node.properties)?,
        ))
    }

    fn row_to_node(
        label: String,
        id_json: String,
        in_graph_json: String,
        properties_json: String,
    ) -> StorageResult<StoredNode> {
        Ok(StoredNode {
            label,
            id: serde_json::from_str(&id_json)?,
            in_graph: serde_json::from_str(&in_graph_json)?,
            properties: serde_json::from_str(&properties_json)?,
        })
    }

    fn row_to_edge(
        label: String,
        source_json: String,
        target_json: String,
        key_json: String,
        in_graph_json: String,
        properties_json: String,
    ) -> StorageResult<StoredEdge> {
        Ok(StoredEdge {
            label,
            id: EdgeId {
                source: serde_json::from_str(&source_json)?,
                target: serde_json::from_str(&target_json)?,
                key: serde_json::from_str(&key_json)?,
            },
            in_graph: serde_json::from_str(&in_graph_json)?,
            properties: serde_json::from_str(&properties_json)?,
        })
    }

    fn count_by_layer(conn: &Connection, table: &str) -> StorageResult<Vec<(String, usize)>> {
        let mut stmt = conn.prepare(&format!("SELECT layer, COUNT(*) FROM {} GROUP BY layer", table))?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?;
        let mut counts = Vec::new();
        for row in rows {
            let (layer, count) = row?;
            counts.push((layer, count as usize));
        }
        Ok(counts)
    }
}

impl OpenStore for SqliteStore {
    fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        Self::init_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl GraphStore for SqliteStore {
    fn session(&self) -> StorageResult<Box<dyn WriteSession + '_>> {
        let session = SqliteSession::begin(self.lock()?)?;
        Ok(Box::new(session))
    }

    fn is_empty(&self) -> StorageResult<bool> {
        let conn = self.lock()?;
        let any: bool = conn.query_row("SELECT EXISTS(SELECT 1 FROM nodes)", [], |row| row.get(0))?;
        Ok(!any)
    }

    fn load_canonical(&self) -> StorageResult<CanonicalSnapshot> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            "SELECT label, id_json, in_graph_json, properties_json FROM nodes WHERE layer = ?1",
        )?;
        let nodes_iter = stmt.query_map(params![CANONICAL], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut nodes = Vec::new();
        for row in nodes_iter {
            let (label, id, in_graph, props) = row?;
            nodes.push(Self::row_to_node(label, id, in_graph, props)?);
        }

        let mut stmt = conn.prepare(
            r#"
            SELECT e.label, s.id_json, t.id_json, e.key_json, e.in_graph_json, e.properties_json
            FROM edges e
            JOIN nodes s ON s.nid = e.source_nid
            JOIN nodes t ON t.nid = e.target_nid
            WHERE e.layer = ?1
            "#,
        )?;
        let edges_iter = stmt.query_map(params![CANONICAL], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
            ))
        })?;

        let mut edges = Vec::new();
        for row in edges_iter {
            let (label, source, target, key, in_graph, props) = row?;
            edges.push(Self::row_to_edge(label, source, target, key, in_graph, props)?);
        }

        Ok(CanonicalSnapshot::new(nodes, edges))
    }

    fn load_roadmap(&self) -> StorageResult<RoadmapGraph> {
        let conn = self.lock()?;
        let mut graph = RoadmapGraph::new();

        let mut stmt = conn.prepare("SELECT id_json, properties_json FROM nodes WHERE layer = ?1 ORDER BY nid")?;
        let rows = stmt.query_map(params![ROADMAP], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        for row in rows {
            let (id, props) = row?;
            graph.nodes.push(RoadmapNode {
                id: serde_json::from_str(&id)?,
                attributes: serde_json::from_str(&props)?,
            });
        }

        let mut stmt = conn.prepare(
            r#"
            SELECT s.id_json, t.id_json, e.key_json
            FROM edges e
            JOIN nodes s ON s.nid = e.source_nid
            JOIN nodes t ON t.nid = e.target_nid
            WHERE e.layer = ?1
            ORDER BY e.eid
            "#,
        )?;
        let rows = stmt.query_map(params![ROADMAP], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;
        for row in rows {
            let (source, target, key) = row?;
            graph.routes.push(RoadmapRoute {
                source: serde_json::from_str(&source)?,
                target: serde_json::from_str(&target)?,
                key: serde_json::from_str(&key)?,
            });
        }

        Ok(graph)
    }

    fn stats(&self) -> StorageResult<StoreStats> {
        let conn = self.lock()?;
        let mut stats = StoreStats::default();

        for (layer, count) in Self::count_by_layer(&conn, "nodes")? {
            match layer.as_str() {
                CANONICAL => stats.canonical_nodes = count,
                ROADMAP => stats.roadmap_nodes = count,
                _ => {}
            }
        }
        for (layer, count) in Self::count_by_layer(&conn, "edges")? {
            match layer.as_str() {
                CANONICAL => stats.canonical_edges = count,
                ROADMAP => stats.routes = count,
                CORRESPONDENCE => stats.correspondences = count,
                _ => {}
            }
        }

        let mut stmt = conn.prepare("SELECT label, COUNT(*) FROM nodes WHERE layer = ?1 GROUP BY label")?;
        let rows = stmt.query_map(params![CANONICAL], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;
        for row in rows {
            let (label, count) = row?;
            stats.labels.insert(label, count as usize);
        }

        Ok(stats)
    }
}

/// A write session wrapping one `BEGIN IMMEDIATE` transaction.
///
/// Rolled back on drop unless committed.
struct SqliteSession<'a> {
    conn: MutexGuard<'a, Connection>,
    open: bool,
}

impl<'a> SqliteSession<'a> {
    fn begin(conn: MutexGuard<'a, Connection>) -> StorageResult<Self> {
        conn.execute_batch("BEGIN IMMEDIATE")?;
        Ok(Self { conn, open: true })
    }

    fn node_nid(&self, layer: &str, id: &ElementId) -> StorageResult<Option<i64>> {
        let id_json = serde_json::to_string(id)?;
        let nid = self
            .conn
            .query_row(
                "SELECT nid FROM nodes WHERE layer = ?1 AND id_json = ?2",
                params![layer, id_json],
                |row| row.get(0),
            )
            .optional()?;
        Ok(nid)
    }

    fn require_nid(&self, layer: &'static str, id: &ElementId, edge: &dyn std::fmt::Display) -> StorageResult<i64> {
        self.node_nid(layer, id)?.ok_or_else(|| StorageError::MissingEndpoint {
            layer,
            edge: edge.to_string(),
            endpoint: id.to_string(),
        })
    }
}

impl WriteSession for SqliteSession<'_> {
    fn clear(&mut self) -> StorageResult<()> {
        self.conn.execute_batch("DELETE FROM edges; DELETE FROM nodes;")?;
        Ok(())
    }

    fn create_node(&mut self, node: &StoredNode) -> StorageResult<()> {
        let (id_json, in_graph_json, properties_json) = SqliteStore::node_to_row(node)?;
        self.conn.execute(
            "INSERT INTO nodes (layer, label, id_json, in_graph_json, properties_json) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![CANONICAL, node.label, id_json, in_graph_json, properties_json],
        )?;
        Ok(())
    }

    fn create_edge(&mut self, edge: &StoredEdge) -> StorageResult<()> {
        let source = self.require_nid(CANONICAL, &edge.id.source, &edge.id)?;
        let target = self.require_nid(CANONICAL, &edge.id.target, &edge.id)?;
        self.conn.execute(
            r#"
            INSERT INTO edges (layer, label, source_nid, target_nid, key_json, in_graph_json, properties_json)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                CANONICAL,
                edge.label,
                source,
                target,
                serde_json::to_string(&edge.id.key)?,
                serde_json::to_string(&edge.in_graph)?,
                serde_json::to_string(&edge.properties)?,
            ],
        )?;
        Ok(())
    }

    fn create_roadmap_node(&mut self, node: &RoadmapNode) -> StorageResult<()> {
        self.conn.execute(
            "INSERT INTO nodes (layer, label, id_json, in_graph_json, properties_json) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                ROADMAP,
                ROADMAP_PLACE_LABEL,
                serde_json::to_string(&node.id)?,
                serde_json::to_string(&Provenance::new())?,
                serde_json::to_string(&node.attributes)?,
            ],
        )?;
        Ok(())
    }

    fn link_roadmap_places(&mut self) -> StorageResult<usize> {
        let created = self.conn.execute(
            r#"
            INSERT OR IGNORE INTO edges (layer, label, source_nid, target_nid, key_json, in_graph_json, properties_json)
            SELECT ?1, ?2, r.nid, c.nid, '0', '[]', '{}'
            FROM nodes r
            JOIN nodes c ON c.id_json = r.id_json
            WHERE r.layer = ?3 AND c.layer = ?4 AND c.label = ?5
            "#,
            params![CORRESPONDENCE, IS_LABEL, ROADMAP, CANONICAL, PLACE_LABEL],
        )?;
        Ok(created)
    }

    fn create_route(&mut self, route: &RoadmapRoute) -> StorageResult<bool> {
        let label = format!("{}-{}-{}", route.source, route.target, route.key);
        let (first, second) = route.endpoints();
        let source = self.require_nid(ROADMAP, first, &label)?;
        let target = self.require_nid(ROADMAP, second, &label)?;
        let created = self.conn.execute(
            r#"
            INSERT OR IGNORE INTO edges (layer, label, source_nid, target_nid, key_json, in_graph_json, properties_json)
            VALUES (?1, ?2, ?3, ?4, ?5, '[]', ?6)
            "#,
            params![
                ROADMAP,
                ROUTE_LABEL,
                source,
                target,
                serde_json::to_string(&route.key)?,
                serde_json::to_string(&Attributes::new())?,
            ],
        )?;
        Ok(created == 1)
    }

    fn commit(mut self: Box<Self>) -> StorageResult<()> {
        self.conn.execute_batch("COMMIT")?;
        self.open = false;
        Ok(())
    }
}

impl Drop for SqliteSession<'_> {
    fn drop(&mut self) {
        if !self.open {
            return;
        }
        match self.conn.execute_batch("ROLLBACK") {
            Ok(()) => tracing::debug!("write session rolled back"),
            Err(e) => tracing::warn!(error = %e, "failed to roll back write session"),
        }
    }
}
