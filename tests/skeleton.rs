//! Skeleton and dataset-unique queries over a reconciled store

mod common;

use common::{reconciled_store, test_config, Fixture};
use std::collections::BTreeSet;
use vastgraph::{
    dataset_unique, skeleton, DatasetUniqueQuery, EdgeId, ElementId, GraphStore, OpenStore,
    Reconciler, SkeletonQuery, SourceTag, SqliteStore, Subgraph,
};

fn node_ids(subgraph: &Subgraph) -> Vec<String> {
    subgraph.nodes.iter().map(|n| n.id.to_string()).collect()
}

#[test]
fn skeleton_of_all_sources() {
    let (store, _) = reconciled_store();
    let result = skeleton(&store, &SourceTag::ALL).unwrap();

    assert_eq!(node_ids(&result), ["Sean", "harbor", "trip_1"]);
    assert_eq!(result.edges.len(), 1);
    assert_eq!(result.edges[0].id, EdgeId::new("trip_1", "harbor", 0));
}

#[test]
fn skeleton_then_unique_trout() {
    let (store, _) = reconciled_store();

    let shared = skeleton(&store, &SourceTag::ALL).unwrap();
    let unique = dataset_unique(&store, SourceTag::Trout).unwrap();

    assert_eq!(node_ids(&unique), ["office"]);
    assert_eq!(unique.edges.len(), 1);
    assert_eq!(unique.edges[0].id, EdgeId::new("trip_1", "Sean", 0));
    assert!(unique.edges[0].in_graph.is_superset_of(&[SourceTag::Journalist, SourceTag::Trout]));

    let shared_ids: BTreeSet<_> = shared.nodes.iter().map(|n| &n.id).collect();
    assert!(unique.nodes.iter().all(|n| !shared_ids.contains(&n.id)));
}

#[test]
fn filah_adds_nothing_beyond_the_skeleton() {
    let (store, _) = reconciled_store();
    let unique = dataset_unique(&store, SourceTag::Filah).unwrap();
    assert!(unique.is_empty());
}

#[test]
fn unique_is_disjoint_from_skeleton_for_every_source() {
    let (store, _) = reconciled_store();
    let snapshot = store.load_canonical().unwrap();
    let shared = SkeletonQuery::all().execute(&snapshot);
    let shared_nodes: BTreeSet<_> = shared.nodes.iter().map(|n| n.id.clone()).collect();
    let shared_edges: BTreeSet<_> = shared.edges.iter().map(|e| e.id.clone()).collect();

    for source in SourceTag::ALL {
        let unique = DatasetUniqueQuery::new(source).execute(&snapshot);
        assert!(unique.nodes.iter().all(|n| !shared_nodes.contains(&n.id)), "{source}");
        assert!(unique.edges.iter().all(|e| !shared_edges.contains(&e.id)), "{source}");
    }
}

#[test]
fn skeleton_is_an_induced_subgraph() {
    let (store, _) = reconciled_store();
    for required in [
        vec![SourceTag::Journalist],
        vec![SourceTag::Journalist, SourceTag::Trout],
        vec![SourceTag::Filah],
    ] {
        let result = skeleton(&store, &required).unwrap();
        let ids: BTreeSet<&ElementId> = result.nodes.iter().map(|n| &n.id).collect();
        for edge in &result.edges {
            assert!(ids.contains(&edge.id.source) && ids.contains(&edge.id.target));
            assert!(edge.in_graph.is_superset_of(&required));
        }
        for node in &result.nodes {
            assert!(node.in_graph.is_superset_of(&required));
        }
    }
}

#[test]
fn journalist_skeleton_is_the_whole_canonical_graph() {
    let (store, _) = reconciled_store();
    let result = skeleton(&store, &[SourceTag::Journalist]).unwrap();
    let snapshot = store.load_canonical().unwrap();
    assert_eq!(result.nodes.len(), snapshot.node_count());
    assert_eq!(result.edges.len(), snapshot.edge_count());
}

#[test]
fn roadmap_never_appears_in_query_results() {
    let (store, _) = reconciled_store();
    let result = skeleton(&store, &[]).unwrap();
    assert!(result.nodes.iter().all(|n| n.label != "ROADMAP_PLACE"));
    assert!(result.nodes.iter().all(|n| n.id != ElementId::from("crossing")));
}

#[test]
fn queries_work_on_a_reopened_file_store() {
    let fixture = Fixture::new();
    let db_dir = tempfile::tempdir().unwrap();
    let db_path = db_dir.path().join("vastgraph.db");

    {
        let store = SqliteStore::open(&db_path).unwrap();
        let reconciler = Reconciler::new(test_config());
        reconciler.run(reconciler.load_inputs(fixture.path()).unwrap(), &store).unwrap();
    }

    let store = SqliteStore::open(&db_path).unwrap();
    let unique = dataset_unique(&store, SourceTag::Trout).unwrap();
    assert_eq!(node_ids(&unique), ["office"]);
}

#[test]
fn results_serialize_as_json() {
    let (store, _) = reconciled_store();
    let result = skeleton(&store, &SourceTag::ALL).unwrap();
    let json = serde_json::to_value(&result).unwrap();

    assert_eq!(json["nodes"].as_array().unwrap().len(), 3);
    assert_eq!(json["edges"][0]["label"], "VISIT");
    assert_eq!(json["edges"][0]["id"], "trip_1-harbor-0");
    assert_eq!(json["nodes"][0]["id"], "Sean");
    assert_eq!(json["edges"][0]["in_graph"], serde_json::json!(["journalist", "FILAH", "TROUT"]));
}
