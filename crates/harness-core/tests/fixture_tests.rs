//! Shipped fixtures and instance selection

use check_harness_core::config::default_testdata_dir;
use check_harness_core::couch::{self, CouchVersion};
use check_harness_core::fixtures::{ACTIVE_TASKS, FixtureStore};

fn shipped_store() -> FixtureStore {
    FixtureStore::new(couch::fixtures_dir(&default_testdata_dir()))
}

#[test]
fn test_active_tasks_fixture_shape() {
    let tasks = shipped_store().active_tasks().unwrap();
    let tasks = tasks.as_array().unwrap();

    let kinds: Vec<&str> = tasks
        .iter()
        .map(|t| t["type"].as_str().unwrap())
        .collect();
    assert!(kinds.contains(&"indexer"));
    assert!(kinds.contains(&"replication"));
    assert!(kinds.contains(&"database_compaction"));
    assert!(kinds.contains(&"view_compaction"));
}

#[test]
fn test_loads_are_independent_copies() {
    let store = shipped_store();
    let mut first = store.load_json(ACTIVE_TASKS).unwrap();
    let second = store.load_json(ACTIVE_TASKS).unwrap();
    assert_eq!(first, second);

    first.as_array_mut().unwrap().clear();
    assert_ne!(first, second);
    assert_eq!(store.load_json(ACTIVE_TASKS).unwrap(), second);
}

#[test]
fn test_list_shipped_fixtures() {
    assert_eq!(shipped_store().list().unwrap(), vec![ACTIVE_TASKS.to_string()]);
}

#[test]
fn test_compose_files_shipped_for_every_version() {
    for version in CouchVersion::ALL {
        let file = couch::compose_file(version, &default_testdata_dir());
        let contents = std::fs::read_to_string(&file).unwrap();
        assert!(contents.contains("${COUCH_PORT}"), "{}", file.display());
    }
}

#[test]
fn test_v2_compose_starts_the_polled_cluster_nodes() {
    let file = couch::compose_file(CouchVersion::V2, &default_testdata_dir());
    let contents = std::fs::read_to_string(&file).unwrap();

    // dev/run numbers its nodes from 1 on loopback
    let count = format!("\"-n\", \"{}\"", couch::CLUSTER_NODES.len());
    assert!(contents.contains(&count), "{}", file.display());
    for (i, node) in couch::CLUSTER_NODES.iter().enumerate() {
        assert_eq!(*node, format!("node{}@127.0.0.1", i + 1));
    }
    assert!(contents.contains(&format!("--admin={}:{}", couch::USER, couch::PASSWORD)));

    let stats = couch::stats_urls(CouchVersion::V2, "http://localhost:5984");
    assert_eq!(stats.len(), couch::CLUSTER_NODES.len());
}

#[test]
fn test_selection_for_every_supported_version() {
    let base = "http://localhost:5984";
    for (raw, expect_auth) in [("1", false), ("1.6.1", false), ("2", true), ("2.3.1", true)] {
        let instance = couch::select_instance(raw, base).unwrap();
        assert_eq!(instance.server, base);
        assert_eq!(instance.credentials().is_some(), expect_auth, "{raw}");
    }
}

#[test]
fn test_instance_configs_are_fresh_values() {
    let mut first = couch::instance_config(CouchVersion::V2, "http://localhost:5984");
    first.user = None;
    let second = couch::instance_config(CouchVersion::V2, "http://localhost:5984");
    assert_eq!(second.user.as_deref(), Some(couch::USER));
}
