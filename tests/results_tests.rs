use nodescout::constants::KEY_STORED_RESULTS;
use nodescout::db::kv::{JsonFileStore, KeyValueStore, MemoryStore};
use nodescout::model::TelemetryRecord;
use nodescout::results::ResultStore;
use nodescout::ScoutError;
use std::sync::Arc;
use test_utils::{create_test_record, FailingStore};


fn memory_store() -> ResultStore {
    ResultStore::new(Arc::new(MemoryStore::new()))
}

fn temp_store_path(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("nodescout-{}-{}.json", name, std::process::id()))
}

#[test]
fn test_merge_is_idempotent() {
    let record = TelemetryRecord {
        temperature_c: Some(52.5),
        best_difficulty: Some("3.1M".to_string()),
        ..create_test_record("192.168.1.30", Some(480.0), Some(13.0))
    };

    let mut once = memory_store();
    once.merge(record.clone()).unwrap();

    let mut twice = memory_store();
    twice.merge(record.clone()).unwrap();
    twice.merge(record).unwrap();

    assert_eq!(once.records(), twice.records());
}

#[test]
fn test_merge_overlays_only_present_fields() {
    let mut results = memory_store();
    results
        .merge(create_test_record("A", Some(100.0), None))
        .unwrap();
    results
        .merge(TelemetryRecord {
            temperature_c: Some(40.0),
            ..TelemetryRecord::new("A")
        })
        .unwrap();

    let merged = results.get("A").unwrap();
    assert_eq!(merged.hash_rate_ghs, Some(100.0));
    assert_eq!(merged.temperature_c, Some(40.0));
    assert_eq!(results.len(), 1);
}

#[test]
fn test_streamed_merges_match_batch_replace() {
    let batch = vec![
        create_test_record("10.0.0.3", Some(300.0), Some(30.0)),
        create_test_record("10.0.0.1", Some(100.0), None),
        create_test_record("10.0.0.2", None, Some(20.0)),
    ];

    let mut streamed = memory_store();
    for record in batch.iter().rev() {
        streamed.merge(record.clone()).unwrap();
    }

    let mut batched = memory_store();
    batched.replace(batch).unwrap();

    let mut a = streamed.records();
    let mut b = batched.records();
    a.sort_by(|x, y| x.address.cmp(&y.address));
    b.sort_by(|x, y| x.address.cmp(&y.address));
    assert_eq!(a, b);
    assert_eq!(streamed.aggregate(), batched.aggregate());
}

#[test]
fn test_every_mutation_is_written_through() {
    let storage = Arc::new(MemoryStore::new());
    let mut results = ResultStore::new(storage.clone());

    results
        .merge(create_test_record("10.0.0.1", Some(1.0), None))
        .unwrap();
    let stored: Vec<TelemetryRecord> =
        serde_json::from_value(storage.get(KEY_STORED_RESULTS).unwrap().unwrap()).unwrap();
    assert_eq!(stored.len(), 1);

    results
        .replace(vec![create_test_record("10.0.0.2", Some(2.0), None)])
        .unwrap();
    let stored: Vec<TelemetryRecord> =
        serde_json::from_value(storage.get(KEY_STORED_RESULTS).unwrap().unwrap()).unwrap();
    assert_eq!(stored, vec![create_test_record("10.0.0.2", Some(2.0), None)]);
}

#[test]
fn test_persistence_failure_keeps_memory_state() {
    let mut results = ResultStore::new(Arc::new(FailingStore));
    let outcome = results.merge(create_test_record("10.0.0.1", Some(1.0), None));

    assert!(matches!(outcome, Err(ScoutError::Persistence(_))));
    assert_eq!(results.len(), 1);
    assert_eq!(results.aggregate().device_count, 1);
}

#[test]
fn test_results_survive_reload_from_file() {
    let path = temp_store_path("reload");
    let _ = std::fs::remove_file(&path);

    {
        let mut results = ResultStore::new(Arc::new(JsonFileStore::new(&path)));
        results
            .merge(create_test_record("10.0.0.4", Some(400.0), Some(14.0)))
            .unwrap();
        results
            .merge(create_test_record("10.0.0.5", Some(500.0), None))
            .unwrap();
    }

    let reloaded = ResultStore::load(Arc::new(JsonFileStore::new(&path))).unwrap();
    assert_eq!(
        reloaded.addresses(),
        vec!["10.0.0.4".to_string(), "10.0.0.5".to_string()]
    );
    assert_eq!(reloaded.aggregate().total_hash_rate_ghs, 900.0);

    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_persisted_layout_uses_node_field_names() {
    let storage = Arc::new(MemoryStore::new());
    let mut results = ResultStore::new(storage.clone());
    results
        .merge(TelemetryRecord {
            best_difficulty: Some("12.3k".to_string()),
            ..create_test_record("10.0.0.8", Some(42.0), None)
        })
        .unwrap();

    let value = storage.get(KEY_STORED_RESULTS).unwrap().unwrap();
    assert_eq!(
        value,
        serde_json::json!([{ "address": "10.0.0.8", "hashRate": 42.0, "bestDiff": "12.3k" }])
    );
}

#[test]
fn test_load_skips_address_only_records() {
    let storage = Arc::new(MemoryStore::new());
    storage
        .set(
            KEY_STORED_RESULTS,
            serde_json::json!([
                { "address": "10.0.0.1" },
                { "address": "10.0.0.2", "hashRate": 5.0 }
            ]),
        )
        .unwrap();

    let results = ResultStore::load(storage).unwrap();
    assert_eq!(results.addresses(), vec!["10.0.0.2".to_string()]);
}

#[test]
fn test_file_store_reports_its_path() {
    let path = temp_store_path("path");
    let store = JsonFileStore::new(&path);
    assert_eq!(store.path(), path.as_path());
}

#[tokio::test]
async fn test_staged_merge_writes_only_on_commit() {
    let storage = Arc::new(MemoryStore::new());
    let mut results = ResultStore::new(storage.clone());

    let write = results
        .stage_merge(create_test_record("10.0.0.6", Some(60.0), None))
        .unwrap()
        .unwrap();
    assert_eq!(results.len(), 1);
    assert!(storage.get(KEY_STORED_RESULTS).unwrap().is_none());

    write.commit_blocking().await.unwrap();
    let stored: Vec<TelemetryRecord> =
        serde_json::from_value(storage.get(KEY_STORED_RESULTS).unwrap().unwrap()).unwrap();
    assert_eq!(stored, results.records());

    assert!(results
        .stage_merge(TelemetryRecord::new("10.0.0.7"))
        .unwrap()
        .is_none());
}
