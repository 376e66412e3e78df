use serde_json::json;

use testdb_core::traits::IndexStore;
use testdb_core::types::{Record, RecordId};
use testdb_store::MemoryStore;

fn record(value: serde_json::Value) -> Record {
    Record::from_value(value).expect("record object")
}

#[test]
fn upsert_then_get_all_returns_fields_unchanged() {
    let mut store = MemoryStore::new();
    let r = record(json!({"id": 123, "title": "My Awesome Title", "tags": ["a", "b"], "score": 1.5}));
    store.upsert(std::slice::from_ref(&r)).expect("upsert");

    let all = store.get_all().expect("get_all");
    assert_eq!(all.get(&RecordId::from("123")), Some(&r));
}

#[test]
fn reindexing_an_id_replaces_the_entry() {
    let mut store = MemoryStore::new();
    store.upsert(&[record(json!({"id": 1, "title": "old"}))]).expect("upsert");
    store.upsert(&[record(json!({"id": 1, "title": "new"}))]).expect("upsert");

    let all = store.get_all().expect("get_all");
    assert_eq!(all.len(), 1);
    assert_eq!(all.get(&RecordId::from("1")).and_then(|r| r.get("title")), Some(&json!("new")));
}

#[test]
fn records_without_id_are_skipped() {
    let mut store = MemoryStore::new();
    store.upsert(&[record(json!({"title": "orphan"})), record(json!({"id": 2}))]).expect("upsert");
    assert_eq!(store.table().len(), 1);
}

#[test]
fn delete_removes_by_id_and_ignores_absent_ids() {
    let mut store = MemoryStore::new();
    store
        .upsert(&[record(json!({"id": 1})), record(json!({"id": 2})), record(json!({"id": 3}))])
        .expect("upsert");

    store.delete(&[record(json!({"id": 2})), record(json!({"id": 99})), record(json!({}))]).expect("delete");

    let ids: Vec<String> = store.table().iter().map(|(id, _)| id.to_string()).collect();
    assert_eq!(ids, vec!["1", "3"]);
}

#[test]
fn instances_do_not_share_state() {
    let mut a = MemoryStore::new();
    let b = MemoryStore::new();
    a.upsert(&[record(json!({"id": 1}))]).expect("upsert");
    assert!(b.get_all().expect("get_all").is_empty());
}
