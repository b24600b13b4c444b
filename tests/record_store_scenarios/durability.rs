//! Tables over the durable log store survive reopening.

use std::sync::Arc;

use recordkv::{record, Durability, LogStore, SortDirection, Table};
use tempfile::TempDir;

use crate::common::*;

#[test]
fn records_and_indexes_survive_reopen() {
    init_tracing();
    let dir = TempDir::new().unwrap();

    {
        let store = Arc::new(LogStore::open_with(dir.path(), Durability::Always).unwrap());
        let events = Table::new(store, events_definition()).unwrap();
        seed(&events);
        events.update("e3", record! { "ws" => "A" }).unwrap();
        events.delete("e1").unwrap();
    }

    let store = Arc::new(LogStore::open(dir.path()).unwrap());
    let events = Table::new(store, events_definition()).unwrap();
    assert_eq!(events.count().unwrap(), 2);
    let found = events
        .query()
        .where_eq("ws", "A")
        .order_by("ts", SortDirection::Desc)
        .execute()
        .unwrap();
    assert_eq!(ids(&found), ["e2", "e3"]);
    assert!(events.query().where_eq("ws", "B").execute().unwrap().is_empty());
}

#[test]
fn compaction_keeps_live_state() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let store = Arc::new(LogStore::open(dir.path()).unwrap());
    let events = Table::new(store.clone(), events_definition()).unwrap();
    seed(&events);
    for i in 0..10 {
        let ws = if i % 2 == 0 { "B" } else { "A" };
        events.update("e1", record! { "ws" => ws }).unwrap();
    }
    let frames_before = store.frame_count();
    store.compact().unwrap();
    assert!(store.frame_count() < frames_before);
    drop(events);
    drop(store);

    let events = Table::new(
        Arc::new(LogStore::open(dir.path()).unwrap()),
        events_definition(),
    )
    .unwrap();
    assert_eq!(ids(&events.query().where_eq("ws", "A").execute().unwrap()), ["e1", "e2"]);
}
