//! Shared fixtures for the scenario suite.

#![allow(dead_code)]

use std::sync::{Arc, Once};

use chrono::{DateTime, Utc};
use recordkv::{record, FieldKind, KvBackend, MemoryStore, Record, Schema, Table, TableDefinition};

static INIT_TRACING: Once = Once::new();

/// Install a debug-level fmt subscriber once per process.
///
/// Output goes through the test writer, so the harness captures it.
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::DEBUG)
            .try_init();
    });
}

pub fn ts(s: &str) -> DateTime<Utc> {
    recordkv::timestamp::parse(s).expect("valid timestamp literal")
}

/// The `events` table: `id`, `ws` (indexed) and `ts`.
pub fn events_definition() -> TableDefinition {
    TableDefinition::new(
        "events",
        Schema::new()
            .field("id", FieldKind::Text)
            .field("ws", FieldKind::Text)
            .field("ts", FieldKind::Timestamp),
    )
    .index("ws")
}

pub fn event(id: &str, ws: &str, at: &str) -> Record {
    record! { "id" => id, "ws" => ws, "ts" => ts(at) }
}

/// e1 = {ws:A, ts:2024-01-01}, e2 = {ws:A, ts:2024-01-03}, e3 = {ws:B, ts:2024-01-02}
pub fn seed(table: &Table) {
    table.create(event("e1", "A", "2024-01-01")).unwrap();
    table.create(event("e2", "A", "2024-01-03")).unwrap();
    table.create(event("e3", "B", "2024-01-02")).unwrap();
}

pub fn seeded_events() -> (Arc<MemoryStore>, Table) {
    init_tracing();
    let store = Arc::new(MemoryStore::new());
    let table = Table::new(store.clone(), events_definition()).unwrap();
    seed(&table);
    (store, table)
}

pub fn ids(records: &[Record]) -> Vec<String> {
    records
        .iter()
        .map(|r| r["id"].as_str().unwrap().to_string())
        .collect()
}

/// Every index key currently stored for `table`.
pub fn index_keys(backend: &dyn KvBackend, table: &str) -> Vec<String> {
    backend
        .list_by_prefix(&recordkv::key::index_prefix(table))
        .unwrap()
        .into_iter()
        .map(|(k, _)| k)
        .collect()
}
