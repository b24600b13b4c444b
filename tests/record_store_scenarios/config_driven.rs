//! Tables opened from a TOML config.

use std::sync::Arc;

use recordkv::{record, KvBackend, MemoryStore, TableConfig, Value, CONFIG_FILE_NAME};
use tempfile::TempDir;

use crate::common::*;

#[test]
fn default_config_opens_working_tables() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(&path, TableConfig::default_toml()).unwrap();

    let config = TableConfig::from_file(&path).unwrap();
    let backend: Arc<dyn KvBackend> = Arc::new(MemoryStore::new());
    let tables = config.open_tables(backend).unwrap();
    let events = &tables[0];
    assert_eq!(events.name(), "events");

    seed(events);
    let found = events
        .query()
        .where_eq("ws", "A")
        .after(ts("2024-01-02"))
        .execute()
        .unwrap();
    assert_eq!(ids(&found), ["e2"]);
}

#[test]
fn tagged_scan_table_from_config() {
    let config = TableConfig::from_toml_str(
        r#"
[[tables]]
name = "metrics"
indexes = ["value"]
unindexed_queries = "scan"
index_keys = "tagged"

[tables.schema]
id = "text"
value = "number"
host = "text"
"#,
    )
    .unwrap();
    let backend: Arc<dyn KvBackend> = Arc::new(MemoryStore::new());
    let metrics = config.open_tables(backend.clone()).unwrap().remove(0);

    metrics
        .create(record! { "id" => "m1", "value" => 1, "host" => "a" })
        .unwrap();
    metrics
        .create(record! { "id" => "m2", "value" => 2, "host" => "b" })
        .unwrap();

    assert!(backend.get("index:metrics:value:n:1").unwrap().is_some());
    let by_host = metrics.query().where_eq("host", "b").execute().unwrap();
    assert_eq!(ids(&by_host), ["m2"]);
    let by_value = metrics.query().where_eq("value", Value::Int(1)).execute().unwrap();
    assert_eq!(ids(&by_value), ["m1"]);
}
