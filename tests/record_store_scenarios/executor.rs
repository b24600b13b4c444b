//! The command surface, driven the way an outer JSON layer would drive it.

use std::sync::Arc;

use recordkv::executor::Error;
use recordkv::{Command, Executor, MemoryStore, Output, StatusClass, TableConfig};
use serde_json::json;

use crate::common::*;

fn executor() -> Executor {
    init_tracing();
    let config = TableConfig::from_toml_str(TableConfig::default_toml()).unwrap();
    Executor::with_config(Arc::new(MemoryStore::new()), &config).unwrap()
}

fn run(executor: &Executor, request: serde_json::Value) -> Result<serde_json::Value, Error> {
    let cmd: Command = serde_json::from_value(request).unwrap();
    executor
        .execute(cmd)
        .map(|out| serde_json::to_value(out).unwrap())
}

#[test]
fn json_commands_round_trip_through_executor() {
    let ex = executor();
    for (id, ws, at) in [
        ("e1", "A", "2024-01-01"),
        ("e2", "A", "2024-01-03"),
        ("e3", "B", "2024-01-02"),
    ] {
        ex.execute(Command::Create {
            table: "events".into(),
            record: event(id, ws, at),
        })
        .unwrap();
    }

    let spec = serde_json::to_value(
        recordkv::QuerySpec {
            conditions: vec![("ws".into(), recordkv::Value::from("A"))],
            after: Some(ts("2024-01-02")),
            ..Default::default()
        },
    )
    .unwrap();
    let out = run(&ex, json!({ "Query": { "table": "events", "query": spec } })).unwrap();
    let records = out["Records"].as_array().unwrap();
    assert_eq!(records.len(), 1);

    let out = run(&ex, json!({ "Count": { "table": "events" } })).unwrap();
    assert_eq!(out, json!({ "Count": 3 }));

    let out = run(&ex, json!({ "Delete": { "table": "events", "id": "e3" } })).unwrap();
    assert_eq!(out, json!({ "Deleted": true }));

    let out = run(&ex, json!("ListTables")).unwrap();
    assert_eq!(out, json!({ "Tables": ["events"] }));
}

#[test]
fn errors_carry_status_class() {
    let ex = executor();

    let err = run(&ex, json!({ "Count": { "table": "nope" } })).unwrap_err();
    assert_eq!(err.status_class(), StatusClass::Client);

    let err = ex
        .execute(Command::Create {
            table: "events".into(),
            record: recordkv::record! { "id" => "e1" },
        })
        .unwrap_err();
    assert!(matches!(err, Error::MissingField { .. }));
    assert_eq!(err.status_class(), StatusClass::Client);
    assert_eq!(
        serde_json::to_value(&err).unwrap(),
        json!({ "MissingField": { "field": "ws" } })
    );
}

#[test]
fn outputs_match_facade_results() {
    let ex = executor();
    let table = ex.table("events").unwrap();
    seed(&table);
    let via_executor = ex
        .execute(Command::All {
            table: "events".into(),
        })
        .unwrap();
    assert_eq!(via_executor, Output::Records(table.all().unwrap()));
}
