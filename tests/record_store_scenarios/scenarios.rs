//! Behavioral scenarios for the record store facade.

use recordkv::{record, Error, KvBackend, SortDirection, Table, TableOptions, UnindexedQueries, Value};

use crate::common::*;

#[test]
fn where_ws_order_by_ts_desc() {
    let (_, events) = seeded_events();
    let found = events
        .query()
        .where_eq("ws", "A")
        .order_by("ts", SortDirection::Desc)
        .execute()
        .unwrap();
    assert_eq!(ids(&found), ["e2", "e1"]);
}

#[test]
fn where_ws_after_is_exclusive() {
    let (_, events) = seeded_events();
    let found = events
        .query()
        .where_eq("ws", "A")
        .after(ts("2024-01-02"))
        .execute()
        .unwrap();
    assert_eq!(ids(&found), ["e2"]);

    // A bound equal to a stored instant excludes that record.
    let found = events
        .query()
        .where_eq("ws", "A")
        .after(ts("2024-01-01"))
        .execute()
        .unwrap();
    assert_eq!(ids(&found), ["e2"]);
}

#[test]
fn where_ws_before_is_exclusive() {
    let (_, events) = seeded_events();
    let found = events
        .query()
        .where_eq("ws", "A")
        .before(ts("2024-01-03"))
        .execute()
        .unwrap();
    assert_eq!(ids(&found), ["e1"]);
}

#[test]
fn unindexed_only_query_returns_empty_by_default() {
    let (_, events) = seeded_events();
    let found = events
        .query()
        .where_eq("ts", ts("2024-01-02"))
        .execute()
        .unwrap();
    assert!(found.is_empty());
}

#[test]
fn unindexed_only_query_matches_when_scanning() {
    init_tracing();
    let store = std::sync::Arc::new(recordkv::MemoryStore::new());
    let def = events_definition().with_options(TableOptions {
        unindexed_queries: UnindexedQueries::Scan,
        ..Default::default()
    });
    let events = Table::new(store, def).unwrap();
    seed(&events);

    let found = events
        .query()
        .where_eq("ts", ts("2024-01-02"))
        .execute()
        .unwrap();
    assert_eq!(ids(&found), ["e3"]);
}

#[test]
fn create_then_find_returns_equal_record() {
    let (_, events) = seeded_events();
    let r = record! {
        "id" => "e9",
        "ws" => "C",
        "ts" => ts("2024-02-29T13:45:10.123Z"),
        "payload" => record! { "k" => vec![Value::Int(1), Value::Float(0.5), Value::Null] },
    };
    events.create(r.clone()).unwrap();
    assert_eq!(events.find("e9").unwrap(), Some(r));
}

#[test]
fn missing_and_mistyped_fields_are_named() {
    let (_, events) = seeded_events();

    let err = events
        .create(record! { "id" => "x", "ts" => ts("2024-01-01") })
        .unwrap_err();
    assert!(matches!(err, Error::MissingField { ref field } if field == "ws"));

    let err = events
        .create(record! { "id" => "x", "ws" => "A", "ts" => "2024-01-01" })
        .unwrap_err();
    assert_eq!(err.field(), Some("ts"));
    assert!(err.is_client_error());
}

#[test]
fn duplicate_create_fails_and_keeps_first() {
    let (store, events) = seeded_events();
    let before = index_keys(&*store, "events");

    let err = events.create(event("e1", "Z", "2030-01-01")).unwrap_err();
    assert!(matches!(err, Error::AlreadyExists { ref id, .. } if id == "e1"));
    assert_eq!(events.find("e1").unwrap(), Some(event("e1", "A", "2024-01-01")));
    assert_eq!(index_keys(&*store, "events"), before);
}

#[test]
fn update_merges_fields() {
    let (_, events) = seeded_events();
    let merged = events
        .update("e1", record! { "ts" => ts("2024-01-10"), "note" => "late" })
        .unwrap();
    let found = events.find("e1").unwrap().unwrap();
    assert_eq!(found, merged);
    assert_eq!(found["ws"], Value::from("A"));
    assert_eq!(found["ts"], Value::Timestamp(ts("2024-01-10")));
    assert_eq!(found["note"], Value::from("late"));
}

#[test]
fn update_moves_record_between_index_entries() {
    let (_, events) = seeded_events();
    events.update("e1", record! { "ws" => "B" }).unwrap();

    let a = events.query().where_eq("ws", "A").execute().unwrap();
    let b = events.query().where_eq("ws", "B").execute().unwrap();
    assert_eq!(ids(&a), ["e2"]);
    assert_eq!(ids(&b), ["e1", "e3"]);
}

#[test]
fn update_of_missing_record_is_not_found() {
    let (_, events) = seeded_events();
    assert!(matches!(
        events.update("ghost", record! { "ws" => "A" }),
        Err(Error::NotFound { .. })
    ));
}

#[test]
fn delete_leaves_no_index_footprint() {
    let (store, events) = seeded_events();
    assert!(events.delete("e3").unwrap());
    assert!(events.find("e3").unwrap().is_none());
    assert_eq!(index_keys(&*store, "events"), ["index:events:ws:A"]);

    assert!(events.delete("e1").unwrap());
    assert!(events.delete("e2").unwrap());
    assert!(index_keys(&*store, "events").is_empty());
    assert!(store.get("events:e1").unwrap().is_none());
    assert!(!events.delete("e1").unwrap());
}

#[test]
fn queries_are_idempotent() {
    let (_, events) = seeded_events();
    let run = || {
        events
            .query()
            .where_eq("ws", "A")
            .order_by("ts", SortDirection::Asc)
            .limit(5)
            .execute()
            .unwrap()
    };
    let first = run();
    for _ in 0..3 {
        assert_eq!(run(), first);
    }
}

#[test]
fn count_and_all() {
    let (_, events) = seeded_events();
    assert_eq!(events.count().unwrap(), 3);
    assert_eq!(ids(&events.all().unwrap()), ["e1", "e2", "e3"]);
}

#[test]
fn callers_receive_independent_copies() {
    let (_, events) = seeded_events();
    let mut copy = events.find("e1").unwrap().unwrap();
    copy.insert("ws".into(), Value::from("mutated"));
    assert_eq!(events.find("e1").unwrap().unwrap()["ws"], Value::from("A"));
}
