//! Test modules for the executor crate.


use std::sync::Arc;

use recordkv_core::{FieldKind, Schema};
use recordkv_engine::TableDefinition;
use recordkv_storage::MemoryStore;

use crate::Executor;

/// Executor over a fresh in-memory store with an `events` table indexed on `ws`.
pub(crate) fn create_test_executor() -> Executor {
    let executor = Executor::new(Arc::new(MemoryStore::new()));
    executor.define_table(events_definition()).unwrap();
    executor
}

pub(crate) fn events_definition() -> TableDefinition {
    TableDefinition::new(
        "events",
        Schema::new()
            .field("id", FieldKind::Text)
            .field("ws", FieldKind::Text)
            .field("ts", FieldKind::Timestamp),
    )
    .index("ws")
}
