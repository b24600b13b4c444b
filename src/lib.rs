//! recordkv - schema-validated record store over an ordered key-value backend
//!
//! recordkv stores records in named tables. Each table has a fixed schema,
//! optional single-field secondary indexes, and a chainable query pipeline
//! (equality filter, exclusive date range, sort, limit).
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use recordkv::{record, FieldKind, MemoryStore, Schema, SortDirection, Table, TableDefinition, Value};
//!
//! let def = TableDefinition::new(
//!     "events",
//!     Schema::new()
//!         .field("id", FieldKind::Text)
//!         .field("ws", FieldKind::Text)
//!         .field("ts", FieldKind::Timestamp),
//! )
//! .index("ws");
//! let events = Table::new(Arc::new(MemoryStore::new()), def).unwrap();
//!
//! events
//!     .create(record! { "id" => "e1", "ws" => "A", "ts" => Value::parse_timestamp("2024-01-01").unwrap() })
//!     .unwrap();
//!
//! let latest = events
//!     .query()
//!     .where_eq("ws", "A")
//!     .order_by("ts", SortDirection::Desc)
//!     .limit(10)
//!     .execute()
//!     .unwrap();
//! assert_eq!(latest.len(), 1);
//! ```
//!
//! # Architecture
//!
//! - `recordkv-core`: values, schemas, errors, the [`KvBackend`] trait
//! - `recordkv-storage`: [`MemoryStore`] and the durable [`LogStore`]
//! - `recordkv-engine`: validation, codec, indexes, queries, [`Table`]
//! - `recordkv-executor`: serializable [`Command`] / [`Output`] over an [`Executor`]

pub use recordkv_core::{
    key, record, timestamp, Error, FieldKind, KvBackend, Record, Result, Schema, Value, ID_FIELD,
};
pub use recordkv_engine::{
    IndexKeyEncoding, OrderBy, Query, QueryPlan, QuerySpec, SortDirection, Table, TableConfig,
    TableDefinition, TableOptions, UnindexedQueries, CONFIG_FILE_NAME,
};
pub use recordkv_executor::{Command, Executor, Output, StatusClass};
pub use recordkv_storage::{Durability, LogStore, MemoryStore};

/// Executor-level error and result types
pub mod executor {
    pub use recordkv_executor::{Error, Result};
}
