//! Table: schema-validated record store
//!
//! ## Design
//!
//! `Table` is a stateless facade over a [`KvBackend`]. It holds the backend
//! and the table definition behind `Arc`s and nothing else, so it is cheap to
//! clone and every clone sees the same data.
//!
//! ## Write path
//!
//! truncate timestamps → validate → encode → backend put → index
//! maintenance. Timestamps are cut to milliseconds first so the returned
//! record equals what a later read decodes. Each step is a
//! separate backend call; there is no atomicity across them and no locking
//! between concurrent writers. A failure part-way leaves whatever was already
//! written; [`Table::rebuild_indexes`] brings the indexes back in line.
//!
//! ## Key Layout
//!
//! - Record: `{table}:{id}`
//! - Index entry: `index:{table}:{field}:{value}`

use std::sync::Arc;

use recordkv_core::{key, Error, KvBackend, Record, Result, Value, ID_FIELD};
use tracing::{debug, info};

use crate::codec;
use crate::definition::TableDefinition;
use crate::index::IndexManager;
use crate::query::{self, Query, QueryPlan, QuerySpec};
use crate::validate::validate;

/// A named collection of records sharing one schema
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use recordkv_core::{record, FieldKind, Schema};
/// use recordkv_engine::{Table, TableDefinition};
/// use recordkv_storage::MemoryStore;
///
/// let def = TableDefinition::new(
///     "users",
///     Schema::new()
///         .field("id", FieldKind::Text)
///         .field("name", FieldKind::Text),
/// );
/// let users = Table::new(Arc::new(MemoryStore::new()), def).unwrap();
///
/// users.create(record! { "id" => "u1", "name" => "Ada" }).unwrap();
/// assert_eq!(users.count().unwrap(), 1);
/// assert!(users.find("u1").unwrap().is_some());
/// ```
#[derive(Clone)]
pub struct Table {
    backend: Arc<dyn KvBackend>,
    def: Arc<TableDefinition>,
}

impl std::fmt::Debug for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Table").field("def", &self.def).finish()
    }
}

impl Table {
    /// Open a table over `backend`
    ///
    /// # Errors
    ///
    /// `InvalidSchema` if the definition fails [`TableDefinition::check`].
    pub fn new(backend: Arc<dyn KvBackend>, def: TableDefinition) -> Result<Self> {
        def.check()?;
        info!(
            target: "recordkv::table",
            table = %def.name,
            fields = def.schema.len(),
            indexes = ?def.indexes,
            "Table defined"
        );
        Ok(Self {
            backend,
            def: Arc::new(def),
        })
    }

    /// Table name
    pub fn name(&self) -> &str {
        &self.def.name
    }

    /// Table definition
    pub fn definition(&self) -> &TableDefinition {
        &self.def
    }

    fn indexes(&self) -> IndexManager<'_> {
        IndexManager::new(self.backend.as_ref(), &self.def)
    }

    fn record_key(&self, id: &str) -> String {
        key::record_key(&self.def.name, id)
    }

    fn load(&self, id: &str) -> Result<Option<Record>> {
        match self.backend.get(&self.record_key(id))? {
            Some(bytes) => Ok(Some(codec::from_bytes(&bytes, &self.def.schema)?)),
            None => Ok(None),
        }
    }

    /// Insert a new record
    ///
    /// Returns the stored record, with timestamps truncated to milliseconds.
    ///
    /// # Errors
    ///
    /// - `MissingField` / `TypeMismatch` when the record breaks the schema
    /// - `InvalidKey` when the id cannot be used in a key
    /// - `AlreadyExists` when a record with the same id is stored; the stored
    ///   record is left untouched
    pub fn create(&self, mut record: Record) -> Result<Record> {
        truncate_timestamps(&mut record);
        validate(&record, &self.def.schema)?;
        let id = record_id(&record)?.to_string();
        key::validate_id(&id)?;

        let record_key = self.record_key(&id);
        if self.backend.get(&record_key)?.is_some() {
            return Err(Error::AlreadyExists {
                table: self.def.name.clone(),
                id,
            });
        }

        self.backend.put(&record_key, codec::to_bytes(&record)?)?;
        self.indexes().add(&id, &record)?;
        debug!(target: "recordkv::table", table = %self.def.name, id = %id, "Record created");
        Ok(record)
    }

    /// Get a record by id
    pub fn find(&self, id: &str) -> Result<Option<Record>> {
        self.load(id)
    }

    /// Merge `partial` into the record stored under `id`
    ///
    /// Fields in `partial` replace stored fields of the same name; every other
    /// stored field is kept. The `id` field always stays `id`. The merged
    /// record is validated as a whole and only the indexed fields whose value
    /// changed are re-indexed.
    ///
    /// # Errors
    ///
    /// - `NotFound` when no record is stored under `id`
    /// - `MissingField` / `TypeMismatch` when the merged record breaks the
    ///   schema; nothing is written
    pub fn update(&self, id: &str, partial: Record) -> Result<Record> {
        let existing = self.load(id)?.ok_or_else(|| Error::NotFound {
            table: self.def.name.clone(),
            id: id.to_string(),
        })?;

        let mut merged = existing.clone();
        merged.extend(partial);
        truncate_timestamps(&mut merged);
        merged.insert(ID_FIELD.to_string(), Value::from(id));
        validate(&merged, &self.def.schema)?;

        self.backend
            .put(&self.record_key(id), codec::to_bytes(&merged)?)?;
        let reindexed = self.indexes().reindex(id, &existing, &merged)?;
        debug!(
            target: "recordkv::table",
            table = %self.def.name,
            id,
            reindexed = ?reindexed,
            "Record updated"
        );
        Ok(merged)
    }

    /// Delete the record stored under `id`
    ///
    /// Returns `false` when there was nothing to delete. Index entries are
    /// removed before the record itself.
    pub fn delete(&self, id: &str) -> Result<bool> {
        let Some(existing) = self.load(id)? else {
            return Ok(false);
        };
        self.indexes().remove(id, &existing)?;
        let deleted = self.backend.delete(&self.record_key(id))?;
        debug!(target: "recordkv::table", table = %self.def.name, id, "Record deleted");
        Ok(deleted)
    }

    /// Number of stored records
    pub fn count(&self) -> Result<usize> {
        Ok(self
            .backend
            .list_by_prefix(&key::record_prefix(&self.def.name))?
            .len())
    }

    /// Every stored record, in id order
    pub fn all(&self) -> Result<Vec<Record>> {
        self.backend
            .list_by_prefix(&key::record_prefix(&self.def.name))?
            .into_iter()
            .map(|(_, bytes)| codec::from_bytes(&bytes, &self.def.schema))
            .collect()
    }

    /// Start a query
    pub fn query(&self) -> Query<'_> {
        Query::new(self)
    }

    /// Run a prepared query
    pub fn execute(&self, spec: &QuerySpec) -> Result<Vec<Record>> {
        query::execute(self.backend.as_ref(), &self.def, spec)
    }

    /// How `spec` would acquire its candidates
    pub fn explain(&self, spec: &QuerySpec) -> QueryPlan {
        query::plan(self.backend.as_ref(), &self.def, spec)
    }

    /// Drop and regenerate every index entry of the table
    ///
    /// Returns the number of index entries written.
    pub fn rebuild_indexes(&self) -> Result<usize> {
        let records = self.all()?;
        let mut pairs = Vec::with_capacity(records.len());
        for record in &records {
            pairs.push((record_id(record)?, record));
        }
        let written = self.indexes().rebuild(pairs)?;
        info!(
            target: "recordkv::index",
            table = %self.def.name,
            records = records.len(),
            entries = written,
            "Indexes rebuilt"
        );
        Ok(written)
    }
}

fn record_id(record: &Record) -> Result<&str> {
    match record.get(ID_FIELD) {
        Some(Value::String(id)) => Ok(id.as_str()),
        Some(other) => Err(Error::TypeMismatch {
            field: ID_FIELD.to_string(),
            expected: recordkv_core::FieldKind::Text,
            actual: other.type_name().to_string(),
        }),
        None => Err(Error::MissingField {
            field: ID_FIELD.to_string(),
        }),
    }
}

fn truncate_timestamps(record: &mut Record) {
    record.values_mut().for_each(Value::truncate_timestamps);
}
