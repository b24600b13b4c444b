//! The Executor - single entry point to the record engine.
//!
//! The Executor routes commands to the table they name and converts results
//! to outputs. It owns the table registry; records live in the backend.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use recordkv_core::KvBackend;
use recordkv_engine::{Table, TableConfig, TableDefinition};
use tracing::debug;

use crate::{Command, Error, Output, Result};

/// The command executor
///
/// # Thread Safety
///
/// Executor is `Send + Sync` and can be shared across threads. The registry
/// is a concurrent map; record operations inherit the backend's per-key
/// atomicity and nothing more.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use recordkv_core::{record, FieldKind, Schema};
/// use recordkv_engine::TableDefinition;
/// use recordkv_executor::{Command, Executor, Output};
/// use recordkv_storage::MemoryStore;
///
/// let executor = Executor::new(Arc::new(MemoryStore::new()));
/// executor
///     .define_table(TableDefinition::new(
///         "users",
///         Schema::new().field("id", FieldKind::Text),
///     ))
///     .unwrap();
///
/// executor
///     .execute(Command::Create {
///         table: "users".into(),
///         record: record! { "id" => "u1" },
///     })
///     .unwrap();
/// let out = executor.execute(Command::Count { table: "users".into() }).unwrap();
/// assert_eq!(out, Output::Count(1));
/// ```
pub struct Executor {
    backend: Arc<dyn KvBackend>,
    tables: DashMap<String, Table>,
}

impl Executor {
    /// Create an executor with no tables over `backend`.
    pub fn new(backend: Arc<dyn KvBackend>) -> Self {
        Self {
            backend,
            tables: DashMap::new(),
        }
    }

    /// Create an executor with every table of `config` registered.
    pub fn with_config(backend: Arc<dyn KvBackend>, config: &TableConfig) -> Result<Self> {
        let executor = Self::new(backend);
        for def in &config.tables {
            executor.define_table(def.clone())?;
        }
        Ok(executor)
    }

    /// Register a table.
    ///
    /// Fails with `TableExists` when the name is taken and with the
    /// definition's own error when it does not check out.
    pub fn define_table(&self, def: TableDefinition) -> Result<()> {
        match self.tables.entry(def.name.clone()) {
            Entry::Occupied(_) => Err(Error::TableExists { table: def.name }),
            Entry::Vacant(slot) => {
                slot.insert(Table::new(Arc::clone(&self.backend), def)?);
                Ok(())
            }
        }
    }

    /// Handle to a registered table.
    pub fn table(&self, name: &str) -> Result<Table> {
        self.tables
            .get(name)
            .map(|t| t.value().clone())
            .ok_or_else(|| Error::TableNotFound {
                table: name.to_string(),
            })
    }

    /// Registered table names, sorted.
    pub fn table_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tables.iter().map(|t| t.key().clone()).collect();
        names.sort();
        names
    }

    /// Execute a single command.
    pub fn execute(&self, cmd: Command) -> Result<Output> {
        debug!(target: "recordkv::executor", command = cmd.name(), table = ?cmd.table(), "Executing");
        match cmd {
            Command::DefineTable { definition } => {
                self.define_table(definition)?;
                Ok(Output::Unit)
            }
            Command::ListTables => Ok(Output::Tables(self.table_names())),
            Command::RebuildIndexes { table } => {
                let written = self.table(&table)?.rebuild_indexes()?;
                Ok(Output::Count(written as u64))
            }
            Command::Create { table, record } => {
                Ok(Output::Record(self.table(&table)?.create(record)?))
            }
            Command::Find { table, id } => Ok(Output::MaybeRecord(self.table(&table)?.find(&id)?)),
            Command::Update { table, id, partial } => {
                Ok(Output::Record(self.table(&table)?.update(&id, partial)?))
            }
            Command::Delete { table, id } => Ok(Output::Deleted(self.table(&table)?.delete(&id)?)),
            Command::Count { table } => Ok(Output::Count(self.table(&table)?.count()? as u64)),
            Command::All { table } => Ok(Output::Records(self.table(&table)?.all()?)),
            Command::Query { table, query } => {
                Ok(Output::Records(self.table(&table)?.execute(&query)?))
            }
        }
    }

    /// Execute commands in order, collecting each result.
    ///
    /// A failing command does not stop the ones after it.
    pub fn execute_many(&self, cmds: Vec<Command>) -> Vec<Result<Output>> {
        cmds.into_iter().map(|cmd| self.execute(cmd)).collect()
    }
}
