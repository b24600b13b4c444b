//! Command enum defining every recordkv operation.
//!
//! Commands are:
//! - **Self-contained**: all parameters needed for execution are in the variant
//! - **Serializable**: outer layers (HTTP, CLI) marshal them as JSON
//! - **Pure data**: no closures or executable code

use recordkv_core::Record;
use recordkv_engine::{QuerySpec, TableDefinition};
use serde::{Deserialize, Serialize};

/// A command is a self-contained, serializable operation.
///
/// | Category | Commands |
/// |----------|----------|
/// | Tables | `DefineTable`, `ListTables`, `RebuildIndexes` |
/// | Records | `Create`, `Find`, `Update`, `Delete`, `Count`, `All` |
/// | Queries | `Query` |
///
/// # Example
///
/// ```
/// use recordkv_core::record;
/// use recordkv_executor::Command;
///
/// let cmd = Command::Create {
///     table: "events".into(),
///     record: record! { "id" => "e1", "ws" => "A" },
/// };
/// let json = serde_json::to_string(&cmd).unwrap();
/// assert_eq!(serde_json::from_str::<Command>(&json).unwrap(), cmd);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub enum Command {
    // ==================== Tables ====================
    /// Register a table.
    /// Returns: `Output::Unit`
    DefineTable {
        /// Name, schema, indexes and options
        definition: TableDefinition,
    },

    /// List registered table names, sorted.
    /// Returns: `Output::Tables`
    ListTables,

    /// Drop and regenerate a table's index entries.
    /// Returns: `Output::Count` (entries written)
    RebuildIndexes {
        /// Target table
        table: String,
    },

    // ==================== Records ====================
    /// Insert a new record.
    /// Returns: `Output::Record`
    Create {
        /// Target table
        table: String,
        /// Full record, including `id`
        record: Record,
    },

    /// Get a record by id.
    /// Returns: `Output::MaybeRecord`
    Find {
        /// Target table
        table: String,
        /// Record id
        id: String,
    },

    /// Merge fields into a stored record.
    /// Returns: `Output::Record`
    Update {
        /// Target table
        table: String,
        /// Record id
        id: String,
        /// Fields to replace
        partial: Record,
    },

    /// Delete a record.
    /// Returns: `Output::Deleted`
    Delete {
        /// Target table
        table: String,
        /// Record id
        id: String,
    },

    /// Count records.
    /// Returns: `Output::Count`
    Count {
        /// Target table
        table: String,
    },

    /// Every record, in id order.
    /// Returns: `Output::Records`
    All {
        /// Target table
        table: String,
    },

    // ==================== Queries ====================
    /// Run a query.
    /// Returns: `Output::Records`
    Query {
        /// Target table
        table: String,
        /// Conditions, bounds, ordering and limit
        #[serde(default)]
        query: QuerySpec,
    },
}

impl Command {
    /// Table the command addresses, if it addresses one registered table
    pub fn table(&self) -> Option<&str> {
        match self {
            Command::DefineTable { .. } | Command::ListTables => None,
            Command::RebuildIndexes { table }
            | Command::Create { table, .. }
            | Command::Find { table, .. }
            | Command::Update { table, .. }
            | Command::Delete { table, .. }
            | Command::Count { table }
            | Command::All { table }
            | Command::Query { table, .. } => Some(table),
        }
    }

    /// Variant name, for logging
    pub fn name(&self) -> &'static str {
        match self {
            Command::DefineTable { .. } => "DefineTable",
            Command::ListTables => "ListTables",
            Command::RebuildIndexes { .. } => "RebuildIndexes",
            Command::Create { .. } => "Create",
            Command::Find { .. } => "Find",
            Command::Update { .. } => "Update",
            Command::Delete { .. } => "Delete",
            Command::Count { .. } => "Count",
            Command::All { .. } => "All",
            Command::Query { .. } => "Query",
        }
    }
}
