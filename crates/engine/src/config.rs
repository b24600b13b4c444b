//! Table configuration via TOML
//!
//! A config file lists table definitions as an array of tables. Each entry
//! carries the table name, its indexed fields, the per-table options and the
//! schema. Field order inside `[tables.schema]` is the schema's declaration
//! order.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use recordkv_core::{Error, KvBackend, Result, Schema};
use serde::{Deserialize, Serialize};

use crate::definition::{TableDefinition, TableOptions};
use crate::table::Table;

/// Conventional config file name
pub const CONFIG_FILE_NAME: &str = "recordkv.toml";

/// Set of table definitions loaded from TOML
///
/// # Example
///
/// ```toml
/// [[tables]]
/// name = "events"
/// indexes = ["ws"]
/// unindexed_queries = "empty"   # or "scan"
/// index_keys = "plain"          # or "tagged"
///
/// [tables.schema]
/// id = "text"
/// ws = "text"
/// ts = "timestamp"
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TableConfig {
    /// Table definitions, in file order
    pub tables: Vec<TableDefinition>,
}

// Kind names are resolved after parsing so that an unknown kind surfaces as
// `UnknownFieldKind` rather than as a TOML syntax error.
#[derive(Deserialize)]
struct RawConfig {
    #[serde(default)]
    tables: Vec<RawTable>,
}

#[derive(Deserialize)]
struct RawTable {
    name: String,
    #[serde(default)]
    indexes: Vec<String>,
    #[serde(flatten)]
    options: TableOptions,
    #[serde(default)]
    schema: toml::Table,
}

impl RawTable {
    fn resolve(self) -> Result<TableDefinition> {
        let mut pairs = Vec::with_capacity(self.schema.len());
        for (field, kind) in self.schema {
            let kind = match kind {
                toml::Value::String(kind) => kind,
                other => {
                    return Err(Error::InvalidSchema(format!(
                        "table '{}': kind of field '{field}' must be a string, found {}",
                        self.name,
                        other.type_str()
                    )))
                }
            };
            pairs.push((field, kind));
        }

        let mut def = TableDefinition::new(self.name, Schema::from_kind_names(pairs)?)
            .with_options(self.options);
        for field in self.indexes {
            def = def.index(field);
        }
        Ok(def)
    }
}

impl TableConfig {
    /// Returns a commented starter config
    pub fn default_toml() -> &'static str {
        r#"# recordkv table configuration
#
# One [[tables]] entry per table. The schema must declare `id` as text.
# Field kinds: text, number, boolean, timestamp, object, list
#
# unindexed_queries: what a query does when its first condition is on an
# unindexed field
#   "empty" = return no records (default)
#   "scan"  = scan every record of the table
#
# index_keys: how values are rendered into index keys
#   "plain"  = bare value, so 1 and "1" share an entry (default)
#   "tagged" = kind-prefixed value

[[tables]]
name = "events"
indexes = ["ws"]
unindexed_queries = "empty"
index_keys = "plain"

[tables.schema]
id = "text"
ws = "text"
ts = "timestamp"
"#
    }

    /// Parse a config from TOML text
    ///
    /// Every definition is checked.
    ///
    /// # Errors
    ///
    /// - `InvalidSchema` on malformed TOML, a bad definition, or a table
    ///   name used twice
    /// - `UnknownFieldKind` when a schema names an unsupported kind
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(content)
            .map_err(|e| Error::InvalidSchema(format!("failed to parse table config: {e}")))?;

        let mut seen = HashSet::new();
        let mut tables = Vec::with_capacity(raw.tables.len());
        for raw_table in raw.tables {
            let def = raw_table.resolve()?;
            def.check()?;
            if !seen.insert(def.name.clone()) {
                return Err(Error::InvalidSchema(format!(
                    "table '{}' is defined more than once",
                    def.name
                )));
            }
            tables.push(def);
        }
        Ok(Self { tables })
    }

    /// Read and parse a config file
    ///
    /// # Errors
    ///
    /// `IoError` if the file cannot be read, otherwise as
    /// [`TableConfig::from_toml_str`].
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::IoError(std::io::Error::new(
                e.kind(),
                format!("failed to read config file '{}': {e}", path.display()),
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// Render as TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| Error::SerializationError(format!("failed to serialize config: {e}")))
    }

    /// Serialize this config to TOML and write it to `path`
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = self.to_toml_string()?;
        std::fs::write(path, content).map_err(|e| {
            Error::IoError(std::io::Error::new(
                e.kind(),
                format!("failed to write config file '{}': {e}", path.display()),
            ))
        })
    }

    /// Definition of the table called `name`
    pub fn table(&self, name: &str) -> Option<&TableDefinition> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Open every configured table over one backend
    pub fn open_tables(&self, backend: Arc<dyn KvBackend>) -> Result<Vec<Table>> {
        self.tables
            .iter()
            .map(|def| Table::new(Arc::clone(&backend), def.clone()))
            .collect()
    }
}
