//! Table definitions
//!
//! A [`TableDefinition`] names a table, fixes its schema, declares which
//! fields are indexed, and carries the per-table [`TableOptions`]. It is
//! checked once, when a [`crate::Table`] is built from it.

use recordkv_core::{key, Error, FieldKind, Result, Schema, ID_FIELD};
use serde::{Deserialize, Serialize};

use crate::index::IndexKeyEncoding;

/// What a query does when its first condition is on an unindexed field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnindexedQueries {
    /// Start from an empty candidate set, so the query returns nothing.
    #[default]
    Empty,
    /// Fall back to scanning every record of the table.
    Scan,
}

/// Per-table behavior switches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TableOptions {
    /// Candidate strategy for queries led by an unindexed field
    #[serde(default)]
    pub unindexed_queries: UnindexedQueries,
    /// How values are rendered into index keys
    #[serde(default)]
    pub index_keys: IndexKeyEncoding,
}

/// Name, schema and index declaration of one table
///
/// # Example
///
/// ```
/// use recordkv_core::{FieldKind, Schema};
/// use recordkv_engine::TableDefinition;
///
/// let def = TableDefinition::new(
///     "events",
///     Schema::new()
///         .field("id", FieldKind::Text)
///         .field("ws", FieldKind::Text)
///         .field("ts", FieldKind::Timestamp),
/// )
/// .index("ws");
///
/// def.check().unwrap();
/// assert!(def.is_indexed("ws"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDefinition {
    /// Table name; the key prefix of every record
    pub name: String,
    /// Indexed field names
    #[serde(default)]
    pub indexes: Vec<String>,
    /// Behavior switches
    #[serde(flatten)]
    pub options: TableOptions,
    /// Declared fields
    pub schema: Schema,
}

impl TableDefinition {
    /// Definition with no indexes and default options
    pub fn new(name: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            indexes: Vec::new(),
            options: TableOptions::default(),
            schema,
        }
    }

    /// Declare an indexed field
    pub fn index(mut self, field: impl Into<String>) -> Self {
        let field = field.into();
        if !self.indexes.contains(&field) {
            self.indexes.push(field);
        }
        self
    }

    /// Replace the options
    pub fn with_options(mut self, options: TableOptions) -> Self {
        self.options = options;
        self
    }

    /// Whether `field` is indexed
    pub fn is_indexed(&self, field: &str) -> bool {
        self.indexes.iter().any(|f| f == field)
    }

    /// Check the definition is usable
    ///
    /// # Errors
    ///
    /// `InvalidSchema` when the table name is unusable as a key prefix, the
    /// schema does not declare `id` as text, or an index names a field the
    /// schema does not declare or whose name contains the key separator.
    pub fn check(&self) -> Result<()> {
        key::validate_table_name(&self.name)?;

        match self.schema.kind_of(ID_FIELD) {
            Some(FieldKind::Text) => {}
            Some(other) => {
                return Err(Error::InvalidSchema(format!(
                    "table '{}': field '{ID_FIELD}' must be text, found {other}",
                    self.name
                )))
            }
            None => {
                return Err(Error::InvalidSchema(format!(
                    "table '{}': schema must declare '{ID_FIELD}'",
                    self.name
                )))
            }
        }

        for field in &self.indexes {
            if field.contains(key::SEPARATOR) {
                return Err(Error::InvalidSchema(format!(
                    "table '{}': indexed field '{field}' cannot contain '{}'",
                    self.name,
                    key::SEPARATOR
                )));
            }
            if !self.schema.contains(field) {
                return Err(Error::InvalidSchema(format!(
                    "table '{}': indexed field '{field}' is not in the schema",
                    self.name
                )));
            }
        }
        Ok(())
    }
}
