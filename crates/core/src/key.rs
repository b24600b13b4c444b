//! Persisted key layout
//!
//! ## Contract
//!
//! The layout is FROZEN; existing data depends on it:
//! - Records: `{table}:{id}`
//! - Index entries: `index:{table}:{field}:{value}`
//!
//! Table names must not contain `:` and must not be `index`, otherwise a
//! table's record prefix could overlap another table's or the index space.

use crate::error::{Error, Result};

/// Leading segment of every index key
pub const INDEX_NAMESPACE: &str = "index";

/// Separator between key segments
pub const SEPARATOR: char = ':';

/// Key of a record
pub fn record_key(table: &str, id: &str) -> String {
    format!("{table}{SEPARATOR}{id}")
}

/// Prefix shared by every record of a table
pub fn record_prefix(table: &str) -> String {
    format!("{table}{SEPARATOR}")
}

/// Key of one index entry; `value` must already be rendered
pub fn index_key(table: &str, field: &str, value: &str) -> String {
    format!("{INDEX_NAMESPACE}{SEPARATOR}{table}{SEPARATOR}{field}{SEPARATOR}{value}")
}

/// Prefix shared by every index entry of a table
pub fn index_prefix(table: &str) -> String {
    format!("{INDEX_NAMESPACE}{SEPARATOR}{table}{SEPARATOR}")
}

/// Validate a table name
///
/// ```
/// use recordkv_core::key::validate_table_name;
///
/// assert!(validate_table_name("events").is_ok());
/// assert!(validate_table_name("").is_err());
/// assert!(validate_table_name("a:b").is_err());
/// assert!(validate_table_name("index").is_err());
/// ```
pub fn validate_table_name(table: &str) -> Result<()> {
    if table.is_empty() {
        return Err(Error::InvalidSchema("table name cannot be empty".into()));
    }
    if table.contains(SEPARATOR) {
        return Err(Error::InvalidSchema(format!(
            "table name '{table}' cannot contain '{SEPARATOR}'"
        )));
    }
    if table == INDEX_NAMESPACE {
        return Err(Error::InvalidSchema(format!(
            "table name '{INDEX_NAMESPACE}' is reserved"
        )));
    }
    Ok(())
}

/// Validate a record identifier
///
/// Identifiers may contain `:` (the record prefix is stripped, not split),
/// but must be non-empty and free of NUL bytes.
pub fn validate_id(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(Error::InvalidKey("record id cannot be empty".into()));
    }
    if id.contains('\0') {
        return Err(Error::InvalidKey("record id cannot contain NUL".into()));
    }
    Ok(())
}
