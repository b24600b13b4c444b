//! Error types for command execution.
//!
//! All errors from command execution are represented by the [`Error`] enum.
//! These errors are:
//! - **Structured**: each variant has typed fields for error details
//! - **Serializable**: can be converted to/from JSON

use serde::{Deserialize, Serialize};

/// Broad outcome class of an error
///
/// Outer layers map `Client` to a 4xx-class response and `Server` to 5xx.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusClass {
    /// Caused by the request
    Client,
    /// Caused by the backend or the environment
    Server,
}

/// Command execution errors.
///
/// # Categories
///
/// | Category | Variants |
/// |----------|----------|
/// | Registry | `TableNotFound`, `TableExists` |
/// | Validation | `MissingField`, `TypeMismatch`, `UnknownFieldKind`, `InvalidSchema`, `InvalidKey` |
/// | Records | `AlreadyExists`, `NotFound` |
/// | System | `Io`, `Serialization`, `Storage`, `Corruption` |
///
/// # Example
///
/// ```ignore
/// match executor.execute(cmd) {
///     Ok(output) => { /* handle success */ }
///     Err(Error::TableNotFound { table }) => {
///         println!("no table '{}'", table);
///     }
///     Err(e) if e.status_class() == StatusClass::Client => { /* 4xx */ }
///     Err(e) => { /* 5xx */ }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
pub enum Error {
    // ==================== Registry ====================
    /// No table is registered under this name
    #[error("table not found: {table}")]
    TableNotFound { table: String },

    /// A table is already registered under this name
    #[error("table already exists: {table}")]
    TableExists { table: String },

    // ==================== Validation ====================
    /// A schema-declared field is absent
    #[error("missing field: {field}")]
    MissingField { field: String },

    /// A field holds a value of the wrong kind
    #[error("type mismatch on field '{field}': expected {expected}, got {actual}")]
    TypeMismatch {
        field: String,
        expected: String,
        actual: String,
    },

    /// A schema names a kind that does not exist
    #[error("unknown field kind: {kind}")]
    UnknownFieldKind { kind: String },

    /// A table definition is malformed
    #[error("invalid schema: {reason}")]
    InvalidSchema { reason: String },

    /// A record id cannot be used as a key
    #[error("invalid key: {reason}")]
    InvalidKey { reason: String },

    // ==================== Records ====================
    /// `Create` collided with a stored id
    #[error("record already exists: {table}:{id}")]
    AlreadyExists { table: String, id: String },

    /// `Update` addressed a missing id
    #[error("record not found: {table}:{id}")]
    NotFound { table: String, id: String },

    // ==================== System ====================
    /// I/O error
    #[error("I/O error: {reason}")]
    Io { reason: String },

    /// Serialization error
    #[error("serialization error: {reason}")]
    Serialization { reason: String },

    /// Backend failure
    #[error("storage error: {reason}")]
    Storage { reason: String },

    /// Stored data failed an integrity check
    #[error("data corruption: {reason}")]
    Corruption { reason: String },
}

impl Error {
    /// Whether the caller or the system is at fault
    pub fn status_class(&self) -> StatusClass {
        match self {
            Error::Io { .. }
            | Error::Serialization { .. }
            | Error::Storage { .. }
            | Error::Corruption { .. } => StatusClass::Server,
            _ => StatusClass::Client,
        }
    }
}

/// Result type for command execution
pub type Result<T> = std::result::Result<T, Error>;
