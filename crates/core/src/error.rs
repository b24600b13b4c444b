//! Error types for recordkv
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! Errors fall into two classes:
//! - **Client errors**: schema violations, identifier collisions, unknown
//!   records, malformed definitions. These are caused by caller input.
//! - **Infrastructure errors**: backend, I/O, serialization, corruption.
//!   These propagate unmodified from the layer that raised them.

use crate::schema::FieldKind;
use std::io;
use thiserror::Error;

/// Result type alias for recordkv operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for recordkv
#[derive(Debug, Error)]
pub enum Error {
    /// A schema-declared field is absent from the record
    #[error("Missing field: {field}")]
    MissingField {
        /// Name of the absent field
        field: String,
    },

    /// A present field holds a value of the wrong kind
    #[error("Type mismatch on field '{field}': expected {expected}, got {actual}")]
    TypeMismatch {
        /// Name of the offending field
        field: String,
        /// Kind declared by the schema
        expected: FieldKind,
        /// Runtime type of the value found
        actual: String,
    },

    /// `create` collided with an existing identifier
    #[error("Record already exists: {table}:{id}")]
    AlreadyExists {
        /// Table the record belongs to
        table: String,
        /// Colliding identifier
        id: String,
    },

    /// `update` addressed an identifier with no record
    #[error("Record not found: {table}:{id}")]
    NotFound {
        /// Table the record was looked up in
        table: String,
        /// Missing identifier
        id: String,
    },

    /// A schema declared a field kind that does not exist
    #[error("Unknown field kind: {0}")]
    UnknownFieldKind(String),

    /// A table definition is malformed (bad name, missing `id`, stray index)
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    /// A record identifier cannot be used as a key
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Storage backend error
    #[error("Storage error: {0}")]
    StorageError(String),

    /// Data corruption detected
    #[error("Data corruption: {0}")]
    Corruption(String),

    /// I/O error (file operations)
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
}

impl Error {
    /// True when the error was caused by caller input rather than by the
    /// backend or the environment.
    ///
    /// Outer layers map client errors to a 4xx-class signal and everything
    /// else to a 5xx-class signal.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::MissingField { .. }
                | Error::TypeMismatch { .. }
                | Error::AlreadyExists { .. }
                | Error::NotFound { .. }
                | Error::UnknownFieldKind(_)
                | Error::InvalidSchema(_)
                | Error::InvalidKey(_)
        )
    }

    /// Name of the field a schema violation refers to, if any
    pub fn field(&self) -> Option<&str> {
        match self {
            Error::MissingField { field } | Error::TypeMismatch { field, .. } => Some(field),
            _ => None,
        }
    }
}

impl From<bincode::Error> for Error {
    fn from(e: bincode::Error) -> Self {
        Error::SerializationError(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::SerializationError(e.to_string())
    }
}
