//! Error conversion from engine errors.

use crate::Error;
use recordkv_core::Error as CoreError;

/// Every core error maps to exactly one executor variant, keeping its details.
impl From<CoreError> for Error {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::MissingField { field } => Error::MissingField { field },
            CoreError::TypeMismatch {
                field,
                expected,
                actual,
            } => Error::TypeMismatch {
                field,
                expected: expected.to_string(),
                actual,
            },
            CoreError::AlreadyExists { table, id } => Error::AlreadyExists { table, id },
            CoreError::NotFound { table, id } => Error::NotFound { table, id },
            CoreError::UnknownFieldKind(kind) => Error::UnknownFieldKind { kind },
            CoreError::InvalidSchema(reason) => Error::InvalidSchema { reason },
            CoreError::InvalidKey(reason) => Error::InvalidKey { reason },
            CoreError::SerializationError(reason) => Error::Serialization { reason },
            CoreError::StorageError(reason) => Error::Storage { reason },
            CoreError::Corruption(reason) => Error::Corruption { reason },
            CoreError::IoError(e) => Error::Io {
                reason: e.to_string(),
            },
        }
    }
}
