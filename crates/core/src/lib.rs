//! Core types and traits for recordkv
//!
//! This crate defines the foundational types used throughout the system:
//! - Value: Unified value enum for all field values
//! - Record: Field-name → Value mapping
//! - FieldKind / Schema: Declared field types of a table
//! - Error: Error type hierarchy
//! - KvBackend: The storage collaborator the engine consumes
//! - key: The persisted key layout
//! - timestamp: Canonical sortable timestamp strings

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod key;
pub mod schema;
pub mod timestamp;
pub mod traits;
pub mod value;

pub use error::{Error, Result};
pub use schema::{FieldKind, Schema, ID_FIELD};
pub use traits::KvBackend;
pub use value::{Record, Value};
