//! Output enum for command execution results.
//!
//! Every command produces exactly one output variant; the mapping is listed
//! on each [`Command`](crate::Command) variant.

use recordkv_core::Record;
use serde::{Deserialize, Serialize};

/// Successful command execution results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Output {
    /// No return value
    Unit,

    /// Registered table names
    Tables(Vec<String>),

    /// A single stored record
    Record(Record),

    /// A record that may not exist
    MaybeRecord(Option<Record>),

    /// Records in result order
    Records(Vec<Record>),

    /// Record count, or index entries written
    Count(u64),

    /// Whether a delete removed anything
    Deleted(bool),
}
