//! Record codec
//!
//! Converts between in-memory records and the form written to the backend.
//!
//! The stored form is a JSON object. Timestamps become canonical sortable
//! strings (`YYYY-MM-DDTHH:MM:SS.mmmZ`); every other value maps to its
//! natural JSON counterpart. Decoding needs the schema to know which strings
//! were timestamps; fields the schema does not mention come back exactly as
//! JSON describes them.

use recordkv_core::{timestamp, FieldKind, Record, Result, Schema, Value};
use serde_json::Map;

/// Storable representation of a record
pub type StoredRecord = Map<String, serde_json::Value>;

/// Convert a record to its storable form
pub fn encode(record: &Record) -> StoredRecord {
    record
        .iter()
        .map(|(field, value)| (field.clone(), serde_json::Value::from(value.clone())))
        .collect()
}

/// Convert a storable form back to a record
///
/// Schema timestamp fields holding a parseable string are turned back into
/// `Value::Timestamp`. Anything else passes through unchanged, which lets
/// older data survive schema drift.
pub fn decode(stored: StoredRecord, schema: &Schema) -> Record {
    stored
        .into_iter()
        .map(|(field, json)| {
            let value = match (schema.kind_of(&field), json) {
                (Some(FieldKind::Timestamp), serde_json::Value::String(s)) => {
                    match timestamp::parse(&s) {
                        Some(t) => Value::Timestamp(t),
                        None => Value::String(s),
                    }
                }
                (_, other) => Value::from(other),
            };
            (field, value)
        })
        .collect()
}

/// Encode and serialize a record for the backend
pub fn to_bytes(record: &Record) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(&encode(record))?)
}

/// Deserialize and decode a record read from the backend
pub fn from_bytes(bytes: &[u8], schema: &Schema) -> Result<Record> {
    let stored: StoredRecord = serde_json::from_slice(bytes)?;
    Ok(decode(stored, schema))
}
