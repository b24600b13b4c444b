//! Schema validation
//!
//! `validate` checks a record against a schema: every declared field must be
//! present and hold a value of its declared kind. Fields the schema does not
//! declare are allowed through untouched.
//!
//! Fields are checked in declaration order and the first violation is
//! returned.

use recordkv_core::{timestamp, Error, FieldKind, Record, Result, Schema, Value};

/// Check `record` against `schema`
///
/// # Errors
///
/// - `MissingField` if a declared field is absent
/// - `TypeMismatch` if a present field holds a value of the wrong kind
pub fn validate(record: &Record, schema: &Schema) -> Result<()> {
    for (field, kind) in schema.iter() {
        let value = record.get(field).ok_or_else(|| Error::MissingField {
            field: field.to_string(),
        })?;
        check_field(field, kind, value)?;
    }
    Ok(())
}

/// Check a single value against a declared kind
pub fn check_field(field: &str, kind: FieldKind, value: &Value) -> Result<()> {
    if accepts(kind, value) {
        Ok(())
    } else {
        let actual = match value {
            Value::Timestamp(t) if !timestamp::in_canonical_range(t) => {
                format!("Timestamp outside years 0000-9999 ({})", t.to_rfc3339())
            }
            other => other.type_name().to_string(),
        };
        Err(Error::TypeMismatch {
            field: field.to_string(),
            expected: kind,
            actual,
        })
    }
}

/// Whether `value` satisfies `kind`
///
/// - text: `String`
/// - number: `Int`, or a finite `Float`
/// - boolean: `Bool`
/// - timestamp: `Timestamp` in years 0000 through 9999
/// - object: `Object`
/// - list: `Array`
///
/// `Null` satisfies no kind.
pub fn accepts(kind: FieldKind, value: &Value) -> bool {
    match kind {
        FieldKind::Text => matches!(value, Value::String(_)),
        FieldKind::Number => match value {
            Value::Int(_) => true,
            Value::Float(f) => f.is_finite(),
            _ => false,
        },
        FieldKind::Boolean => matches!(value, Value::Bool(_)),
        FieldKind::Timestamp => {
            matches!(value, Value::Timestamp(t) if timestamp::in_canonical_range(t))
        }
        FieldKind::Object => matches!(value, Value::Object(_)),
        FieldKind::List => matches!(value, Value::Array(_)),
    }
}
