//! Field kinds and record schemas
//!
//! A [`Schema`] is an ordered table from field name to [`FieldKind`]. It is
//! declared once, when a table is defined, and never changes afterwards.
//!
//! Declaration order matters only for error reporting: validation walks the
//! fields in order and stops at the first violation.

use crate::error::{Error, Result};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Name of the identifier field every schema must declare
pub const ID_FIELD: &str = "id";

/// Primitive kinds a schema field can declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// UTF-8 string
    Text,
    /// Integer or finite float
    Number,
    /// Strict `true` / `false`
    Boolean,
    /// UTC instant
    Timestamp,
    /// Keyed mapping
    Object,
    /// Sequence of values
    List,
}

impl FieldKind {
    /// All kinds, in declaration order
    pub const ALL: [FieldKind; 6] = [
        FieldKind::Text,
        FieldKind::Number,
        FieldKind::Boolean,
        FieldKind::Timestamp,
        FieldKind::Object,
        FieldKind::List,
    ];

    /// Canonical lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Number => "number",
            FieldKind::Boolean => "boolean",
            FieldKind::Timestamp => "timestamp",
            FieldKind::Object => "object",
            FieldKind::List => "list",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "string" => Ok(FieldKind::Text),
            "number" => Ok(FieldKind::Number),
            "boolean" | "bool" => Ok(FieldKind::Boolean),
            "timestamp" | "date" => Ok(FieldKind::Timestamp),
            "object" => Ok(FieldKind::Object),
            "list" | "array" => Ok(FieldKind::List),
            _ => Err(Error::UnknownFieldKind(s.to_string())),
        }
    }
}

/// Ordered field-name → kind table
///
/// # Example
///
/// ```
/// use recordkv_core::{FieldKind, Schema};
///
/// let schema = Schema::new()
///     .field("id", FieldKind::Text)
///     .field("ws", FieldKind::Text)
///     .field("ts", FieldKind::Timestamp);
///
/// assert_eq!(schema.kind_of("ts"), Some(FieldKind::Timestamp));
/// assert_eq!(schema.timestamp_fields().collect::<Vec<_>>(), vec!["ts"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    fields: Vec<(String, FieldKind)>,
}

impl Schema {
    /// Create an empty schema
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Append a field declaration
    ///
    /// Re-declaring a name replaces its kind in place.
    pub fn field(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.insert(name.into(), kind);
        self
    }

    fn insert(&mut self, name: String, kind: FieldKind) {
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = kind,
            None => self.fields.push((name, kind)),
        }
    }

    /// Build a schema from `(name, kind-name)` pairs
    ///
    /// Fails with `UnknownFieldKind` on the first unrecognized kind name.
    pub fn from_kind_names<I, N, K>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (N, K)>,
        N: Into<String>,
        K: AsRef<str>,
    {
        let mut schema = Schema::new();
        for (name, kind) in pairs {
            schema.insert(name.into(), kind.as_ref().parse()?);
        }
        Ok(schema)
    }

    /// Declared kind of a field
    pub fn kind_of(&self, name: &str) -> Option<FieldKind> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, kind)| *kind)
    }

    /// Whether the schema declares `name`
    pub fn contains(&self, name: &str) -> bool {
        self.kind_of(name).is_some()
    }

    /// Iterate declarations in order
    pub fn iter(&self) -> impl Iterator<Item = (&str, FieldKind)> {
        self.fields.iter().map(|(n, k)| (n.as_str(), *k))
    }

    /// Names of every timestamp-kind field, in order
    pub fn timestamp_fields(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .filter(|(_, kind)| *kind == FieldKind::Timestamp)
            .map(|(n, _)| n.as_str())
    }

    /// Number of declared fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True if no fields are declared
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<N: Into<String>> FromIterator<(N, FieldKind)> for Schema {
    fn from_iter<T: IntoIterator<Item = (N, FieldKind)>>(iter: T) -> Self {
        let mut schema = Schema::new();
        for (name, kind) in iter {
            schema.insert(name.into(), kind);
        }
        schema
    }
}

// Schemas serialize as a map so `[schema]` tables in TOML and JSON objects
// both read naturally. Entry order is kept as encountered.
impl Serialize for Schema {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, kind) in &self.fields {
            map.serialize_entry(name, kind)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Schema {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct SchemaVisitor;

        impl<'de> Visitor<'de> for SchemaVisitor {
            type Value = Schema;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of field name to field kind")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut access: A,
            ) -> std::result::Result<Schema, A::Error> {
                let mut schema = Schema::new();
                while let Some((name, kind)) = access.next_entry::<String, String>()? {
                    let kind = kind.parse().map_err(serde::de::Error::custom)?;
                    schema.insert(name, kind);
                }
                Ok(schema)
            }
        }

        deserializer.deserialize_map(SchemaVisitor)
    }
}
