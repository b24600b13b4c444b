//! Secondary indexes
//!
//! For every indexed field, the index maps a field value to the set of ids of
//! records currently holding that value.
//!
//! ## Key Design
//!
//! - Entry key: `index:{table}:{field}:{rendered value}`
//! - Entry value: JSON array of record ids, ascending
//! - An entry whose id set becomes empty is deleted, never stored empty
//!
//! ## Consistency
//!
//! Index maintenance is a read-modify-write per entry with no cross-key
//! atomicity. A backend failure part-way through leaves the index out of step
//! with the records; the error is returned unchanged and
//! [`IndexManager::rebuild`] is the repair path.

use std::collections::BTreeSet;

use recordkv_core::{key, timestamp, KvBackend, Record, Result, Value};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::definition::TableDefinition;

/// How values are rendered into index keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexKeyEncoding {
    /// Bare string form. `1` and `"1"` share an entry.
    #[default]
    Plain,
    /// Kind prefix plus literal (`s:`, `n:`, `b:`, `t:`, `z:`, `j:`)
    Tagged,
}

/// Render a value for use in an index key
///
/// Timestamps always render in canonical sortable form. In `Plain` mode
/// strings render as themselves, numbers and booleans as their decimal or
/// literal form, null as `null`, and lists/objects as compact JSON.
///
/// ```
/// use recordkv_core::Value;
/// use recordkv_engine::index::{render_value, IndexKeyEncoding};
///
/// assert_eq!(render_value(&Value::from("A"), IndexKeyEncoding::Plain), "A");
/// assert_eq!(render_value(&Value::Float(1.0), IndexKeyEncoding::Plain), "1");
/// assert_eq!(render_value(&Value::Int(1), IndexKeyEncoding::Tagged), "n:1");
/// ```
pub fn render_value(value: &Value, encoding: IndexKeyEncoding) -> String {
    let (tag, literal) = match value {
        Value::Null => ("z", "null".to_string()),
        Value::Bool(b) => ("b", b.to_string()),
        Value::Int(i) => ("n", i.to_string()),
        Value::Float(f) => ("n", f.to_string()),
        Value::String(s) => ("s", s.clone()),
        Value::Timestamp(t) => ("t", timestamp::to_canonical(t)),
        Value::Array(_) | Value::Object(_) => {
            ("j", serde_json::Value::from(value.clone()).to_string())
        }
    };
    match encoding {
        IndexKeyEncoding::Plain => literal,
        IndexKeyEncoding::Tagged => format!("{tag}:{literal}"),
    }
}

/// Maintains the secondary indexes of one table
pub struct IndexManager<'a> {
    backend: &'a dyn KvBackend,
    def: &'a TableDefinition,
}

impl<'a> IndexManager<'a> {
    /// Create a manager for `def` over `backend`
    pub fn new(backend: &'a dyn KvBackend, def: &'a TableDefinition) -> Self {
        Self { backend, def }
    }

    /// Key of the entry for `(field, value)`
    pub fn index_key(&self, field: &str, value: &Value) -> String {
        key::index_key(
            &self.def.name,
            field,
            &render_value(value, self.def.options.index_keys),
        )
    }

    /// Ids currently recorded under `(field, value)`
    pub fn lookup(&self, field: &str, value: &Value) -> Result<BTreeSet<String>> {
        self.load(&self.index_key(field, value))
    }

    /// Record `id` under the current value of every indexed field
    pub fn add(&self, id: &str, record: &Record) -> Result<()> {
        for field in &self.def.indexes {
            if let Some(value) = record.get(field) {
                self.add_entry(field, value, id)?;
            }
        }
        Ok(())
    }

    /// Drop `id` from the entry of every indexed field's value in `record`
    pub fn remove(&self, id: &str, record: &Record) -> Result<()> {
        for field in &self.def.indexes {
            if let Some(value) = record.get(field) {
                self.remove_entry(field, value, id)?;
            }
        }
        Ok(())
    }

    /// Move `id` between entries for the indexed fields that changed
    ///
    /// Fields whose value is equal in `old` and `new` are not touched.
    /// Returns the names of the fields that were re-indexed.
    pub fn reindex(&self, id: &str, old: &Record, new: &Record) -> Result<Vec<String>> {
        let mut changed = Vec::new();
        for field in &self.def.indexes {
            let (before, after) = (old.get(field), new.get(field));
            if before == after {
                continue;
            }
            if let Some(value) = before {
                self.remove_entry(field, value, id)?;
            }
            if let Some(value) = after {
                self.add_entry(field, value, id)?;
            }
            changed.push(field.clone());
        }
        Ok(changed)
    }

    /// Delete every index entry of the table and regenerate from `records`
    ///
    /// Returns the number of entries written.
    pub fn rebuild<'r, I>(&self, records: I) -> Result<usize>
    where
        I: IntoIterator<Item = (&'r str, &'r Record)>,
    {
        let prefix = key::index_prefix(&self.def.name);
        for (stale, _) in self.backend.list_by_prefix(&prefix)? {
            self.backend.delete(&stale)?;
        }

        let mut entries: std::collections::BTreeMap<String, BTreeSet<String>> =
            std::collections::BTreeMap::new();
        for (id, record) in records {
            for field in &self.def.indexes {
                if let Some(value) = record.get(field) {
                    entries
                        .entry(self.index_key(field, value))
                        .or_default()
                        .insert(id.to_string());
                }
            }
        }

        let written = entries.len();
        for (key, ids) in &entries {
            self.store(key, ids)?;
        }
        Ok(written)
    }

    fn add_entry(&self, field: &str, value: &Value, id: &str) -> Result<()> {
        let key = self.index_key(field, value);
        let mut ids = self.load(&key)?;
        if ids.insert(id.to_string()) {
            self.store(&key, &ids)?;
            debug!(target: "recordkv::index", key = %key, id, "Index entry added");
        }
        Ok(())
    }

    fn remove_entry(&self, field: &str, value: &Value, id: &str) -> Result<()> {
        let key = self.index_key(field, value);
        let mut ids = self.load(&key)?;
        if !ids.remove(id) {
            return Ok(());
        }
        if ids.is_empty() {
            self.backend.delete(&key)?;
        } else {
            self.store(&key, &ids)?;
        }
        debug!(target: "recordkv::index", key = %key, id, "Index entry removed");
        Ok(())
    }

    fn load(&self, key: &str) -> Result<BTreeSet<String>> {
        match self.backend.get(key)? {
            Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
            None => Ok(BTreeSet::new()),
        }
    }

    fn store(&self, key: &str, ids: &BTreeSet<String>) -> Result<()> {
        self.backend.put(key, serde_json::to_vec(ids)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recordkv_core::{record, FieldKind, Schema};
    use recordkv_storage::MemoryStore;

    fn def() -> TableDefinition {
        TableDefinition::new(
            "events",
            Schema::new()
                .field("id", FieldKind::Text)
                .field("ws", FieldKind::Text)
                .field("n", FieldKind::Number)
                .field("ts", FieldKind::Timestamp),
        )
        .index("ws")
        .index("n")
    }

    fn raw_ids(store: &MemoryStore, key: &str) -> Option<Vec<String>> {
        store
            .get(key)
            .unwrap()
            .map(|bytes| serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_render_plain() {
        let enc = IndexKeyEncoding::Plain;
        assert_eq!(render_value(&Value::Int(-3), enc), "-3");
        assert_eq!(render_value(&Value::Float(2.5), enc), "2.5");
        assert_eq!(render_value(&Value::Bool(true), enc), "true");
        assert_eq!(render_value(&Value::Null, enc), "null");
        assert_eq!(
            render_value(&Value::parse_timestamp("2024-01-03").unwrap(), enc),
            "2024-01-03T00:00:00.000Z"
        );
        assert_eq!(
            render_value(&Value::Array(vec![Value::Int(1), Value::from("a")]), enc),
            r#"[1,"a"]"#
        );
    }

    #[test]
    fn test_plain_rendering_collides_across_kinds() {
        let enc = IndexKeyEncoding::Plain;
        assert_eq!(
            render_value(&Value::Int(1), enc),
            render_value(&Value::from("1"), enc)
        );
    }

    #[test]
    fn test_tagged_rendering_separates_kinds() {
        let enc = IndexKeyEncoding::Tagged;
        assert_eq!(render_value(&Value::Int(1), enc), "n:1");
        assert_eq!(render_value(&Value::from("1"), enc), "s:1");
        assert_eq!(render_value(&Value::Bool(true), enc), "b:true");
        assert_eq!(render_value(&Value::Null, enc), "z:null");
    }

    #[test]
    fn test_add_is_idempotent() {
        let store = MemoryStore::new();
        let def = def();
        let idx = IndexManager::new(&store, &def);
        let r = record! { "id" => "e1", "ws" => "A", "n" => 1 };

        idx.add("e1", &r).unwrap();
        idx.add("e1", &r).unwrap();

        assert_eq!(raw_ids(&store, "index:events:ws:A"), Some(vec!["e1".into()]));
        assert_eq!(raw_ids(&store, "index:events:n:1"), Some(vec!["e1".into()]));
    }

    #[test]
    fn test_unindexed_fields_write_nothing() {
        let store = MemoryStore::new();
        let def = def();
        let idx = IndexManager::new(&store, &def);
        idx.add(
            "e1",
            &record! { "id" => "e1", "ws" => "A", "n" => 1, "ts" => Value::parse_timestamp("2024-01-01").unwrap() },
        )
        .unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_remove_deletes_empty_entry() {
        let store = MemoryStore::new();
        let def = def();
        let idx = IndexManager::new(&store, &def);
        let r1 = record! { "id" => "e1", "ws" => "A", "n" => 1 };
        let r2 = record! { "id" => "e2", "ws" => "A", "n" => 2 };
        idx.add("e1", &r1).unwrap();
        idx.add("e2", &r2).unwrap();

        idx.remove("e1", &r1).unwrap();
        assert_eq!(raw_ids(&store, "index:events:ws:A"), Some(vec!["e2".into()]));
        assert!(raw_ids(&store, "index:events:n:1").is_none());

        idx.remove("e2", &r2).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_reindex_touches_only_changed_fields() {
        let store = MemoryStore::new();
        let def = def();
        let idx = IndexManager::new(&store, &def);
        let old = record! { "id" => "e1", "ws" => "A", "n" => 1 };
        let new = record! { "id" => "e1", "ws" => "B", "n" => 1 };
        idx.add("e1", &old).unwrap();

        let changed = idx.reindex("e1", &old, &new).unwrap();
        assert_eq!(changed, vec!["ws".to_string()]);
        assert!(raw_ids(&store, "index:events:ws:A").is_none());
        assert_eq!(raw_ids(&store, "index:events:ws:B"), Some(vec!["e1".into()]));
        assert_eq!(raw_ids(&store, "index:events:n:1"), Some(vec!["e1".into()]));
    }

    #[test]
    fn test_reindex_compares_by_value() {
        let store = MemoryStore::new();
        let def = def();
        let idx = IndexManager::new(&store, &def);
        let old = record! { "id" => "e1", "ws" => "A", "n" => 1 };
        let same = old.clone();
        assert!(idx.reindex("e1", &old, &same).unwrap().is_empty());
    }

    #[test]
    fn test_lookup_missing_entry_is_empty() {
        let store = MemoryStore::new();
        let def = def();
        let idx = IndexManager::new(&store, &def);
        assert!(idx.lookup("ws", &Value::from("nope")).unwrap().is_empty());
    }

    #[test]
    fn test_rebuild_replaces_stale_entries() {
        let store = MemoryStore::new();
        let def = def();
        let idx = IndexManager::new(&store, &def);
        store
            .put("index:events:ws:Z", serde_json::to_vec(&["ghost"]).unwrap())
            .unwrap();

        let r1 = record! { "id" => "e1", "ws" => "A", "n" => 1 };
        let r2 = record! { "id" => "e2", "ws" => "A", "n" => 2 };
        let written = idx.rebuild([("e1", &r1), ("e2", &r2)]).unwrap();

        assert_eq!(written, 3);
        assert!(store.get("index:events:ws:Z").unwrap().is_none());
        assert_eq!(
            raw_ids(&store, "index:events:ws:A"),
            Some(vec!["e1".into(), "e2".into()])
        );
    }
}
