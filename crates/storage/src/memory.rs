//! MemoryStore: ordered in-memory backend
//!
//! Implements the KvBackend trait using:
//! - `BTreeMap<String, Vec<u8>>` for ordered key storage
//! - `parking_lot::RwLock` for thread-safe access
//!
//! Every call takes the lock exactly once, so each call is atomic with
//! respect to every other call. Nothing spans calls.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;

use recordkv_core::{KvBackend, Result};

/// In-memory ordered backend
///
/// Cloning shares the underlying map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: Arc<RwLock<BTreeMap<String, Vec<u8>>>>,
}

impl MemoryStore {
    /// Create a new empty MemoryStore
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with entries
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, Vec<u8>)>,
    {
        Self {
            data: Arc::new(RwLock::new(entries.into_iter().collect())),
        }
    }

    /// Number of keys currently stored
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// True if the store holds no keys
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    /// Copy of every key, in order
    pub fn keys(&self) -> Vec<String> {
        self.data.read().keys().cloned().collect()
    }
}

/// Collect the entries of `map` whose key starts with `prefix`
pub(crate) fn scan_prefix(
    map: &BTreeMap<String, Vec<u8>>,
    prefix: &str,
) -> Vec<(String, Vec<u8>)> {
    map.range(prefix.to_string()..)
        .take_while(|(k, _)| k.starts_with(prefix))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

impl KvBackend for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.data.read().get(key).cloned())
    }

    fn put(&self, key: &str, value: Vec<u8>) -> Result<()> {
        self.data.write().insert(key.to_string(), value);
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<bool> {
        Ok(self.data.write().remove(key).is_some())
    }

    fn list_by_prefix(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>> {
        Ok(scan_prefix(&self.data.read(), prefix))
    }
}
