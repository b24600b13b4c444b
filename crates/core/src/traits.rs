//! Core trait for the key-value backend
//!
//! The record store never talks to a concrete storage engine. It consumes
//! this narrow interface, which any ordered key-value store can satisfy:
//! point get/put/delete plus an ordered prefix listing.
//!
//! ## Guarantees expected from implementations
//!
//! - Each single call is atomic and correctly ordered against other calls
//!   on the same key.
//! - No multi-key transactions are assumed.
//! - `list_by_prefix` returns entries in ascending byte order of key.

use crate::error::Result;
use std::sync::Arc;

/// Ordered key-value backend
///
/// Thread safety: All methods must be safe to call concurrently from
/// multiple threads (requires Send + Sync).
pub trait KvBackend: Send + Sync {
    /// Get the value stored under `key`
    ///
    /// Returns None if key doesn't exist.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Store `value` under `key`, overwriting any previous value
    fn put(&self, key: &str, value: Vec<u8>) -> Result<()>;

    /// Delete `key`
    ///
    /// Returns true if the key existed.
    fn delete(&self, key: &str) -> Result<bool>;

    /// List every entry whose key starts with `prefix`, in key order
    fn list_by_prefix(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>>;
}

impl<T: KvBackend + ?Sized> KvBackend for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn put(&self, key: &str, value: Vec<u8>) -> Result<()> {
        (**self).put(key, value)
    }

    fn delete(&self, key: &str) -> Result<bool> {
        (**self).delete(key)
    }

    fn list_by_prefix(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>> {
        (**self).list_by_prefix(prefix)
    }
}
