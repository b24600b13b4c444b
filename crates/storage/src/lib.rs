//! Storage layer for recordkv
//!
//! This crate implements the ordered key-value backends the engine runs on:
//! - MemoryStore: BTreeMap-based storage with RwLock
//! - LogStore: MemoryStore semantics made durable by an append-only,
//!   CRC-framed operation log replayed on open
//!
//! Both satisfy [`recordkv_core::KvBackend`]: per-call atomicity, ordered
//! prefix listing, no multi-key transactions.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod encoding;
pub mod log;
pub mod memory;

pub use log::{Durability, LogStore, LOG_FILE_NAME};
pub use memory::MemoryStore;
