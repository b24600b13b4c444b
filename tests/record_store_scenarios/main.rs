//! End-to-end record store scenarios, run over the public `recordkv` API.

mod common;

mod concurrency;
mod config_driven;
mod durability;
mod executor;
mod scenarios;
