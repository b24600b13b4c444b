//! Record engine for recordkv
//!
//! This crate layers tables on top of any [`recordkv_core::KvBackend`]:
//! - Schema validation (`validate`)
//! - Record codec: in-memory records to stored JSON (`codec`)
//! - Secondary indexes: one entry per (field, value) pair (`index`)
//! - Query execution: index lookup or scan, then filter, bound, sort, limit (`query`)
//! - The `Table` facade tying them together, and TOML table configuration
//!
//! The engine holds no state of its own beyond table definitions. Every
//! operation is a sequence of backend calls.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod codec;
pub mod config;
pub mod definition;
pub mod index;
pub mod query;
pub mod table;
pub mod validate;

pub use config::{TableConfig, CONFIG_FILE_NAME};
pub use definition::{TableDefinition, TableOptions, UnindexedQueries};
pub use index::{IndexKeyEncoding, IndexManager};
pub use query::{OrderBy, Query, QueryPlan, QuerySpec, SortDirection};
pub use table::Table;
pub use validate::validate;
