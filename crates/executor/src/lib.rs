//! # recordkv executor
//!
//! The command surface of recordkv. Outer layers (an HTTP router, a CLI)
//! build a [`Command`], hand it to an [`Executor`], and marshal the
//! resulting [`Output`] or [`Error`]. All three are serde types.
//!
//! ```text
//! Command (JSON) ──► Executor ──► Table ──► KvBackend
//!                        │
//!                        └──► Output | Error { status_class }
//! ```

#![warn(missing_docs)]

mod command;
mod convert;
mod error;
mod executor;
mod output;

#[cfg(test)]
mod tests;

pub use command::Command;
pub use error::{Error, Result, StatusClass};
pub use executor::Executor;
pub use output::Output;
