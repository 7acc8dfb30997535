//! SQLite backend for the Tally ledger.
//!
//! Emulates a spreadsheet document in a single SQLite file: named
//! collections, each an ordered list of text rows under a header. Wraps
//! [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
