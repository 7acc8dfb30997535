//! Google Sheets backend for the Tally ledger.
//!
//! Each collection is a tab in one spreadsheet. Talks to the Sheets v4 REST
//! API over [`reqwest`] with a caller-supplied OAuth bearer token; minting and
//! refreshing that token is the caller's business.

mod config;
mod store;

pub mod error;

pub use config::SheetsConfig;
pub use error::{Error, Result};
pub use store::SheetsStore;
