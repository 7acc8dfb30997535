//! Core types and operations for the Tally household budget ledger.
//!
//! The ledger keeps one period budget and six append-only expense logs inside
//! an external, loosely-typed tabular store (a spreadsheet). This crate is free
//! of HTTP and database dependencies: backends implement
//! [`store::TabularStore`] and everything else is expressed against that
//! trait.

pub mod balance;
pub mod budget;
pub mod category;
pub mod decode;
pub mod error;
pub mod expense;
pub mod memory;
pub mod options;
pub mod reset;
pub mod schema;
pub mod session;
pub mod store;

pub use error::{Error, Result};
pub use session::Session;
