//! The `TabularStore` trait: the only capability the ledger needs from its
//! backing document.
//!
//! A store holds named collections. Each collection is an ordered list of
//! rows of text cells whose first row is the header. Backends (`SqliteStore`,
//! `SheetsStore`, [`crate::memory::MemoryStore`]) implement this trait; the
//! rest of the crate never touches a concrete backend.

use std::{collections::BTreeSet, fmt, future::Future};

use rust_decimal::Decimal;
use thiserror::Error;

// ─── Cell ────────────────────────────────────────────────────────────────────

/// A value written into a store row.
///
/// Numbers are kept distinct from text so backends that support typed cells
/// (spreadsheets) store amounts as numbers rather than formatted strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
  Text(String),
  Number(Decimal),
}

impl Cell {
  /// The plain-text rendering used by text-only backends.
  pub fn to_text(&self) -> String {
    match self {
      Self::Text(s) => s.clone(),
      Self::Number(n) => n.to_string(),
    }
  }
}

impl fmt::Display for Cell {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Text(s) => f.write_str(s),
      Self::Number(n) => write!(f, "{n}"),
    }
  }
}

impl From<&str> for Cell {
  fn from(s: &str) -> Self { Self::Text(s.to_owned()) }
}

impl From<String> for Cell {
  fn from(s: String) -> Self { Self::Text(s) }
}

impl From<Decimal> for Cell {
  fn from(n: Decimal) -> Self { Self::Number(n) }
}

// ─── Errors ──────────────────────────────────────────────────────────────────

/// Failure reported by a [`TabularStore`] backend.
#[derive(Debug, Error)]
pub enum StoreError {
  #[error("collection not found: {0}")]
  CollectionNotFound(String),

  /// Transport, auth, or backend failure. Carries the failing operation so
  /// the caller can decide whether to retry.
  #[error("{operation} failed: {source}")]
  Unavailable {
    operation: String,
    #[source]
    source:    Box<dyn std::error::Error + Send + Sync>,
  },
}

impl StoreError {
  pub fn unavailable(
    operation: impl Into<String>,
    source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
  ) -> Self {
    Self::Unavailable { operation: operation.into(), source: source.into() }
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a loosely-typed, externally editable tabular document.
///
/// Rows are returned raw: every cell is text, rows may be shorter than the
/// header (trailing blanks trimmed), and nothing is validated. Decoding into
/// typed records is the caller's job.
///
/// All methods return `Send` futures so callers can drive independent reads
/// concurrently on a multi-threaded runtime.
pub trait TabularStore: Send + Sync {
  /// Names of every collection currently in the document.
  fn list_collections(
    &self,
  ) -> impl Future<Output = Result<BTreeSet<String>, StoreError>> + Send + '_;

  /// Create a collection whose only row is `header`.
  fn create_collection<'a>(
    &'a self,
    name: &'a str,
    header: &'a [String],
  ) -> impl Future<Output = Result<(), StoreError>> + Send + 'a;

  /// Every row of the collection, header first, in the store's native order.
  /// An empty collection (not even a header) yields an empty vec.
  fn read_all_rows<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<Vec<Vec<String>>, StoreError>> + Send + 'a;

  /// Append one row after the last existing row.
  fn append_row<'a>(
    &'a self,
    name: &'a str,
    row: Vec<Cell>,
  ) -> impl Future<Output = Result<(), StoreError>> + Send + 'a;

  /// Replace the entire content of the collection with `header` followed by
  /// `rows`.
  fn replace_all_rows<'a>(
    &'a self,
    name: &'a str,
    header: &'a [String],
    rows: Vec<Vec<Cell>>,
  ) -> impl Future<Output = Result<(), StoreError>> + Send + 'a;

  /// Remove every data row. Afterwards the collection holds exactly `header`
  /// and nothing else, whether the backend truncates or recreates.
  fn clear<'a>(
    &'a self,
    name: &'a str,
    header: &'a [String],
  ) -> impl Future<Output = Result<(), StoreError>> + Send + 'a;
}
