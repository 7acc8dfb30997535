//! Error type for `tally-store-sqlite`.

use tally_core::store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("collection not found: {0}")]
  CollectionNotFound(String),

  #[error("collection already exists: {0}")]
  CollectionExists(String),
}

impl Error {
  /// Classify for the ledger: a missing collection stays distinguishable,
  /// everything else is the store being unavailable for `operation`.
  pub fn into_store(self, operation: &str) -> StoreError {
    match self {
      Self::CollectionNotFound(name) => StoreError::CollectionNotFound(name),
      other => StoreError::unavailable(operation, other),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
