//! Error type for `tally-store-sheets`.

use tally_core::store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  /// The API answered with a non-success status.
  #[error("sheets api returned {status}: {message}")]
  Api { status: u16, message: String },

  #[error("collection not found: {0}")]
  CollectionNotFound(String),

  #[error("invalid base url {url:?}: {reason}")]
  BaseUrl { url: String, reason: String },
}

impl Error {
  /// Classify for the ledger: a missing tab stays distinguishable,
  /// everything else is the store being unavailable for `operation`.
  pub fn into_store(self, operation: &str) -> StoreError {
    match self {
      Self::CollectionNotFound(name) => StoreError::CollectionNotFound(name),
      other => StoreError::unavailable(operation, other),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
