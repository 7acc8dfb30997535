//! Error types for `tally-core`.

use thiserror::Error;

use crate::{reset::PartialResetFailure, store::StoreError};

#[derive(Debug, Error)]
pub enum Error {
  /// A required collection or column is missing and could not be created.
  #[error("schema error in collection {collection:?}: {reason}")]
  Schema { collection: String, reason: String },

  /// Caller-supplied data was rejected before any store call was made.
  #[error("validation error: {0}")]
  Validation(String),

  #[error("store unavailable during {operation}: {source}")]
  StoreUnavailable {
    operation: String,
    #[source]
    source:    Box<dyn std::error::Error + Send + Sync>,
  },

  #[error(transparent)]
  PartialReset(#[from] PartialResetFailure),
}

impl Error {
  pub(crate) fn schema(
    collection: impl Into<String>,
    reason: impl Into<String>,
  ) -> Self {
    Self::Schema { collection: collection.into(), reason: reason.into() }
  }
}

impl From<StoreError> for Error {
  fn from(err: StoreError) -> Self {
    match err {
      StoreError::CollectionNotFound(name) => {
        Self::schema(name, "collection does not exist")
      }
      StoreError::Unavailable { operation, source } => {
        Self::StoreUnavailable { operation, source }
      }
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
