//! An in-process [`TabularStore`], used by tests and for trying the ledger
//! without a backend.

use std::{
  collections::{BTreeMap, BTreeSet},
  sync::{Mutex, MutexGuard},
};

use crate::store::{Cell, StoreError, TabularStore};

/// Collections held in memory. Rows are stored as text, exactly as a
/// spreadsheet would hand them back.
#[derive(Debug, Default)]
pub struct MemoryStore {
  collections: Mutex<BTreeMap<String, Vec<Vec<String>>>>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }

  /// Seed a collection with raw rows (header first), replacing any existing
  /// one. Lets tests simulate hand-edited documents.
  pub fn with_rows(self, name: &str, rows: Vec<Vec<&str>>) -> Self {
    let rows = rows
      .into_iter()
      .map(|r| r.into_iter().map(str::to_owned).collect())
      .collect();
    self.lock().insert(name.to_owned(), rows);
    self
  }

  /// Raw rows of `name`, header first, or `None` if absent.
  pub fn rows(&self, name: &str) -> Option<Vec<Vec<String>>> {
    self.lock().get(name).cloned()
  }

  /// Delete a collection outright, as a user deleting a sheet would.
  pub fn remove(&self, name: &str) -> Option<Vec<Vec<String>>> {
    self.lock().remove(name)
  }

  fn lock(&self) -> MutexGuard<'_, BTreeMap<String, Vec<Vec<String>>>> {
    // Every mutation is a single push or assignment, so a poisoned map is
    // still consistent.
    self.collections.lock().unwrap_or_else(|p| p.into_inner())
  }

  fn with_collection<T>(
    &self,
    name: &str,
    f: impl FnOnce(&mut Vec<Vec<String>>) -> T,
  ) -> Result<T, StoreError> {
    let mut guard = self.lock();
    let rows = guard
      .get_mut(name)
      .ok_or_else(|| StoreError::CollectionNotFound(name.to_owned()))?;
    Ok(f(rows))
  }
}

fn text_row(row: Vec<Cell>) -> Vec<String> {
  row.iter().map(Cell::to_text).collect()
}

impl TabularStore for MemoryStore {
  async fn list_collections(&self) -> Result<BTreeSet<String>, StoreError> {
    Ok(self.lock().keys().cloned().collect())
  }

  async fn create_collection(&self, name: &str, header: &[String]) -> Result<(), StoreError> {
    let mut guard = self.lock();
    if guard.contains_key(name) {
      return Err(StoreError::unavailable(
        format!("create collection {name}"),
        "collection already exists",
      ));
    }
    guard.insert(name.to_owned(), vec![header.to_vec()]);
    Ok(())
  }

  async fn read_all_rows(&self, name: &str) -> Result<Vec<Vec<String>>, StoreError> {
    self.with_collection(name, |rows| rows.clone())
  }

  async fn append_row(&self, name: &str, row: Vec<Cell>) -> Result<(), StoreError> {
    self.with_collection(name, |rows| rows.push(text_row(row)))
  }

  async fn replace_all_rows(
    &self,
    name: &str,
    header: &[String],
    rows: Vec<Vec<Cell>>,
  ) -> Result<(), StoreError> {
    self.with_collection(name, |existing| {
      *existing = std::iter::once(header.to_vec())
        .chain(rows.into_iter().map(text_row))
        .collect();
    })
  }

  async fn clear(&self, name: &str, header: &[String]) -> Result<(), StoreError> {
    self.with_collection(name, |rows| *rows = vec![header.to_vec()])
  }
}
