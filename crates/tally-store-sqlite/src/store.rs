//! [`SqliteStore`]: the SQLite implementation of [`TabularStore`].

use std::{collections::BTreeSet, path::Path};

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use tally_core::store::{Cell, StoreError, TabularStore};
use tracing::debug;

use crate::{
  Error, Result,
  encode::{RawCollection, encode_cells, encode_dt, encode_header},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A ledger document backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn names(&self) -> Result<BTreeSet<String>> {
    let names = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT name FROM collections")?;
        let names = stmt
          .query_map([], |row| row.get::<_, String>(0))?
          .collect::<rusqlite::Result<BTreeSet<_>>>()?;
        Ok(names)
      })
      .await?;
    Ok(names)
  }

  async fn create(&self, name: &str, header: &[String]) -> Result<()> {
    let name_owned = name.to_owned();
    let header_json = encode_header(header)?;
    let created_at = encode_dt(Utc::now());

    let inserted = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "INSERT INTO collections (name, header_json, created_at)
           VALUES (?1, ?2, ?3)
           ON CONFLICT (name) DO NOTHING",
          rusqlite::params![name_owned, header_json, created_at],
        )?;
        Ok(changed == 1)
      })
      .await?;

    if !inserted {
      return Err(Error::CollectionExists(name.to_owned()));
    }
    Ok(())
  }

  async fn rows(&self, name: &str) -> Result<Vec<Vec<String>>> {
    let name_owned = name.to_owned();

    let raw: Option<RawCollection> = self
      .conn
      .call(move |conn| {
        let header_json: Option<String> = conn
          .query_row(
            "SELECT header_json FROM collections WHERE name = ?1",
            rusqlite::params![name_owned],
            |row| row.get(0),
          )
          .optional()?;

        let Some(header_json) = header_json else {
          return Ok(None);
        };

        let mut stmt = conn.prepare(
          "SELECT cells_json FROM rows WHERE collection = ?1 ORDER BY position",
        )?;
        let rows_json = stmt
          .query_map(rusqlite::params![name_owned], |row| row.get::<_, String>(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(Some(RawCollection { header_json, rows_json }))
      })
      .await?;

    raw
      .ok_or_else(|| Error::CollectionNotFound(name.to_owned()))?
      .into_rows()
  }

  async fn append(&self, name: &str, row: &[Cell]) -> Result<()> {
    let name_owned = name.to_owned();
    let cells_json = encode_cells(row)?;

    let found = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let exists = tx
          .query_row(
            "SELECT 1 FROM collections WHERE name = ?1",
            rusqlite::params![name_owned],
            |_| Ok(()),
          )
          .optional()?
          .is_some();
        if !exists {
          return Ok(false);
        }

        tx.execute(
          "INSERT INTO rows (collection, position, cells_json)
           VALUES (
             ?1,
             (SELECT COALESCE(MAX(position), 0) + 1 FROM rows WHERE collection = ?1),
             ?2
           )",
          rusqlite::params![name_owned, cells_json],
        )?;
        tx.commit()?;
        Ok(true)
      })
      .await?;

    if !found {
      return Err(Error::CollectionNotFound(name.to_owned()));
    }
    Ok(())
  }

  /// Swap header and rows in one transaction; readers never observe a
  /// half-replaced collection.
  async fn replace(&self, name: &str, header: &[String], rows: &[Vec<Cell>]) -> Result<()> {
    let name_owned = name.to_owned();
    let header_json = encode_header(header)?;
    let rows_json = rows
      .iter()
      .map(|r| encode_cells(r))
      .collect::<Result<Vec<_>>>()?;

    let found = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let updated = tx.execute(
          "UPDATE collections SET header_json = ?2 WHERE name = ?1",
          rusqlite::params![name_owned, header_json],
        )?;
        if updated == 0 {
          return Ok(false);
        }

        tx.execute(
          "DELETE FROM rows WHERE collection = ?1",
          rusqlite::params![name_owned],
        )?;
        {
          let mut insert = tx.prepare(
            "INSERT INTO rows (collection, position, cells_json) VALUES (?1, ?2, ?3)",
          )?;
          for (i, cells) in rows_json.iter().enumerate() {
            insert.execute(rusqlite::params![name_owned, i as i64 + 1, cells])?;
          }
        }
        tx.commit()?;
        Ok(true)
      })
      .await?;

    if !found {
      return Err(Error::CollectionNotFound(name.to_owned()));
    }
    Ok(())
  }
}

// ─── TabularStore impl ───────────────────────────────────────────────────────

impl TabularStore for SqliteStore {
  async fn list_collections(&self) -> Result<BTreeSet<String>, StoreError> {
    self.names().await.map_err(|e| e.into_store("list collections"))
  }

  async fn create_collection(&self, name: &str, header: &[String]) -> Result<(), StoreError> {
    debug!(collection = name, "creating collection");
    self
      .create(name, header)
      .await
      .map_err(|e| e.into_store(&format!("create collection {name}")))
  }

  async fn read_all_rows(&self, name: &str) -> Result<Vec<Vec<String>>, StoreError> {
    self
      .rows(name)
      .await
      .map_err(|e| e.into_store(&format!("read rows of {name}")))
  }

  async fn append_row(&self, name: &str, row: Vec<Cell>) -> Result<(), StoreError> {
    self
      .append(name, &row)
      .await
      .map_err(|e| e.into_store(&format!("append row to {name}")))
  }

  async fn replace_all_rows(
    &self,
    name: &str,
    header: &[String],
    rows: Vec<Vec<Cell>>,
  ) -> Result<(), StoreError> {
    self
      .replace(name, header, &rows)
      .await
      .map_err(|e| e.into_store(&format!("replace rows of {name}")))
  }

  /// Truncates the rows table for `name` and rewrites the header.
  async fn clear(&self, name: &str, header: &[String]) -> Result<(), StoreError> {
    debug!(collection = name, "clearing collection");
    self
      .replace(name, header, &[])
      .await
      .map_err(|e| e.into_store(&format!("clear {name}")))
  }
}
