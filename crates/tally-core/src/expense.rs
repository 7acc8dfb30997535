//! Expense entries and the per-category append-only ledger.

use std::cmp::Ordering;

use chrono::{Local, NaiveDateTime, Timelike as _};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
  Error, Result,
  category::Category,
  decode::{cell_at, column_index, decode_amount, decode_timestamp, encode_timestamp},
  options::LedgerOptions,
  schema::Collection,
  store::{Cell, StoreError, TabularStore},
};

/// One logged expense. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseEntry {
  /// Local time of the append. `None` when the stored cell is unreadable.
  pub timestamp:   Option<NaiveDateTime>,
  pub description: String,
  pub amount:      Decimal,
}

/// Append, read, and clear expenses for any [`Category`].
pub struct ExpenseLedger<'a, S> {
  store:   &'a S,
  options: &'a LedgerOptions,
}

impl<'a, S: TabularStore> ExpenseLedger<'a, S> {
  pub fn new(store: &'a S, options: &'a LedgerOptions) -> Self {
    Self { store, options }
  }

  /// Append one expense, timestamped now.
  ///
  /// Validation happens before any store call, so a rejected expense leaves
  /// the ledger untouched.
  pub async fn append(
    &self,
    category: Category,
    description: &str,
    amount: Decimal,
  ) -> Result<ExpenseEntry> {
    if amount < Decimal::ZERO {
      return Err(Error::Validation(format!(
        "expense amount must not be negative (got {amount})"
      )));
    }
    if self.options.reject_empty_description && description.trim().is_empty() {
      return Err(Error::Validation("expense description is required".into()));
    }

    let name = category.collection_name();
    let now = Local::now().naive_local();
    let timestamp = now.with_nanosecond(0).unwrap_or(now);
    let row = vec![
      Cell::Text(encode_timestamp(timestamp)),
      Cell::Text(description.to_owned()),
      Cell::Number(amount),
    ];

    debug!(collection = name, %amount, "appending expense");
    match self.store.append_row(name, row.clone()).await {
      Ok(()) => {}
      Err(StoreError::CollectionNotFound(_)) => {
        warn!(collection = name, "ledger collection missing; recreating");
        let header = Collection::Ledger(category).header_owned();
        self
          .store
          .create_collection(name, &header)
          .await
          .map_err(|e| Error::schema(name, format!("could not create: {e}")))?;
        self.store.append_row(name, row).await?;
      }
      Err(e) => return Err(e.into()),
    }

    Ok(ExpenseEntry {
      timestamp: Some(timestamp),
      description: description.to_owned(),
      amount,
    })
  }

  /// Every expense in `category`, in append order. Unreadable amounts come
  /// back as zero so the entry count always matches the stored row count.
  pub async fn read(&self, category: Category) -> Result<Vec<ExpenseEntry>> {
    let name = category.collection_name();
    let rows = self.store.read_all_rows(name).await?;
    let Some((header, data)) = rows.split_first() else {
      return Ok(Vec::new());
    };

    let description_idx = column_index(header, "description")
      .ok_or_else(|| Error::schema(name, "header has no `description` column"))?;
    let amount_idx = column_index(header, "amount")
      .ok_or_else(|| Error::schema(name, "header has no `amount` column"))?;
    let timestamp_idx = column_index(header, "timestamp");

    let entries = data
      .iter()
      .enumerate()
      .map(|(i, row)| {
        let raw_amount = cell_at(row, Some(amount_idx));
        let amount = decode_amount(raw_amount).unwrap_or_else(|| {
          warn!(
            collection = name,
            row = i + 2,
            value = raw_amount,
            "unparseable amount; coercing to zero",
          );
          Decimal::ZERO
        });
        ExpenseEntry {
          timestamp: decode_timestamp(cell_at(row, timestamp_idx)),
          description: cell_at(row, Some(description_idx)).to_owned(),
          amount,
        }
      })
      .collect();

    Ok(entries)
  }

  /// [`ExpenseLedger::read`] sorted newest first. Entries without a readable
  /// timestamp go last; ties keep append order reversed.
  pub async fn read_newest_first(&self, category: Category) -> Result<Vec<ExpenseEntry>> {
    let mut entries = self.read(category).await?;
    entries.reverse();
    entries.sort_by(|a, b| match (a.timestamp, b.timestamp) {
      (Some(x), Some(y)) => y.cmp(&x),
      (Some(_), None) => Ordering::Less,
      (None, Some(_)) => Ordering::Greater,
      (None, None) => Ordering::Equal,
    });
    Ok(entries)
  }

  /// Drop every expense in `category`, keeping the canonical header. A
  /// ledger deleted from the store is recreated empty.
  pub async fn clear(&self, category: Category) -> Result<()> {
    let name = category.collection_name();
    info!(collection = name, "clearing ledger");
    let header = Collection::Ledger(category).header_owned();
    match self.store.clear(name, &header).await {
      Ok(()) => Ok(()),
      Err(StoreError::CollectionNotFound(_)) => {
        warn!(collection = name, "ledger collection missing; recreating empty");
        self
          .store
          .create_collection(name, &header)
          .await
          .map_err(|e| Error::schema(name, format!("could not create: {e}")))
      }
      Err(e) => Err(e.into()),
    }
  }
}
