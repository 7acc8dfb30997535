//! Canonical collection layout and the schema provisioner.
//!
//! Seven collections make up a ledger document: one budget collection and
//! one ledger per [`Category`]. Provisioning creates what is missing and
//! never touches existing rows. A header that drifted from the canonical one
//! (someone edited the sheet by hand) is reported, not repaired; readers
//! locate columns by name and degrade gracefully.

use std::fmt;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
  Error, Result,
  category::Category,
  options::LedgerOptions,
  store::{Cell, TabularStore},
};

// ─── Canonical layout ────────────────────────────────────────────────────────

pub const BUDGET_COLLECTION: &str = "Budgets";

pub const PERIOD_LABEL_COLUMN: &str = "month_name";

pub const BUDGET_HEADER: [&str; 7] = [
  PERIOD_LABEL_COLUMN,
  "week1",
  "week2",
  "week3",
  "week4",
  "week5",
  "other_budget",
];

pub const LEDGER_HEADER: [&str; 3] = ["timestamp", "description", "amount"];

/// One of the seven collections the ledger owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
  Budget,
  Ledger(Category),
}

impl Collection {
  /// Every collection, ledgers first and the budget last (the order reset
  /// applies them in).
  pub fn all() -> impl Iterator<Item = Self> {
    Category::all().map(Self::Ledger).chain(std::iter::once(Self::Budget))
  }

  pub fn name(self) -> &'static str {
    match self {
      Self::Budget => BUDGET_COLLECTION,
      Self::Ledger(category) => category.collection_name(),
    }
  }

  pub fn canonical_header(self) -> &'static [&'static str] {
    match self {
      Self::Budget => &BUDGET_HEADER,
      Self::Ledger(_) => &LEDGER_HEADER,
    }
  }

  pub fn header_owned(self) -> Vec<String> {
    self.canonical_header().iter().map(|&h| h.to_owned()).collect()
  }
}

impl fmt::Display for Collection {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

/// The budget data row written when the budget collection is first created.
pub(crate) fn zero_budget_row(label: String) -> Vec<Cell> {
  std::iter::once(Cell::Text(label))
    .chain(std::iter::repeat_n(Cell::Number(Decimal::ZERO), BUDGET_HEADER.len() - 1))
    .collect()
}

// ─── Report ──────────────────────────────────────────────────────────────────

/// A collection whose header differs from the canonical one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderDrift {
  pub collection: Collection,
  pub found:      Vec<String>,
}

/// What [`ensure_schema`] did. Empty on an already provisioned store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProvisionReport {
  /// Collections that did not exist and were created.
  pub created:             Vec<Collection>,
  /// Collections that existed with no rows at all and received a header.
  pub initialized_headers: Vec<Collection>,
  /// Collections whose existing header is left as-is despite differing.
  pub drifted:             Vec<HeaderDrift>,
}

impl ProvisionReport {
  /// `true` if provisioning wrote nothing.
  pub fn is_noop(&self) -> bool {
    self.created.is_empty() && self.initialized_headers.is_empty()
  }
}

// ─── Provisioner ─────────────────────────────────────────────────────────────

/// Make sure every required collection exists with a header row.
///
/// Idempotent: a second call on the same store writes nothing.
pub async fn ensure_schema<S: TabularStore>(
  store: &S,
  options: &LedgerOptions,
) -> Result<ProvisionReport> {
  let existing = store.list_collections().await?;
  let mut report = ProvisionReport::default();

  for collection in Collection::all() {
    let name = collection.name();
    let header = collection.header_owned();

    if !existing.contains(name) {
      info!(collection = name, "creating missing collection");
      store
        .create_collection(name, &header)
        .await
        .map_err(|e| Error::schema(name, format!("could not create: {e}")))?;
      if collection == Collection::Budget {
        let row = zero_budget_row(options.current_period_label());
        store
          .append_row(name, row)
          .await
          .map_err(|e| Error::schema(name, format!("could not seed budget row: {e}")))?;
      }
      report.created.push(collection);
      continue;
    }

    let rows = store.read_all_rows(name).await?;
    match rows.first() {
      None => {
        info!(collection = name, "writing header into empty collection");
        store
          .replace_all_rows(name, &header, Vec::new())
          .await
          .map_err(|e| Error::schema(name, format!("could not write header: {e}")))?;
        report.initialized_headers.push(collection);
      }
      Some(found) if !header_matches(found, collection.canonical_header()) => {
        warn!(
          collection = name,
          found = ?found,
          expected = ?collection.canonical_header(),
          "header drifted from canonical layout; leaving it untouched",
        );
        report.drifted.push(HeaderDrift { collection, found: found.clone() });
      }
      Some(_) => debug!(collection = name, "collection present"),
    }
  }

  Ok(report)
}

fn header_matches(found: &[String], canonical: &[&str]) -> bool {
  // Sheets drop trailing empty cells, but a hand-edited header may also
  // carry extra blank columns; ignore those.
  let trimmed: Vec<&str> = found.iter().map(|h| h.trim()).collect();
  let end = trimmed.iter().rposition(|h| !h.is_empty()).map_or(0, |i| i + 1);
  trimmed[..end] == *canonical
}
