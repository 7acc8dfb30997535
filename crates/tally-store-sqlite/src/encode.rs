//! Encoding helpers between ledger rows and SQLite columns.
//!
//! Headers and rows are stored as compact JSON arrays of strings. Cells are
//! persisted as text, the way a spreadsheet export hands them back.

use chrono::{DateTime, Utc};
use tally_core::store::Cell;

use crate::Result;

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn encode_header(header: &[String]) -> Result<String> {
  Ok(serde_json::to_string(header)?)
}

pub fn encode_cells(row: &[Cell]) -> Result<String> {
  let text: Vec<String> = row.iter().map(Cell::to_text).collect();
  Ok(serde_json::to_string(&text)?)
}

pub fn decode_row(s: &str) -> Result<Vec<String>> { Ok(serde_json::from_str(s)?) }

/// Raw strings read from a `collections` row and its `rows`.
pub struct RawCollection {
  pub header_json: String,
  pub rows_json:   Vec<String>,
}

impl RawCollection {
  /// Header first, then data rows. A collection with an empty header and no
  /// rows reads as completely empty.
  pub fn into_rows(self) -> Result<Vec<Vec<String>>> {
    let header = decode_row(&self.header_json)?;
    if header.is_empty() && self.rows_json.is_empty() {
      return Ok(Vec::new());
    }
    std::iter::once(Ok(header))
      .chain(self.rows_json.iter().map(|r| decode_row(r)))
      .collect()
  }
}
