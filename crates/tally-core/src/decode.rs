//! Decoding helpers between raw store cells and typed values.
//!
//! The store is user-editable, so every reader here is lenient: an unparseable
//! amount becomes `None` (callers coerce to zero), an unparseable timestamp
//! becomes `None`, and missing trailing cells read as blank.

use std::{borrow::Cow, str::FromStr as _};

use chrono::{DateTime, NaiveDateTime};
use rust_decimal::Decimal;

/// Persisted timestamp layout, local time.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ─── Timestamps ──────────────────────────────────────────────────────────────

pub fn encode_timestamp(ts: NaiveDateTime) -> String {
  ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Accepts the canonical layout plus the ISO-8601 variants a human or an
/// older writer may have left behind (`T` separator, fractional seconds,
/// offsets).
pub fn decode_timestamp(s: &str) -> Option<NaiveDateTime> {
  let s = s.trim();
  if s.is_empty() {
    return None;
  }
  NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
    .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
    .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f"))
    .ok()
    .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.naive_local()))
}

// ─── Amounts ─────────────────────────────────────────────────────────────────

const CURRENCY_SYMBOLS: &[char] = &['$', '€', '£', '₪', '¥'];

/// Parse a money cell. Tolerates surrounding whitespace, a currency symbol
/// on either side, and comma thousands grouping. Returns `None` for blank or
/// garbage input.
pub fn decode_amount(s: &str) -> Option<Decimal> {
  let trimmed = s.trim().trim_matches(CURRENCY_SYMBOLS).trim();
  if trimmed.is_empty() {
    return None;
  }
  let normalised = strip_grouping(trimmed);
  Decimal::from_str(&normalised)
    .or_else(|_| Decimal::from_scientific(&normalised))
    .ok()
}

/// Remove `,` separators only when they look like thousands grouping
/// (`1,234.50`), never when a comma could be a decimal mark (`4,5`).
fn strip_grouping(s: &str) -> Cow<'_, str> {
  if !s.contains(',') {
    return Cow::Borrowed(s);
  }
  let integer = s.split('.').next().unwrap_or(s);
  let mut groups = integer.split(',');
  let lead = groups.next().unwrap_or_default();
  let lead_digits = lead.strip_prefix('-').unwrap_or(lead);
  let lead_ok = (1..=3).contains(&lead_digits.len())
    && lead_digits.bytes().all(|b| b.is_ascii_digit());
  if lead_ok && groups.all(|g| g.len() == 3 && g.bytes().all(|b| b.is_ascii_digit())) {
    Cow::Owned(s.replace(',', ""))
  } else {
    Cow::Borrowed(s)
  }
}

// ─── Rows ────────────────────────────────────────────────────────────────────

/// Position of `column` in `header`, compared after trimming whitespace.
pub fn column_index(header: &[String], column: &str) -> Option<usize> {
  header.iter().position(|h| h.trim() == column)
}

/// The cell at `idx`, or `""` when the row is short or the column absent.
pub fn cell_at(row: &[String], idx: Option<usize>) -> &str {
  idx.and_then(|i| row.get(i)).map(String::as_str).unwrap_or("")
}
