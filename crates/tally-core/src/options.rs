//! Ledger behaviour switches, deserialised from the `[ledger]` config table.

use chrono::{
  Local,
  format::{Item, StrftimeItems},
};
use serde::Deserialize;

use crate::{Error, Result};

/// Default `strftime` pattern for period labels, e.g. "March 2025".
pub const DEFAULT_PERIOD_LABEL_FORMAT: &str = "%B %Y";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LedgerOptions {
  /// Reject expenses whose description is empty or whitespace.
  pub reject_empty_description: bool,
  /// `strftime` pattern used to label the current period.
  pub period_label_format:      String,
}

impl Default for LedgerOptions {
  fn default() -> Self {
    Self {
      reject_empty_description: false,
      period_label_format:      DEFAULT_PERIOD_LABEL_FORMAT.to_owned(),
    }
  }
}

impl LedgerOptions {
  /// Check the label format once up front; chrono panics when rendering an
  /// invalid pattern.
  pub fn validate(&self) -> Result<()> {
    if self.period_label_format.trim().is_empty() {
      return Err(Error::Validation("period label format is empty".into()));
    }
    if StrftimeItems::new(&self.period_label_format)
      .any(|item| matches!(item, Item::Error))
    {
      return Err(Error::Validation(format!(
        "invalid period label format: {:?}",
        self.period_label_format
      )));
    }
    Ok(())
  }

  /// Label for the period containing "now" in local time.
  pub fn current_period_label(&self) -> String {
    Local::now().format(&self.period_label_format).to_string()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn default_format_is_valid() {
    let opts = LedgerOptions::default();
    opts.validate().unwrap();
    assert!(!opts.reject_empty_description);
    assert!(!opts.current_period_label().is_empty());
  }

  #[test]
  fn rejects_bad_format() {
    let opts = LedgerOptions {
      period_label_format: "%Q %".into(),
      ..LedgerOptions::default()
    };
    assert!(matches!(opts.validate(), Err(Error::Validation(_))));
  }

  #[test]
  fn custom_format_renders() {
    let opts = LedgerOptions {
      period_label_format: "%Y-%m".into(),
      ..LedgerOptions::default()
    };
    opts.validate().unwrap();
    let label = opts.current_period_label();
    assert_eq!(label.len(), 7);
    assert_eq!(&label[4..5], "-");
  }
}
