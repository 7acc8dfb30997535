//! Runtime configuration, layered from `tally.toml` and `TALLY_*` variables.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;
use tally_core::options::LedgerOptions;
use tally_store_sheets::SheetsConfig;

pub const DEFAULT_SQLITE_PATH: &str = "~/.local/share/tally/tally.db";

/// Which store holds the ledger document.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
  #[default]
  Sqlite,
  Sheets,
}

#[derive(Debug, Deserialize)]
pub struct AppConfig {
  #[serde(default)]
  pub backend:     Backend,
  #[serde(default = "default_sqlite_path")]
  pub sqlite_path: PathBuf,
  /// Required when `backend = "sheets"`.
  pub sheets:      Option<SheetsConfig>,
  #[serde(default)]
  pub ledger:      LedgerOptions,
}

fn default_sqlite_path() -> PathBuf { PathBuf::from(DEFAULT_SQLITE_PATH) }

impl AppConfig {
  /// Read `path` if it exists, then apply the environment on top.
  ///
  /// Nested keys use a double underscore, e.g. `TALLY_SHEETS__ACCESS_TOKEN`.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(
        config::Environment::with_prefix("TALLY")
          .prefix_separator("_")
          .separator("__"),
      )
      .build()
      .context("failed to read config file")?
      .try_deserialize()
      .context("failed to deserialise AppConfig")
  }

  /// Sheets settings, or an error naming the missing table.
  pub fn sheets(&self) -> anyhow::Result<SheetsConfig> {
    self
      .sheets
      .clone()
      .context("backend is \"sheets\" but no [sheets] table is configured")
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use config::{Config, File, FileFormat};
  use pretty_assertions::assert_eq;

  use super::*;

  fn parse(toml: &str) -> AppConfig {
    Config::builder()
      .add_source(File::from_str(toml, FileFormat::Toml))
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap()
  }

  #[test]
  fn empty_file_uses_defaults() {
    let cfg = parse("");
    assert_eq!(cfg.backend, Backend::Sqlite);
    assert_eq!(cfg.sqlite_path, PathBuf::from(DEFAULT_SQLITE_PATH));
    assert!(cfg.sheets.is_none());
    assert!(!cfg.ledger.reject_empty_description);
    assert_eq!(cfg.ledger.period_label_format, "%B %Y");
  }

  #[test]
  fn sheets_backend_with_ledger_options() {
    let cfg = parse(
      r#"
        backend = "sheets"

        [sheets]
        spreadsheet_id = "abc123"
        access_token   = "ya29.token"

        [ledger]
        reject_empty_description = true
        period_label_format      = "%Y-%m"
      "#,
    );
    assert_eq!(cfg.backend, Backend::Sheets);
    let sheets = cfg.sheets().unwrap();
    assert_eq!(sheets.spreadsheet_id, "abc123");
    assert_eq!(sheets.base_url, "https://sheets.googleapis.com");
    assert_eq!(sheets.timeout_secs, 30);
    assert!(cfg.ledger.reject_empty_description);
    assert_eq!(cfg.ledger.period_label_format, "%Y-%m");
  }

  #[test]
  fn sheets_backend_without_table_is_an_error() {
    let cfg = parse(r#"backend = "sheets""#);
    assert!(cfg.sheets().is_err());
  }

  #[test]
  fn tilde_expands_to_home() {
    let Ok(home) = std::env::var("HOME") else { return };
    assert_eq!(expand_tilde(Path::new("~/x/tally.db")), PathBuf::from(home).join("x/tally.db"));
    assert_eq!(expand_tilde(Path::new("/tmp/tally.db")), PathBuf::from("/tmp/tally.db"));
  }
}
