//! Connection settings, deserialised from the `[sheets]` config table.

use serde::Deserialize;

pub const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com";

#[derive(Debug, Clone, Deserialize)]
pub struct SheetsConfig {
  /// API root; overridden in tests to point at a mock server.
  #[serde(default = "default_base_url")]
  pub base_url:       String,
  /// The spreadsheet ID from its URL (`/spreadsheets/d/<id>/edit`).
  pub spreadsheet_id: String,
  /// OAuth 2.0 access token with the `spreadsheets` scope.
  pub access_token:   String,
  /// Per-request timeout in seconds.
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs:   u64,
}

fn default_base_url() -> String { DEFAULT_BASE_URL.to_owned() }

fn default_timeout_secs() -> u64 { 30 }

impl SheetsConfig {
  pub fn new(spreadsheet_id: impl Into<String>, access_token: impl Into<String>) -> Self {
    Self {
      base_url:       default_base_url(),
      spreadsheet_id: spreadsheet_id.into(),
      access_token:   access_token.into(),
      timeout_secs:   default_timeout_secs(),
    }
  }
}
