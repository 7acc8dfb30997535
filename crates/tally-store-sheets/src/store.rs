//! [`SheetsStore`]: the Google Sheets implementation of [`TabularStore`].

use std::{collections::BTreeSet, time::Duration};

use reqwest::{Client, RequestBuilder, Response, Url};
use rust_decimal::prelude::ToPrimitive as _;
use serde::Deserialize;
use serde_json::{Value, json};
use tally_core::store::{Cell, StoreError, TabularStore};
use tracing::debug;

use crate::{Error, Result, SheetsConfig};

// ─── Wire types ──────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct Spreadsheet {
  #[serde(default)]
  sheets: Vec<Sheet>,
}

#[derive(Deserialize)]
struct Sheet {
  properties: SheetProperties,
}

#[derive(Deserialize)]
struct SheetProperties {
  title: String,
}

#[derive(Deserialize)]
struct ValueRange {
  #[serde(default)]
  values: Vec<Vec<Value>>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
  error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
  message: String,
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A ledger document living in one Google spreadsheet.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct SheetsStore {
  client: Client,
  config: SheetsConfig,
  base:   Url,
}

impl SheetsStore {
  pub fn new(config: SheetsConfig) -> Result<Self> {
    let base = Url::parse(&config.base_url).map_err(|e| Error::BaseUrl {
      url:    config.base_url.clone(),
      reason: e.to_string(),
    })?;
    if base.cannot_be_a_base() {
      return Err(Error::BaseUrl {
        url:    config.base_url.clone(),
        reason: "not a hierarchical URL".into(),
      });
    }
    let client = Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()?;
    Ok(Self { client, config, base })
  }

  /// `{base}/v4/spreadsheets/{id}{suffix}`
  fn spreadsheet_url(&self, suffix: &str) -> Url {
    let mut url = self.base.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
      segments
        .pop_if_empty()
        .extend(["v4", "spreadsheets"])
        .push(&format!("{}{suffix}", self.config.spreadsheet_id));
    }
    url
  }

  /// `{base}/v4/spreadsheets/{id}/values/{range}{suffix}`
  fn values_url(&self, range: &str, suffix: &str) -> Url {
    let mut url = self.base.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
      segments
        .pop_if_empty()
        .extend(["v4", "spreadsheets", &self.config.spreadsheet_id, "values"])
        .push(&format!("{range}{suffix}"));
    }
    url
  }

  /// Attach auth, send, and turn non-success statuses into errors. A range
  /// the API cannot resolve means the tab does not exist.
  async fn send(&self, collection: &str, req: RequestBuilder) -> Result<Response> {
    let resp = req.bearer_auth(&self.config.access_token).send().await?;
    let status = resp.status();
    if status.is_success() {
      return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorBody>(&body)
      .map(|b| b.error.message)
      .unwrap_or(body);

    if status == reqwest::StatusCode::BAD_REQUEST && message.contains("Unable to parse range") {
      return Err(Error::CollectionNotFound(collection.to_owned()));
    }
    Err(Error::Api { status: status.as_u16(), message })
  }

  async fn titles(&self) -> Result<BTreeSet<String>> {
    let req = self
      .client
      .get(self.spreadsheet_url(""))
      .query(&[("fields", "sheets.properties.title")]);
    let sheet: Spreadsheet = self.send("", req).await?.json().await?;
    Ok(sheet.sheets.into_iter().map(|s| s.properties.title).collect())
  }

  async fn add_sheet(&self, name: &str) -> Result<()> {
    let body = json!({
      "requests": [{ "addSheet": { "properties": { "title": name } } }]
    });
    let req = self.client.post(self.spreadsheet_url(":batchUpdate")).json(&body);
    self.send(name, req).await?;
    Ok(())
  }

  async fn values(&self, name: &str) -> Result<Vec<Vec<String>>> {
    let req = self.client.get(self.values_url(&sheet_range(name), "")).query(&[
      ("majorDimension", "ROWS"),
      ("valueRenderOption", "UNFORMATTED_VALUE"),
      ("dateTimeRenderOption", "FORMATTED_STRING"),
    ]);
    let range: ValueRange = self.send(name, req).await?.json().await?;
    Ok(
      range
        .values
        .into_iter()
        .map(|row| row.into_iter().map(value_text).collect())
        .collect(),
    )
  }

  async fn append(&self, name: &str, row: &[Cell]) -> Result<()> {
    let body = json!({ "values": [row.iter().map(cell_json).collect::<Vec<_>>()] });
    let req = self
      .client
      .post(self.values_url(&anchor_range(name), ":append"))
      .query(&[("valueInputOption", "RAW"), ("insertDataOption", "INSERT_ROWS")])
      .json(&body);
    self.send(name, req).await?;
    Ok(())
  }

  /// Clear the tab, then write header and rows from `A1`. Two calls: if the
  /// second fails the tab is left empty, which provisioning repairs.
  async fn overwrite(&self, name: &str, header: &[String], rows: &[Vec<Cell>]) -> Result<()> {
    let clear = self
      .client
      .post(self.values_url(&sheet_range(name), ":clear"))
      .json(&json!({}));
    self.send(name, clear).await?;

    let values: Vec<Vec<Value>> = std::iter::once(header.iter().map(|h| json!(h)).collect())
      .chain(rows.iter().map(|r| r.iter().map(cell_json).collect()))
      .collect();
    let update = self
      .client
      .put(self.values_url(&anchor_range(name), ""))
      .query(&[("valueInputOption", "RAW")])
      .json(&json!({ "majorDimension": "ROWS", "values": values }));
    self.send(name, update).await?;
    Ok(())
  }
}

// ─── Encoding ────────────────────────────────────────────────────────────────

/// A1 reference to a whole tab, quoted so any title is accepted.
fn sheet_range(name: &str) -> String { format!("'{}'", name.replace('\'', "''")) }

fn anchor_range(name: &str) -> String { format!("{}!A1", sheet_range(name)) }

/// Numbers go out as JSON numbers so the sheet stores them as numeric cells.
fn cell_json(cell: &Cell) -> Value {
  match cell {
    Cell::Text(s) => Value::String(s.clone()),
    Cell::Number(n) => n
      .to_f64()
      .and_then(serde_json::Number::from_f64)
      .map_or_else(|| Value::String(n.to_string()), Value::Number),
  }
}

fn value_text(value: Value) -> String {
  match value {
    Value::String(s) => s,
    Value::Null => String::new(),
    Value::Bool(b) => (if b { "TRUE" } else { "FALSE" }).to_owned(),
    other => other.to_string(),
  }
}

// ─── TabularStore impl ───────────────────────────────────────────────────────

impl TabularStore for SheetsStore {
  async fn list_collections(&self) -> Result<BTreeSet<String>, StoreError> {
    self.titles().await.map_err(|e| e.into_store("list sheets"))
  }

  async fn create_collection(&self, name: &str, header: &[String]) -> Result<(), StoreError> {
    debug!(sheet = name, "adding sheet");
    let result = async {
      self.add_sheet(name).await?;
      self.overwrite(name, header, &[]).await
    };
    result.await.map_err(|e| e.into_store(&format!("create sheet {name}")))
  }

  async fn read_all_rows(&self, name: &str) -> Result<Vec<Vec<String>>, StoreError> {
    self
      .values(name)
      .await
      .map_err(|e| e.into_store(&format!("read sheet {name}")))
  }

  async fn append_row(&self, name: &str, row: Vec<Cell>) -> Result<(), StoreError> {
    self
      .append(name, &row)
      .await
      .map_err(|e| e.into_store(&format!("append to sheet {name}")))
  }

  async fn replace_all_rows(
    &self,
    name: &str,
    header: &[String],
    rows: Vec<Vec<Cell>>,
  ) -> Result<(), StoreError> {
    self
      .overwrite(name, header, &rows)
      .await
      .map_err(|e| e.into_store(&format!("rewrite sheet {name}")))
  }

  async fn clear(&self, name: &str, header: &[String]) -> Result<(), StoreError> {
    debug!(sheet = name, "clearing sheet");
    self
      .overwrite(name, header, &[])
      .await
      .map_err(|e| e.into_store(&format!("clear sheet {name}")))
  }
}
