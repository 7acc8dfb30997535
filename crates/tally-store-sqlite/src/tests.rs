//! Integration tests for `SqliteStore` against in-memory and on-disk
//! databases.

use std::sync::Arc;

use rust_decimal_macros::dec;
use tally_core::{
  Session,
  budget::PeriodBudget,
  category::Category,
  options::LedgerOptions,
  reset::ResetConfirmation,
  store::{Cell, StoreError, TabularStore},
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn header(cols: &[&str]) -> Vec<String> { cols.iter().map(|&c| c.to_owned()).collect() }

// ─── Raw store contract ──────────────────────────────────────────────────────

#[tokio::test]
async fn new_store_has_no_collections() {
  let s = store().await;
  assert!(s.list_collections().await.unwrap().is_empty());
}

#[tokio::test]
async fn create_and_read_header() {
  let s = store().await;
  let h = header(&["a", "b"]);
  s.create_collection("Sheet", &h).await.unwrap();

  assert!(s.list_collections().await.unwrap().contains("Sheet"));
  assert_eq!(s.read_all_rows("Sheet").await.unwrap(), vec![h]);
}

#[tokio::test]
async fn creating_twice_fails() {
  let s = store().await;
  let h = header(&["a"]);
  s.create_collection("Sheet", &h).await.unwrap();
  let err = s.create_collection("Sheet", &h).await.unwrap_err();
  assert!(matches!(err, StoreError::Unavailable { .. }));
}

#[tokio::test]
async fn appends_keep_order() {
  let s = store().await;
  s.create_collection("Sheet", &header(&["n"])).await.unwrap();
  for i in 0..5_i64 {
    s.append_row("Sheet", vec![Cell::Number(rust_decimal::Decimal::from(i))]).await.unwrap();
  }
  let rows = s.read_all_rows("Sheet").await.unwrap();
  let values: Vec<&str> = rows[1..].iter().map(|r| r[0].as_str()).collect();
  assert_eq!(values, ["0", "1", "2", "3", "4"]);
}

#[tokio::test]
async fn missing_collection_is_reported_as_not_found() {
  let s = store().await;
  assert!(matches!(
    s.read_all_rows("Nope").await,
    Err(StoreError::CollectionNotFound(ref n)) if n == "Nope"
  ));
  assert!(matches!(
    s.append_row("Nope", vec![Cell::from("x")]).await,
    Err(StoreError::CollectionNotFound(_))
  ));
  assert!(matches!(
    s.clear("Nope", &header(&["x"])).await,
    Err(StoreError::CollectionNotFound(_))
  ));
}

#[tokio::test]
async fn replace_swaps_header_and_rows() {
  let s = store().await;
  s.create_collection("Sheet", &header(&["old"])).await.unwrap();
  s.append_row("Sheet", vec![Cell::from("stale")]).await.unwrap();

  s.replace_all_rows("Sheet", &header(&["x", "y"]), vec![
    vec![Cell::from("1"), Cell::Number(dec!(2.5))],
  ])
  .await
  .unwrap();

  assert_eq!(s.read_all_rows("Sheet").await.unwrap(), vec![
    header(&["x", "y"]),
    header(&["1", "2.5"]),
  ]);
}

#[tokio::test]
async fn clear_keeps_header_only() {
  let s = store().await;
  let h = header(&["timestamp", "description", "amount"]);
  s.create_collection("Week1", &h).await.unwrap();
  s.append_row("Week1", vec![Cell::from("t"), Cell::from("d"), Cell::Number(dec!(1))])
    .await
    .unwrap();
  s.clear("Week1", &h).await.unwrap();
  assert_eq!(s.read_all_rows("Week1").await.unwrap(), vec![h]);

  // Positions restart cleanly after a clear.
  s.append_row("Week1", vec![Cell::from("t2"), Cell::from("d2"), Cell::Number(dec!(2))])
    .await
    .unwrap();
  assert_eq!(s.read_all_rows("Week1").await.unwrap().len(), 2);
}

#[tokio::test]
async fn data_survives_reopen() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("ledger.db");

  {
    let s = SqliteStore::open(&path).await.unwrap();
    s.create_collection("Sheet", &header(&["v"])).await.unwrap();
    s.append_row("Sheet", vec![Cell::from("kept")]).await.unwrap();
  }

  let s = SqliteStore::open(&path).await.unwrap();
  assert_eq!(s.read_all_rows("Sheet").await.unwrap(), vec![
    header(&["v"]),
    header(&["kept"]),
  ]);
}

// ─── Ledger over SQLite ──────────────────────────────────────────────────────

#[tokio::test]
async fn ledger_scenario_end_to_end() {
  let session = Session::open(Arc::new(store().await), LedgerOptions::default())
    .await
    .unwrap();
  assert_eq!(session.provision_report().created.len(), 7);

  session
    .budget()
    .write(&PeriodBudget::zeroed("March 2025").with_allotment(Category::Week1, dec!(100.00)))
    .await
    .unwrap();
  session.expenses().append(Category::Week1, "coffee", dec!(4.50)).await.unwrap();
  session.expenses().append(Category::Week1, "lunch", dec!(12.00)).await.unwrap();

  let balance = session.category_balance(Category::Week1).await.unwrap();
  assert_eq!(balance.remaining, dec!(83.50));

  let budget = session.budget().read().await.unwrap();
  assert_eq!(budget.period_label, "March 2025");

  session
    .reset_all(&ResetConfirmation::from_phrase("reset").unwrap())
    .await
    .unwrap();
  let summary = session.summary().await.unwrap();
  assert_eq!(summary.total_budget, dec!(0));
  assert_eq!(summary.total_spent, dec!(0));
}

#[tokio::test]
async fn reopening_session_does_not_reprovision() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("ledger.db");

  let first = Session::open(Arc::new(SqliteStore::open(&path).await.unwrap()), LedgerOptions::default())
    .await
    .unwrap();
  first.expenses().append(Category::Misc, "gift", dec!(20)).await.unwrap();
  drop(first);

  let second = Session::open(Arc::new(SqliteStore::open(&path).await.unwrap()), LedgerOptions::default())
    .await
    .unwrap();
  assert!(second.provision_report().is_noop());
  assert_eq!(second.expenses().read(Category::Misc).await.unwrap().len(), 1);
}
