//! Destructive reset of the whole ledger document.
//!
//! The store offers no multi-collection transaction, so a reset can stop
//! half way. When it does, the caller gets the exact set of collections that
//! still need resetting and can retry just those with [`reset`].

use thiserror::Error;
use tracing::{error, info, warn};

use crate::{
  Error, Result,
  budget::{BudgetStore, PeriodBudget},
  category::Category,
  expense::ExpenseLedger,
  options::LedgerOptions,
  schema::Collection,
  store::TabularStore,
};

/// The phrase a user must type to authorise a reset.
pub const RESET_PHRASE: &str = "reset";

/// Proof that the user explicitly confirmed a reset. Only obtainable from
/// the confirmation phrase, so no code path can reset by accident.
#[derive(Debug)]
pub struct ResetConfirmation {
  _private: (),
}

impl ResetConfirmation {
  pub fn from_phrase(phrase: &str) -> Result<Self> {
    if phrase.trim().eq_ignore_ascii_case(RESET_PHRASE) {
      Ok(Self { _private: () })
    } else {
      Err(Error::Validation(format!(
        "reset not confirmed: type {RESET_PHRASE:?} to erase all expenses and budgets"
      )))
    }
  }
}

/// Every requested collection was reset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetReport {
  pub reset: Vec<Collection>,
}

/// Some collections were not reset. `failed` is what to pass to [`reset`]
/// on retry.
#[derive(Debug, Error)]
#[error(
  "reset incomplete: {} collection(s) reset; not reset: {}",
  .reset.len(),
  collection_list(.failed)
)]
pub struct PartialResetFailure {
  pub reset:  Vec<Collection>,
  pub failed: Vec<Collection>,
  /// The store error behind each failed ledger clear or budget write. A
  /// budget skipped because a ledger failed has no entry.
  pub causes: Vec<(Collection, Error)>,
}

fn collection_list(collections: &[Collection]) -> String {
  collections.iter().map(|c| c.name()).collect::<Vec<_>>().join(", ")
}

/// Reset all seven collections.
pub async fn reset_all<S: TabularStore>(
  store: &S,
  options: &LedgerOptions,
  confirmation: &ResetConfirmation,
) -> Result<ResetReport> {
  let targets: Vec<Collection> = Collection::all().collect();
  reset(store, options, &targets, confirmation).await
}

/// Reset the given collections: ledgers are cleared, then the budget (if
/// targeted) is zeroed with the current period label.
///
/// The budget is written only once every targeted ledger has been cleared,
/// so a failed reset never leaves a zeroed budget next to surviving
/// expenses.
pub async fn reset<S: TabularStore>(
  store: &S,
  options: &LedgerOptions,
  targets: &[Collection],
  _confirmation: &ResetConfirmation,
) -> Result<ResetReport> {
  let mut targets = targets.to_vec();
  targets.sort_unstable();
  targets.dedup();

  let ledgers: Vec<Category> = targets
    .iter()
    .filter_map(|c| match c {
      Collection::Ledger(category) => Some(*category),
      Collection::Budget => None,
    })
    .collect();
  let budget_targeted = targets.contains(&Collection::Budget);

  info!(collections = targets.len(), "resetting ledger document");

  let mut done = Vec::new();
  let mut failed = Vec::new();
  let mut causes = Vec::new();

  let expenses = ExpenseLedger::new(store, options);
  for category in ledgers {
    let collection = Collection::Ledger(category);
    match expenses.clear(category).await {
      Ok(()) => done.push(collection),
      Err(e) => {
        error!(collection = %collection, error = %e, "failed to clear ledger");
        failed.push(collection);
        causes.push((collection, e));
      }
    }
  }

  if budget_targeted {
    if failed.is_empty() {
      let zero = PeriodBudget::zeroed(options.current_period_label());
      match BudgetStore::new(store, options).write(&zero).await {
        Ok(_) => done.push(Collection::Budget),
        Err(e) => {
          error!(error = %e, "failed to zero budget");
          failed.push(Collection::Budget);
          causes.push((Collection::Budget, e));
        }
      }
    } else {
      warn!("skipping budget reset because some ledgers could not be cleared");
      failed.push(Collection::Budget);
    }
  }

  if failed.is_empty() {
    info!(collections = done.len(), "reset complete");
    Ok(ResetReport { reset: done })
  } else {
    Err(PartialResetFailure { reset: done, failed, causes }.into())
  }
}
