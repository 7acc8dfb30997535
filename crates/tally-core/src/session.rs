//! [`Session`]: an explicitly owned handle on one ledger document.
//!
//! Opening a session provisions the schema exactly once; every accessor
//! after that assumes the seven collections exist.

use std::sync::Arc;

use futures::future::try_join_all;
use tracing::info;

use crate::{
  Result,
  balance::{self, CategoryBalance, ExpensesByCategory, MonthlySummary},
  budget::{BudgetStore, PeriodBudget},
  category::Category,
  expense::ExpenseLedger,
  options::LedgerOptions,
  reset::{self, ResetConfirmation, ResetReport},
  schema::{Collection, ProvisionReport, ensure_schema},
  store::TabularStore,
};

pub struct Session<S> {
  store:     Arc<S>,
  options:   LedgerOptions,
  provision: ProvisionReport,
}

impl<S: TabularStore> Session<S> {
  /// Validate `options`, provision the schema, and return a ready session.
  pub async fn open(store: Arc<S>, options: LedgerOptions) -> Result<Self> {
    options.validate()?;
    let provision = ensure_schema(store.as_ref(), &options).await?;
    if !provision.is_noop() {
      info!(
        created = provision.created.len(),
        initialized = provision.initialized_headers.len(),
        "schema provisioned",
      );
    }
    Ok(Self { store, options, provision })
  }

  pub fn store(&self) -> &Arc<S> { &self.store }

  pub fn options(&self) -> &LedgerOptions { &self.options }

  /// What provisioning did when this session was opened.
  pub fn provision_report(&self) -> &ProvisionReport { &self.provision }

  pub fn budget(&self) -> BudgetStore<'_, S> {
    BudgetStore::new(self.store.as_ref(), &self.options)
  }

  pub fn expenses(&self) -> ExpenseLedger<'_, S> {
    ExpenseLedger::new(self.store.as_ref(), &self.options)
  }

  /// Fresh budget plus every ledger, the six ledger reads running
  /// concurrently.
  pub async fn snapshot(&self) -> Result<(PeriodBudget, ExpensesByCategory)> {
    let ledger = self.expenses();
    let ledger = &ledger;
    let reads = Category::all().map(|category| async move {
      ledger.read(category).await.map(|entries| (category, entries))
    });
    let budget_store = self.budget();
    let (budget, expenses) = futures::try_join!(budget_store.read(), try_join_all(reads))?;
    Ok((budget, expenses.into_iter().collect()))
  }

  pub async fn summary(&self) -> Result<MonthlySummary> {
    let (budget, expenses) = self.snapshot().await?;
    balance::monthly_summary(&budget, &expenses)
  }

  pub async fn breakdown(&self) -> Result<Vec<CategoryBalance>> {
    let (budget, expenses) = self.snapshot().await?;
    balance::breakdown(&budget, &expenses)
  }

  pub async fn category_balance(&self, category: Category) -> Result<CategoryBalance> {
    let (budget_store, ledger) = (self.budget(), self.expenses());
    let (budget, entries) = futures::try_join!(budget_store.read(), ledger.read(category))?;
    balance::category_balance(category, &budget, &entries)
  }

  pub async fn reset_all(&self, confirmation: &ResetConfirmation) -> Result<ResetReport> {
    reset::reset_all(self.store.as_ref(), &self.options, confirmation).await
  }

  /// Retry a reset for the collections a previous attempt reported as
  /// failed.
  pub async fn reset(
    &self,
    targets: &[Collection],
    confirmation: &ResetConfirmation,
  ) -> Result<ResetReport> {
    reset::reset(self.store.as_ref(), &self.options, targets, confirmation).await
  }
}
