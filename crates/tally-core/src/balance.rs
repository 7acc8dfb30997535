//! Pure balance arithmetic over already-fetched budget and expense data.
//!
//! Nothing here clamps: a negative remaining balance is an overspend and is
//! returned as-is for the caller to surface.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::{Error, Result, budget::PeriodBudget, category::Category, expense::ExpenseEntry};

/// Expenses keyed by category. Missing keys count as "no expenses".
pub type ExpensesByCategory = BTreeMap<Category, Vec<ExpenseEntry>>;

/// Sum that reports overflow instead of panicking. Stored cells are
/// user-editable, so any magnitude can reach this point.
pub(crate) fn checked_total(
  amounts: impl IntoIterator<Item = Decimal>,
  what: &str,
) -> Result<Decimal> {
  amounts
    .into_iter()
    .try_fold(Decimal::ZERO, |acc, amount| acc.checked_add(amount))
    .ok_or_else(|| overflow(what))
}

fn checked_difference(a: Decimal, b: Decimal, what: &str) -> Result<Decimal> {
  a.checked_sub(b).ok_or_else(|| overflow(what))
}

fn overflow(what: &str) -> Error {
  Error::Validation(format!("{what} is too large to compute"))
}

pub fn total_spent(expenses: &[ExpenseEntry]) -> Result<Decimal> {
  checked_total(expenses.iter().map(|e| e.amount), "total spent")
}

/// `allotment - Σ amount`. May be negative.
pub fn remaining(allotment: Decimal, expenses: &[ExpenseEntry]) -> Result<Decimal> {
  checked_difference(allotment, total_spent(expenses)?, "remaining balance")
}

// ─── Per category ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryBalance {
  pub category:  Category,
  pub allotment: Decimal,
  pub spent:     Decimal,
  pub remaining: Decimal,
}

impl CategoryBalance {
  pub fn is_overspent(&self) -> bool { self.remaining < Decimal::ZERO }
}

pub fn category_balance(
  category: Category,
  budget: &PeriodBudget,
  expenses: &[ExpenseEntry],
) -> Result<CategoryBalance> {
  let allotment = budget.allotment(category);
  let spent = total_spent(expenses)?;
  let remaining = checked_difference(allotment, spent, "remaining balance")?;
  Ok(CategoryBalance { category, allotment, spent, remaining })
}

/// One [`CategoryBalance`] per category, in category order.
pub fn breakdown(
  budget: &PeriodBudget,
  expenses: &ExpensesByCategory,
) -> Result<Vec<CategoryBalance>> {
  Category::all()
    .map(|c| {
      let entries = expenses.get(&c).map(Vec::as_slice).unwrap_or_default();
      category_balance(c, budget, entries)
    })
    .collect()
}

// ─── Monthly ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthlySummary {
  pub total_budget:    Decimal,
  pub total_spent:     Decimal,
  pub total_remaining: Decimal,
}

pub fn monthly_summary(
  budget: &PeriodBudget,
  expenses: &ExpensesByCategory,
) -> Result<MonthlySummary> {
  let total_budget = budget.total()?;
  let per_category = expenses
    .values()
    .map(|e| total_spent(e))
    .collect::<Result<Vec<_>>>()?;
  let total_spent = checked_total(per_category, "total spent")?;
  Ok(MonthlySummary {
    total_budget,
    total_spent,
    total_remaining: checked_difference(total_budget, total_spent, "total remaining")?,
  })
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;
  use rust_decimal_macros::dec;

  use super::*;

  fn expense(description: &str, amount: Decimal) -> ExpenseEntry {
    ExpenseEntry { timestamp: None, description: description.into(), amount }
  }

  #[test]
  fn coffee_and_lunch_leave_83_50() {
    let expenses = vec![expense("coffee", dec!(4.50)), expense("lunch", dec!(12.00))];
    assert_eq!(remaining(dec!(100.00), &expenses).unwrap(), dec!(83.50));
  }

  #[test]
  fn remaining_is_linear_in_appended_amounts() {
    let mut expenses = vec![expense("a", dec!(10))];
    let before = remaining(dec!(40), &expenses).unwrap();
    expenses.push(expense("b", dec!(7.25)));
    assert_eq!(remaining(dec!(40), &expenses).unwrap(), before - dec!(7.25));
  }

  #[test]
  fn overspend_goes_negative() {
    let b = PeriodBudget::zeroed("x").with_allotment(Category::Week2, dec!(20));
    let bal = category_balance(Category::Week2, &b, &[expense("rent", dec!(35))]).unwrap();
    assert_eq!(bal.remaining, dec!(-15));
    assert!(bal.is_overspent());
  }

  #[test]
  fn summary_with_no_expenses() {
    let mut b = PeriodBudget::zeroed("x");
    b.weeks = [dec!(100); 5];
    b.misc = dec!(50);
    let summary = monthly_summary(&b, &ExpensesByCategory::new()).unwrap();
    assert_eq!(summary, MonthlySummary {
      total_budget:    dec!(550),
      total_spent:     dec!(0),
      total_remaining: dec!(550),
    });
  }

  #[test]
  fn summary_sums_across_categories() {
    let b = PeriodBudget::zeroed("x")
      .with_allotment(Category::Week1, dec!(100))
      .with_allotment(Category::Misc, dec!(30));
    let mut expenses = ExpensesByCategory::new();
    expenses.insert(Category::Week1, vec![expense("a", dec!(20)), expense("b", dec!(5))]);
    expenses.insert(Category::Misc, vec![expense("c", dec!(40))]);
    let summary = monthly_summary(&b, &expenses).unwrap();
    assert_eq!(summary.total_budget, dec!(130));
    assert_eq!(summary.total_spent, dec!(65));
    assert_eq!(summary.total_remaining, dec!(65));
  }

  #[test]
  fn breakdown_covers_every_category() {
    let b = PeriodBudget::zeroed("x").with_allotment(Category::Week3, dec!(10));
    let rows = breakdown(&b, &ExpensesByCategory::new()).unwrap();
    assert_eq!(rows.len(), 6);
    assert_eq!(rows[2].category, Category::Week3);
    assert_eq!(rows[2].remaining, dec!(10));
    assert!(rows.iter().all(|r| !r.is_overspent()));
  }

  #[test]
  fn huge_amounts_report_overflow_instead_of_panicking() {
    let expenses = vec![expense("a", Decimal::MAX), expense("b", Decimal::MAX)];
    assert!(matches!(total_spent(&expenses), Err(Error::Validation(_))));

    let b = PeriodBudget::zeroed("x");
    let one = vec![expense("a", Decimal::MAX)];
    assert_eq!(remaining(Decimal::ZERO, &one).unwrap(), -Decimal::MAX);
    assert!(matches!(remaining(Decimal::MIN, &[expense("a", dec!(1))]), Err(Error::Validation(_))));

    let mut by_category = ExpensesByCategory::new();
    by_category.insert(Category::Week1, one.clone());
    by_category.insert(Category::Misc, one);
    assert!(matches!(monthly_summary(&b, &by_category), Err(Error::Validation(_))));
    assert!(breakdown(&b, &by_category).is_ok());
  }
}
