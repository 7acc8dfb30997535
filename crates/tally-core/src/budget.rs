//! The period budget record and its store.
//!
//! The budget collection holds one data row beneath the header. Writing
//! replaces that row wholesale; there is no field-level merge.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
  Error, Result,
  balance::checked_total,
  category::Category,
  decode::{cell_at, column_index, decode_amount},
  options::LedgerOptions,
  schema::{BUDGET_COLLECTION, Collection, PERIOD_LABEL_COLUMN},
  store::{Cell, TabularStore},
};

// ─── PeriodBudget ────────────────────────────────────────────────────────────

/// The allotments for the current period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodBudget {
  /// Free-text period name. Blank means "the current period" when written.
  pub period_label: String,
  /// Allotments for `week_1`..`week_5`.
  pub weeks:        [Decimal; 5],
  pub misc:         Decimal,
}

impl PeriodBudget {
  /// All allotments zero.
  pub fn zeroed(period_label: impl Into<String>) -> Self {
    Self {
      period_label: period_label.into(),
      weeks:        [Decimal::ZERO; 5],
      misc:         Decimal::ZERO,
    }
  }

  pub fn allotment(&self, category: Category) -> Decimal {
    match category.week_index() {
      Some(i) => self.weeks[i],
      None => self.misc,
    }
  }

  pub fn set_allotment(&mut self, category: Category, amount: Decimal) {
    match category.week_index() {
      Some(i) => self.weeks[i] = amount,
      None => self.misc = amount,
    }
  }

  /// Builder-style [`PeriodBudget::set_allotment`].
  pub fn with_allotment(mut self, category: Category, amount: Decimal) -> Self {
    self.set_allotment(category, amount);
    self
  }

  /// Sum of all six allotments.
  pub fn total(&self) -> Result<Decimal> {
    checked_total(Category::all().map(|c| self.allotment(c)), "total budget")
  }

  fn validate(&self) -> Result<()> {
    for category in Category::all() {
      let amount = self.allotment(category);
      if amount < Decimal::ZERO {
        return Err(Error::Validation(format!(
          "allotment for {category} must not be negative (got {amount})"
        )));
      }
    }
    Ok(())
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// Reads and writes the single [`PeriodBudget`] record.
pub struct BudgetStore<'a, S> {
  store:   &'a S,
  options: &'a LedgerOptions,
}

impl<'a, S: TabularStore> BudgetStore<'a, S> {
  pub fn new(store: &'a S, options: &'a LedgerOptions) -> Self {
    Self { store, options }
  }

  /// The live budget. When the collection has no data row yet, an all-zero
  /// record labelled with the current period is returned and nothing is
  /// written.
  pub async fn read(&self) -> Result<PeriodBudget> {
    let rows = self.store.read_all_rows(BUDGET_COLLECTION).await?;
    let (Some(header), Some(row)) = (rows.first(), rows.get(1)) else {
      debug!("budget collection has no data row; using zero budget");
      return Ok(PeriodBudget::zeroed(self.options.current_period_label()));
    };

    let label = cell_at(row, column_index(header, PERIOD_LABEL_COLUMN)).trim();
    let mut budget = PeriodBudget::zeroed(if label.is_empty() {
      self.options.current_period_label()
    } else {
      label.to_owned()
    });

    for category in Category::all() {
      let column = category.allotment_column();
      let idx = column_index(header, column);
      if idx.is_none() {
        warn!(column, "budget header lacks allotment column; reading as zero");
      }
      let raw = cell_at(row, idx);
      let amount = decode_amount(raw).unwrap_or_else(|| {
        if !raw.trim().is_empty() {
          warn!(column, value = raw, "unparseable allotment; coercing to zero");
        }
        Decimal::ZERO
      });
      budget.set_allotment(category, amount);
    }

    Ok(budget)
  }

  /// Replace the budget row with `budget`. Returns the record as persisted:
  /// the label trimmed, and a blank label resolved to the current period.
  ///
  /// The row is laid out against the collection's existing header; the header
  /// itself is written back unchanged. Columns the ledger does not know are
  /// filled with zero.
  pub async fn write(&self, budget: &PeriodBudget) -> Result<PeriodBudget> {
    budget.validate()?;

    let mut persisted = budget.clone();
    persisted.period_label = match budget.period_label.trim() {
      "" => self.options.current_period_label(),
      label => label.to_owned(),
    };

    let rows = self.store.read_all_rows(BUDGET_COLLECTION).await?;
    let header = match rows.into_iter().next() {
      Some(h) if h.iter().any(|c| !c.trim().is_empty()) => h,
      _ => Collection::Budget.header_owned(),
    };

    for category in Category::all() {
      if column_index(&header, category.allotment_column()).is_none() {
        warn!(
          column = category.allotment_column(),
          "budget header lacks allotment column; value not persisted",
        );
      }
    }

    let row = header
      .iter()
      .map(|column| budget_cell(&persisted, column.trim()))
      .collect();

    debug!(label = %persisted.period_label, "writing budget row");
    self
      .store
      .replace_all_rows(BUDGET_COLLECTION, &header, vec![row])
      .await?;
    Ok(persisted)
  }
}

fn budget_cell(budget: &PeriodBudget, column: &str) -> Cell {
  if column == PERIOD_LABEL_COLUMN {
    return Cell::Text(budget.period_label.clone());
  }
  Category::all()
    .find(|c| c.allotment_column() == column)
    .map_or(Cell::Number(Decimal::ZERO), |c| Cell::Number(budget.allotment(c)))
}

#[cfg(test)]
mod tests {
  use rust_decimal_macros::dec;

  use super::*;

  #[test]
  fn allotment_accessors_cover_every_category() {
    let mut b = PeriodBudget::zeroed("March 2025");
    for (i, c) in Category::all().enumerate() {
      b.set_allotment(c, Decimal::from(i as u32 + 1));
    }
    assert_eq!(b.weeks, [dec!(1), dec!(2), dec!(3), dec!(4), dec!(5)]);
    assert_eq!(b.misc, dec!(6));
    assert_eq!(b.total().unwrap(), dec!(21));
  }

  #[test]
  fn negative_allotment_is_invalid() {
    let b = PeriodBudget::zeroed("x").with_allotment(Category::Week4, dec!(-1));
    assert!(matches!(b.validate(), Err(Error::Validation(_))));
  }

  #[test]
  fn budget_cells_follow_column_names() {
    let b = PeriodBudget::zeroed("May").with_allotment(Category::Misc, dec!(50));
    assert_eq!(budget_cell(&b, "month_name"), Cell::Text("May".into()));
    assert_eq!(budget_cell(&b, "other_budget"), Cell::Number(dec!(50)));
    assert_eq!(budget_cell(&b, "Updated"), Cell::Number(Decimal::ZERO));
  }
}
