//! Plain-text rendering of ledger state for the terminal.

use rust_decimal::Decimal;
use tally_core::{
  balance::{CategoryBalance, MonthlySummary},
  budget::PeriodBudget,
  category::Category,
  decode::encode_timestamp,
  expense::ExpenseEntry,
  schema::ProvisionReport,
};

fn money(amount: Decimal) -> String { format!("{:.2}", amount.round_dp(2)) }

/// Join lines, each terminated by a newline.
fn block(lines: impl IntoIterator<Item = String>) -> String {
  lines.into_iter().map(|line| line + "\n").collect()
}

fn allotment_line(label: &str, amount: Decimal) -> String {
  format!("  {label:<8} {:>12}", money(amount))
}

pub fn budget(budget: &PeriodBudget) -> tally_core::Result<String> {
  let total = budget.total()?;
  let heading = format!("Budget for {}", budget.period_label);
  let categories = Category::all()
    .map(|c| allotment_line(&c.to_string(), budget.allotment(c)));
  Ok(block(
    std::iter::once(heading)
      .chain(categories)
      .chain(std::iter::once(allotment_line("total", total))),
  ))
}

pub fn entries(category: Category, entries: &[ExpenseEntry]) -> String {
  if entries.is_empty() {
    return format!("No expenses recorded in {category}.\n");
  }
  block(entries.iter().map(|entry| {
    let when = entry.timestamp.map(encode_timestamp).unwrap_or_else(|| "-".to_owned());
    format!("{when:<19}  {:>12}  {}", money(entry.amount), entry.description)
  }))
}

fn summary_line(label: &str, budget: Decimal, spent: Decimal, remaining: Decimal) -> String {
  format!("{label:<8} {:>12} {:>12} {:>12}", money(budget), money(spent), money(remaining))
}

pub fn summary(breakdown: &[CategoryBalance], totals: &MonthlySummary) -> String {
  let heading = format!("{:<8} {:>12} {:>12} {:>12}", "", "budget", "spent", "remaining");
  let categories = breakdown.iter().map(|line| {
    let flag = if line.is_overspent() { "  over budget" } else { "" };
    summary_line(&line.category.to_string(), line.allotment, line.spent, line.remaining) + flag
  });
  let total = summary_line(
    "total",
    totals.total_budget,
    totals.total_spent,
    totals.total_remaining,
  );
  block(std::iter::once(heading).chain(categories).chain(std::iter::once(total)))
}

pub fn provision(report: &ProvisionReport) -> String {
  if report.is_noop() {
    return "Ledger document is up to date.\n".to_owned();
  }
  let created = report.created.iter().map(|c| format!("created {c}"));
  let headers = report
    .initialized_headers
    .iter()
    .map(|c| format!("wrote header into {c}"));
  let drifted = report.drifted.iter().map(|drift| {
    format!(
      "warning: {} has an unexpected header: {}",
      drift.collection,
      drift.found.join(", ")
    )
  });
  block(created.chain(headers).chain(drifted))
}

#[cfg(test)]
mod tests {
  use rust_decimal_macros::dec;
  use tally_core::schema::{Collection, HeaderDrift};

  use super::*;

  #[test]
  fn budget_lists_every_category_and_total() {
    let b = PeriodBudget::zeroed("March 2024")
      .with_allotment(Category::Week1, dec!(100))
      .with_allotment(Category::Misc, dec!(50.5));
    let text = budget(&b).unwrap();
    assert!(text.starts_with("Budget for March 2024\n"));
    assert!(text.contains("week_1"));
    assert!(text.contains("100.00"));
    assert!(text.contains("50.50"));
    assert!(text.contains("150.50"));
    assert_eq!(text.lines().count(), 8);
  }

  #[test]
  fn empty_ledger_says_so() {
    assert_eq!(entries(Category::Week2, &[]), "No expenses recorded in week_2.\n");
  }

  #[test]
  fn unreadable_timestamp_renders_as_dash() {
    let text = entries(Category::Misc, &[ExpenseEntry {
      timestamp:   None,
      description: "gift".into(),
      amount:      dec!(12),
    }]);
    assert!(text.starts_with('-'));
    assert!(text.contains("12.00"));
    assert!(text.trim_end().ends_with("gift"));
  }

  #[test]
  fn summary_flags_overspent_categories() {
    let breakdown = vec![
      CategoryBalance {
        category:  Category::Week1,
        allotment: dec!(100),
        spent:     dec!(120),
        remaining: dec!(-20),
      },
      CategoryBalance {
        category:  Category::Week2,
        allotment: dec!(100),
        spent:     dec!(10),
        remaining: dec!(90),
      },
    ];
    let totals = MonthlySummary {
      total_budget:    dec!(200),
      total_spent:     dec!(130),
      total_remaining: dec!(70),
    };
    let text = summary(&breakdown, &totals);
    let lines: Vec<&str> = text.lines().collect();
    assert!(lines[1].contains("-20.00") && lines[1].ends_with("over budget"));
    assert!(!lines[2].contains("over budget"));
    assert!(lines[3].starts_with("total") && lines[3].ends_with("70.00"));
  }

  #[test]
  fn provision_report_lines() {
    assert_eq!(provision(&ProvisionReport::default()), "Ledger document is up to date.\n");

    let report = ProvisionReport {
      created:             vec![Collection::Ledger(Category::Week3)],
      initialized_headers: vec![Collection::Budget],
      drifted:             vec![HeaderDrift {
        collection: Collection::Ledger(Category::Misc),
        found:      vec!["when".into(), "what".into()],
      }],
    };
    assert_eq!(
      provision(&report),
      "created Week3\nwrote header into Budgets\nwarning: Misc has an unexpected header: when, what\n"
    );
  }

  #[test]
  fn budget_too_large_to_total_is_an_error() {
    let b = PeriodBudget::zeroed("x")
      .with_allotment(Category::Week1, Decimal::MAX)
      .with_allotment(Category::Week2, Decimal::MAX);
    assert!(budget(&b).is_err());
  }
}
