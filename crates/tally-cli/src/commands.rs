//! Subcommands and their execution against an open [`Session`].

use std::{io::Write, str::FromStr};

use anyhow::Context as _;
use clap::{Args, Subcommand};
use rust_decimal::Decimal;
use tally_core::{
  Error, Session, balance,
  category::Category,
  decode::decode_amount,
  reset::{RESET_PHRASE, ResetConfirmation},
  schema::Collection,
  store::TabularStore,
};
use tracing::info;

use crate::render;

#[derive(Subcommand, Debug)]
pub enum Command {
  /// Create any missing collections and report what changed
  Init,

  /// Show or change the period budget
  #[command(subcommand)]
  Budget(BudgetCommand),

  /// Record an expense in a category
  Spend {
    /// week1..week5 or misc
    #[arg(value_parser = parse_category)]
    category:    Category,
    /// Non-negative amount, e.g. 12.50
    #[arg(value_parser = parse_amount)]
    amount:      Decimal,
    /// What the money went on
    description: Vec<String>,
  },

  /// List a category's expenses, newest first
  List {
    #[arg(value_parser = parse_category)]
    category: Category,
  },

  /// Budget, spending, and what is left per category
  Summary,

  /// Clear every expense log and zero the budget
  Reset {
    /// Confirmation phrase; prompted for when omitted
    #[arg(long, value_name = "PHRASE")]
    confirm: Option<String>,
    /// Only reset these collections (for retrying an incomplete reset)
    #[arg(long, value_delimiter = ',', value_parser = parse_collection)]
    only:    Vec<Collection>,
  },
}

#[derive(Subcommand, Debug)]
pub enum BudgetCommand {
  /// Print the current period budget
  Show,
  /// Overwrite the period budget; unspecified allotments keep their value
  Set(BudgetArgs),
}

#[derive(Args, Debug, Default)]
pub struct BudgetArgs {
  /// Period label; the current month when omitted
  #[arg(long)]
  pub label: Option<String>,
  #[arg(long, value_parser = parse_amount)]
  pub week1: Option<Decimal>,
  #[arg(long, value_parser = parse_amount)]
  pub week2: Option<Decimal>,
  #[arg(long, value_parser = parse_amount)]
  pub week3: Option<Decimal>,
  #[arg(long, value_parser = parse_amount)]
  pub week4: Option<Decimal>,
  #[arg(long, value_parser = parse_amount)]
  pub week5: Option<Decimal>,
  #[arg(long, value_parser = parse_amount)]
  pub misc:  Option<Decimal>,
}

impl BudgetArgs {
  fn allotments(&self) -> [(Category, Option<Decimal>); 6] {
    [
      (Category::Week1, self.week1),
      (Category::Week2, self.week2),
      (Category::Week3, self.week3),
      (Category::Week4, self.week4),
      (Category::Week5, self.week5),
      (Category::Misc, self.misc),
    ]
  }
}

fn parse_category(s: &str) -> Result<Category, String> {
  Category::from_str(s.trim()).map_err(|_| format!("unknown category {s:?}; use week1..week5 or misc"))
}

fn parse_amount(s: &str) -> Result<Decimal, String> {
  decode_amount(s).ok_or_else(|| format!("not an amount: {s:?}"))
}

fn parse_collection(s: &str) -> Result<Collection, String> {
  let s = s.trim();
  if s.eq_ignore_ascii_case("budget") || s.eq_ignore_ascii_case("budgets") {
    return Ok(Collection::Budget);
  }
  parse_category(s).map(Collection::Ledger)
}

fn collection_arg(collection: Collection) -> String {
  match collection {
    Collection::Budget => "budget".to_owned(),
    Collection::Ledger(category) => category.collection_name().to_ascii_lowercase(),
  }
}

/// Execute `command`, writing human-readable output to `out`.
///
/// `Reset` must already carry its confirmation phrase.
pub async fn run<S, W>(session: &Session<S>, command: Command, out: &mut W) -> anyhow::Result<()>
where
  S: TabularStore,
  W: Write,
{
  match command {
    Command::Init => {
      write!(out, "{}", render::provision(session.provision_report()))?;
    }

    Command::Budget(BudgetCommand::Show) => {
      let budget = session.budget().read().await?;
      write!(out, "{}", render::budget(&budget)?)?;
    }

    Command::Budget(BudgetCommand::Set(args)) => {
      let mut budget = session.budget().read().await?;
      if let Some(label) = args.label.clone() {
        budget.period_label = label;
      }
      for (category, amount) in args.allotments() {
        if let Some(amount) = amount {
          budget.set_allotment(category, amount);
        }
      }
      let written = session.budget().write(&budget).await?;
      write!(out, "{}", render::budget(&written)?)?;
    }

    Command::Spend { category, amount, description } => {
      let description = description.join(" ");
      let entry = session.expenses().append(category, &description, amount).await?;
      let remaining = session.category_balance(category).await?.remaining;
      writeln!(
        out,
        "Recorded {:.2} in {category}; {:.2} left this period.",
        entry.amount.round_dp(2),
        remaining.round_dp(2),
      )?;
    }

    Command::List { category } => {
      let entries = session.expenses().read_newest_first(category).await?;
      write!(out, "{}", render::entries(category, &entries))?;
    }

    Command::Summary => {
      let (budget, expenses) = session.snapshot().await?;
      let breakdown = balance::breakdown(&budget, &expenses)?;
      let totals = balance::monthly_summary(&budget, &expenses)?;
      write!(out, "{}", render::summary(&breakdown, &totals))?;
    }

    Command::Reset { confirm, only } => {
      let phrase = confirm.context("reset needs a confirmation phrase")?;
      let confirmation = ResetConfirmation::from_phrase(&phrase)?;
      let result = if only.is_empty() {
        session.reset_all(&confirmation).await
      } else {
        session.reset(&only, &confirmation).await
      };
      match result {
        Ok(report) => {
          info!(collections = report.reset.len(), "reset complete");
          writeln!(out, "Reset {} collection(s).", report.reset.len())?;
        }
        Err(Error::PartialReset(failure)) => {
          for (collection, cause) in &failure.causes {
            writeln!(out, "failed to reset {collection}: {cause}")?;
          }
          let retry: Vec<String> = failure.failed.iter().copied().map(collection_arg).collect();
          writeln!(
            out,
            "Retry with: tally reset --confirm {RESET_PHRASE} --only {}",
            retry.join(",")
          )?;
          return Err(Error::PartialReset(failure).into());
        }
        Err(e) => return Err(e.into()),
      }
    }
  }
  Ok(())
}
