//! The six fixed spending buckets.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator as _};

/// A spending category. Closed set: five weekly buckets and one
/// miscellaneous bucket.
///
/// Each category owns one allotment in the period budget and one ledger
/// collection in the store.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  Serialize,
  Deserialize,
  Display,
  EnumIter,
  EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum Category {
  #[serde(rename = "week_1")]
  #[strum(to_string = "week_1", serialize = "week1", serialize = "1")]
  Week1,
  #[serde(rename = "week_2")]
  #[strum(to_string = "week_2", serialize = "week2", serialize = "2")]
  Week2,
  #[serde(rename = "week_3")]
  #[strum(to_string = "week_3", serialize = "week3", serialize = "3")]
  Week3,
  #[serde(rename = "week_4")]
  #[strum(to_string = "week_4", serialize = "week4", serialize = "4")]
  Week4,
  #[serde(rename = "week_5")]
  #[strum(to_string = "week_5", serialize = "week5", serialize = "5")]
  Week5,
  #[serde(rename = "misc")]
  #[strum(to_string = "misc", serialize = "other")]
  Misc,
}

impl Category {
  /// All categories in display order (weeks first, then misc).
  pub fn all() -> impl Iterator<Item = Self> { Self::iter() }

  /// Name of the ledger collection holding this category's expenses.
  pub fn collection_name(self) -> &'static str {
    match self {
      Self::Week1 => "Week1",
      Self::Week2 => "Week2",
      Self::Week3 => "Week3",
      Self::Week4 => "Week4",
      Self::Week5 => "Week5",
      Self::Misc => "Misc",
    }
  }

  /// Column in the budget collection holding this category's allotment.
  pub fn allotment_column(self) -> &'static str {
    match self {
      Self::Week1 => "week1",
      Self::Week2 => "week2",
      Self::Week3 => "week3",
      Self::Week4 => "week4",
      Self::Week5 => "week5",
      Self::Misc => "other_budget",
    }
  }

  /// Zero-based index into [`crate::budget::PeriodBudget`] weekly
  /// allotments, or `None` for [`Category::Misc`].
  pub fn week_index(self) -> Option<usize> {
    match self {
      Self::Week1 => Some(0),
      Self::Week2 => Some(1),
      Self::Week3 => Some(2),
      Self::Week4 => Some(3),
      Self::Week5 => Some(4),
      Self::Misc => None,
    }
  }
}

#[cfg(test)]
mod tests {
  use std::str::FromStr;

  use super::*;

  #[test]
  fn six_categories_in_order() {
    let all: Vec<_> = Category::all().collect();
    assert_eq!(all.len(), 6);
    assert_eq!(all.first(), Some(&Category::Week1));
    assert_eq!(all.last(), Some(&Category::Misc));
  }

  #[test]
  fn display_uses_snake_case_names() {
    assert_eq!(Category::Week3.to_string(), "week_3");
    assert_eq!(Category::Misc.to_string(), "misc");
  }

  #[test]
  fn parses_aliases() {
    assert_eq!(Category::from_str("week_2").unwrap(), Category::Week2);
    assert_eq!(Category::from_str("Week2").unwrap(), Category::Week2);
    assert_eq!(Category::from_str("2").unwrap(), Category::Week2);
    assert_eq!(Category::from_str("MISC").unwrap(), Category::Misc);
    assert!(Category::from_str("week_6").is_err());
  }

  #[test]
  fn collection_and_column_names_are_distinct() {
    let mut names: Vec<_> = Category::all().map(Category::collection_name).collect();
    names.sort_unstable();
    names.dedup();
    assert_eq!(names.len(), 6);
    assert_eq!(Category::Misc.allotment_column(), "other_budget");
  }
}
