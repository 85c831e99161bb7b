//! The fixed catalog of quick-pick item categories.

use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator as _, IntoStaticStr};

/// Category assigned to an item when the caller gives none.
pub const DEFAULT_CATEGORY: &str = "Other";

/// A quick-pick category. Declaration order is the catalog order, and
/// [`QuickCategory::Other`] is always last.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  AsRefStr,
  Display,
  EnumIter,
  EnumString,
  IntoStaticStr,
)]
#[strum(ascii_case_insensitive)]
pub enum QuickCategory {
  Fruit,
  Vegetables,
  Dairy,
  Bread,
  Meat,
  Fish,
  Sweets,
  Drinks,
  Household,
  Pharmacy,
  Kids,
  Grocery,
  Frozen,
  Hygiene,
  Snacks,
  #[default]
  Other,
}

/// All catalog labels in display order.
pub fn quick_categories() -> Vec<&'static str> {
  QuickCategory::iter().map(QuickCategory::label).collect()
}

impl QuickCategory {
  pub fn label(self) -> &'static str { self.into() }

  /// Canonical form of a user-supplied category. Catalog names match in any
  /// letter case and come back with the catalog spelling; anything else is
  /// kept as typed (trimmed), and blank input becomes [`DEFAULT_CATEGORY`].
  pub fn normalize(input: &str) -> String {
    let input = input.trim();
    if input.is_empty() {
      return DEFAULT_CATEGORY.to_owned();
    }
    input
      .parse::<Self>()
      .map_or_else(|_| input.to_owned(), |c| c.label().to_owned())
  }
}
