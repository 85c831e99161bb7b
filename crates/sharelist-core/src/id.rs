//! Typed row identifiers.
//!
//! Every entity is keyed by an SQLite-style integer rowid. The newtypes keep a
//! list id from being passed where an item id is expected.

use std::{fmt, num::ParseIntError, str::FromStr};

use serde::{Deserialize, Serialize};

macro_rules! row_id {
  ($(#[$meta:meta])* $name:ident) => {
    $(#[$meta])*
    #[derive(
      Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
    )]
    #[serde(transparent)]
    pub struct $name(pub i64);

    impl fmt::Display for $name {
      fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
    }

    impl FromStr for $name {
      type Err = ParseIntError;

      fn from_str(s: &str) -> Result<Self, Self::Err> { s.trim().parse().map(Self) }
    }

    impl From<i64> for $name {
      fn from(raw: i64) -> Self { Self(raw) }
    }
  };
}

row_id!(
  /// Identifies a registered user.
  UserId
);
row_id!(
  /// Identifies a shopping list.
  ListId
);
row_id!(
  /// Identifies a single item on a list.
  ItemId
);
row_id!(
  /// Identifies an entry in the purchase log.
  HistoryId
);
