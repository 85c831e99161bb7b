//! Items, the purchase log, and the analytics derived from it.
//!
//! An item cycles between *active* and *purchased*. Each transition into
//! purchased appends one [`PurchaseRecord`]; the reverse transition writes
//! nothing, so the log counts purchases rather than mirroring item state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  category::DEFAULT_CATEGORY,
  id::{HistoryId, ItemId, ListId, UserId},
};

/// Maximum number of entries returned by
/// [`crate::store::ListStore::suggestions_for`].
pub const SUGGESTION_LIMIT: usize = 5;

// ─── Items ───────────────────────────────────────────────────────────────────

/// Who bought an item and when. Purchaser and timestamp are set and cleared
/// together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Purchase {
  pub by: UserId,
  pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
  pub id:           ItemId,
  pub list_id:      ListId,
  pub product_name: String,
  pub category:     String,
  /// Position within the list. Strictly increasing in insertion order and
  /// never renumbered, so gaps left by deletions persist.
  pub sort_order:   i64,
  pub created_by:   UserId,
  pub created_at:   DateTime<Utc>,
  /// `None` while the item is still on the working list.
  pub purchase:     Option<Purchase>,
}

impl Item {
  pub fn is_active(&self) -> bool { self.purchase.is_none() }
}

/// Input to [`crate::store::ListStore::add_item`]. The sort position and
/// creation timestamp are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewItem {
  pub list_id:      ListId,
  pub product_name: String,
  pub category:     String,
  pub created_by:   UserId,
}

impl NewItem {
  /// Convenience constructor using [`DEFAULT_CATEGORY`].
  pub fn new(list_id: ListId, product_name: impl Into<String>, created_by: UserId) -> Self {
    Self {
      list_id,
      product_name: product_name.into(),
      category: DEFAULT_CATEGORY.to_owned(),
      created_by,
    }
  }

  pub fn with_category(mut self, category: impl Into<String>) -> Self {
    self.category = category.into();
    self
  }
}

// ─── Purchase log ────────────────────────────────────────────────────────────

/// An append-only purchase log entry. Outlives the item it was written for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseRecord {
  pub id:             HistoryId,
  pub list_id:        ListId,
  pub product_name:   String,
  pub category:       String,
  pub purchased_by:   Option<UserId>,
  /// `None` when the purchaser no longer resolves to a user.
  pub purchaser_name: Option<String>,
  pub purchased_at:   DateTime<Utc>,
}

/// A product ranked by how often it has been bought from a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
  pub product_name: String,
  pub count:        u64,
}
